use super::AppState;
use crate::error::{GameError, GameResult};
use crate::protocol::ServerEvent;
use crate::types::*;

impl AppState {
    /// Start the game: play the first round
    pub async fn start_game(&self, code: &str) -> GameResult<Round> {
        let session = self.running_session(code).await?;
        if !session.round_ids.is_empty() {
            return Err(GameError::Conflict(format!(
                "game {} has already started",
                code
            )));
        }

        // Appending with a limit of one round only succeeds for the first start
        self.play_round(code, 1).await
    }

    /// Move on to the next round, or end the game once every round was played
    pub async fn advance_game(&self, code: &str) -> GameResult<Advance> {
        let session = self.running_session(code).await?;
        if session.round_ids.is_empty() {
            return Err(GameError::Conflict(format!(
                "game {} has not started",
                code
            )));
        }

        if session.round_ids.len() >= self.rules.rounds_per_game {
            if self.sessions.mark_ended(code).await? {
                tracing::info!(
                    "Game {} ended after {} rounds",
                    code,
                    session.round_ids.len()
                );
                self.publish(
                    code,
                    ServerEvent::End {
                        id: code.to_string(),
                    },
                )
                .await;
            }
            return Ok(Advance::Ended);
        }

        let round = self.play_round(code, self.rules.rounds_per_game).await?;
        Ok(Advance::Started {
            id: round.id,
            prompt: round.prompt,
        })
    }

    /// Create a round with the next prompt, attach it to the session and
    /// announce it
    async fn play_round(&self, code: &str, limit: usize) -> GameResult<Round> {
        let prompt = self.prompts.next_prompt().await;
        let round = self.rounds.create(code, prompt).await;
        let number = match self.sessions.add_round(code, round.id.clone(), limit).await {
            Ok(number) => number,
            Err(e) => {
                // Lost the slot: the round must not outlive the failed call
                if let Err(remove_err) = self.rounds.remove(&round.id).await {
                    tracing::error!(
                        "Failed to discard unclaimed round {}: {}",
                        round.id,
                        remove_err
                    );
                }
                return Err(e);
            }
        };

        tracing::info!("Game {} round {} started: {}", code, number, round.id);

        self.publish(
            code,
            ServerEvent::Prompt {
                id: round.id.clone(),
                prompt: round.prompt.clone(),
            },
        )
        .await;

        Ok(round)
    }
}
