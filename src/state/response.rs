use super::{missing_round_is_internal, AppState};
use crate::error::{require_non_empty, GameError, GameResult};
use crate::protocol::ServerEvent;
use crate::types::*;

impl AppState {
    /// Record a player's response. The call that brings the response count
    /// up to the player count announces all responses, exactly once.
    pub async fn submit_response(
        &self,
        code: &str,
        round_id: &str,
        player_id: &str,
        text: &str,
    ) -> GameResult<Progress> {
        require_non_empty("player_id", player_id)?;
        require_non_empty("response", text)?;

        let session = self.running_session(code).await?;
        if !session.round_ids.iter().any(|id| id == round_id) {
            return Err(GameError::round_not_found(round_id));
        }

        let recorded = self
            .rounds
            .record_response(
                round_id,
                player_id.to_string(),
                text.to_string(),
                session.player_count(),
            )
            .await
            .map_err(|e| missing_round_is_internal(code, e))?;

        tracing::debug!(
            "Game {} round {}: {}/{} responses",
            code,
            round_id,
            recorded.count,
            session.player_count()
        );

        let completed = recorded.completed.is_some();
        if let Some(responses) = recorded.completed {
            tracing::info!("Game {} round {}: all responses in", code, round_id);
            self.publish(
                code,
                ServerEvent::ResponsesSubmitted {
                    id: round_id.to_string(),
                    responses,
                },
            )
            .await;
        }

        Ok(Progress {
            count: recorded.count,
            completed,
        })
    }
}
