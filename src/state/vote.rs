use super::{missing_round_is_internal, AppState};
use crate::error::{require_non_empty, GameError, GameResult};
use crate::protocol::ServerEvent;
use crate::types::*;

impl AppState {
    /// Count one vote for `candidate_id`. Once the session's player count is
    /// reached, the full tally is announced exactly once.
    pub async fn submit_vote(
        &self,
        code: &str,
        round_id: &str,
        candidate_id: &str,
    ) -> GameResult<Progress> {
        require_non_empty("vote", candidate_id)?;

        let session = self.running_session(code).await?;
        if !session.round_ids.iter().any(|id| id == round_id) {
            return Err(GameError::round_not_found(round_id));
        }

        let recorded = self
            .rounds
            .record_vote(round_id, candidate_id.to_string(), session.player_count())
            .await
            .map_err(|e| missing_round_is_internal(code, e))?;

        tracing::debug!(
            "Game {} round {}: {}/{} votes",
            code,
            round_id,
            recorded.count,
            session.player_count()
        );

        let completed = recorded.completed.is_some();
        if let Some(votes) = recorded.completed {
            tracing::info!("Game {} round {}: all votes in", code, round_id);
            self.publish(
                code,
                ServerEvent::VotesSubmitted {
                    id: round_id.to_string(),
                    votes,
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
