use super::{missing_round_is_internal, AppState};
use crate::error::GameResult;
use crate::types::*;
use std::collections::HashMap;

impl AppState {
    /// Total votes per candidate across every round of the session
    pub async fn scores(&self, code: &str) -> GameResult<HashMap<PlayerId, u32>> {
        let session = self.sessions.get(code).await?;

        let mut scores: HashMap<PlayerId, u32> = HashMap::new();
        for round_id in &session.round_ids {
            let round = self
                .rounds
                .get(round_id)
                .await
                .map_err(|e| missing_round_is_internal(code, e))?;
            for (candidate, votes) in round.votes {
                *scores.entry(candidate).or_insert(0) += votes;
            }
        }

        Ok(scores)
    }
}
