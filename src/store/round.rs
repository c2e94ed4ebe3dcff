use super::{Recorded, RoundRepository};
use crate::error::{GameError, GameResult};
use crate::ids;
use crate::types::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// In-memory round store. Rounds attached to a session are never deleted.
#[derive(Default)]
pub struct MemRoundStore {
    rounds: RwLock<HashMap<RoundId, Arc<Mutex<Round>>>>,
}

impl MemRoundStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, id: &str) -> GameResult<Arc<Mutex<Round>>> {
        self.rounds
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::round_not_found(id))
    }
}

#[async_trait]
impl RoundRepository for MemRoundStore {
    async fn create(&self, session_code: &str, prompt: String) -> Round {
        let round = Round::new(ids::new_round_id(), session_code.to_string(), prompt);
        self.rounds
            .write()
            .await
            .insert(round.id.clone(), Arc::new(Mutex::new(round.clone())));
        round
    }

    async fn get(&self, id: &str) -> GameResult<Round> {
        let round = self.entry(id).await?;
        let round = round.lock().await;
        Ok(round.clone())
    }

    async fn remove(&self, id: &str) -> GameResult<()> {
        self.rounds
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GameError::round_not_found(id))
    }

    async fn record_response(
        &self,
        id: &str,
        player_id: PlayerId,
        text: String,
        player_count: usize,
    ) -> GameResult<Recorded<HashMap<PlayerId, String>>> {
        let round = self.entry(id).await?;
        let mut round = round.lock().await;

        // Overwrites never grow the map; new entries may not exceed the roster
        if !round.responses.contains_key(&player_id) && round.response_count() >= player_count {
            return Err(GameError::Conflict(format!(
                "round {} already has all {} responses",
                id, player_count
            )));
        }

        round.responses.insert(player_id, text);

        let completed = if !round.responses_fired && round.responses_complete(player_count) {
            round.responses_fired = true;
            Some(round.responses.clone())
        } else {
            None
        };

        Ok(Recorded {
            count: round.response_count(),
            completed,
        })
    }

    async fn record_vote(
        &self,
        id: &str,
        candidate_id: PlayerId,
        player_count: usize,
    ) -> GameResult<Recorded<HashMap<PlayerId, u32>>> {
        let round = self.entry(id).await?;
        let mut round = round.lock().await;

        if round.total_votes() >= player_count {
            return Err(GameError::Conflict(format!(
                "round {} already has all {} votes",
                id, player_count
            )));
        }

        *round.votes.entry(candidate_id).or_insert(0) += 1;

        let completed = if !round.votes_fired && round.votes_complete(player_count) {
            round.votes_fired = true;
            Some(round.votes.clone())
        } else {
            None
        };

        Ok(Recorded {
            count: round.total_votes(),
            completed,
        })
    }
}
