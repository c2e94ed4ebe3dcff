//! Session and round repositories.
//!
//! Both stores keep one lock per entity: the map lock is only held to look
//! an entity up or insert it, so two different sessions (or rounds) are never
//! serialized against each other.

mod round;
mod session;

pub use round::MemRoundStore;
pub use session::MemSessionStore;

use crate::broadcast::Subscriber;
use crate::error::GameResult;
use crate::types::*;
use async_trait::async_trait;
use std::collections::HashMap;

/// Outcome of a round mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded<T> {
    /// Responses (or total votes) after this call
    pub count: usize,
    /// Full snapshot, present only on the call that completed the round
    /// phase. Never present twice for the same round.
    pub completed: Option<T>,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a session under a fresh, unused code
    async fn create(&self) -> Session;

    async fn get(&self, code: &str) -> GameResult<Session>;

    /// Append a player. Returns true when the player list was empty before.
    async fn add_player(&self, code: &str, player_id: PlayerId) -> GameResult<bool>;

    async fn add_subscriber(&self, code: &str, subscriber: Subscriber) -> GameResult<()>;

    /// Drop the given subscribers, returning how many were removed
    async fn remove_subscribers(&self, code: &str, ids: &[SubscriberId]) -> GameResult<usize>;

    async fn subscribers(&self, code: &str) -> GameResult<Vec<Subscriber>>;

    /// Append a round id while the session is running and holds fewer than
    /// `limit` rounds. Returns the new round count.
    async fn add_round(&self, code: &str, round_id: RoundId, limit: usize) -> GameResult<usize>;

    /// Mark the session ended. Returns true only for the call that ended it.
    async fn mark_ended(&self, code: &str) -> GameResult<bool>;
}

#[async_trait]
pub trait RoundRepository: Send + Sync {
    async fn create(&self, session_code: &str, prompt: String) -> Round;

    async fn get(&self, id: &str) -> GameResult<Round>;

    /// Discard a round that never got attached to its session
    async fn remove(&self, id: &str) -> GameResult<()>;

    /// Store (or overwrite) a player's response. `player_count` is the
    /// threshold at which the responses phase completes.
    async fn record_response(
        &self,
        id: &str,
        player_id: PlayerId,
        text: String,
        player_count: usize,
    ) -> GameResult<Recorded<HashMap<PlayerId, String>>>;

    /// Add one vote for `candidate_id`
    async fn record_vote(
        &self,
        id: &str,
        candidate_id: PlayerId,
        player_count: usize,
    ) -> GameResult<Recorded<HashMap<PlayerId, u32>>>;
}
