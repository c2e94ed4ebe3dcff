use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque ID types for readability
pub type SessionCode = String;
pub type RoundId = String;
pub type PlayerId = String;
pub type SubscriberId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub code: SessionCode,
    /// Append-only, duplicates allowed
    pub player_ids: Vec<PlayerId>,
    pub round_ids: Vec<RoundId>,
    pub ended: bool,
    pub created_at: String,
}

impl Session {
    pub fn new(code: SessionCode) -> Self {
        Self {
            code,
            player_ids: Vec::new(),
            round_ids: Vec::new(),
            ended: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn player_count(&self) -> usize {
        self.player_ids.len()
    }

    pub fn current_round_id(&self) -> Option<&RoundId> {
        self.round_ids.last()
    }
}

/// One prompt-response-vote cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub session_code: SessionCode,
    pub prompt: String,
    pub responses: HashMap<PlayerId, String>,
    pub votes: HashMap<PlayerId, u32>,
    /// Set once the "responses_submitted" transition has fired
    pub responses_fired: bool,
    /// Set once the "votes_submitted" transition has fired
    pub votes_fired: bool,
}

impl Round {
    pub fn new(id: RoundId, session_code: SessionCode, prompt: String) -> Self {
        Self {
            id,
            session_code,
            prompt,
            responses: HashMap::new(),
            votes: HashMap::new(),
            responses_fired: false,
            votes_fired: false,
        }
    }

    pub fn response_count(&self) -> usize {
        self.responses.len()
    }

    pub fn total_votes(&self) -> usize {
        self.votes.values().map(|v| *v as usize).sum()
    }

    pub fn responses_complete(&self, player_count: usize) -> bool {
        player_count > 0 && self.response_count() == player_count
    }

    pub fn votes_complete(&self, player_count: usize) -> bool {
        player_count > 0 && self.total_votes() == player_count
    }
}

/// Public snapshot of a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionView {
    pub id: SessionCode,
    pub player_ids: Vec<PlayerId>,
    pub round_ids: Vec<RoundId>,
    pub subscribers: usize,
    pub ended: bool,
    pub created_at: String,
}

/// Result of a join
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct JoinOutcome {
    pub leader: bool,
}

/// Progress of a round after a response or vote
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    pub count: usize,
    /// True only for the call that completed the phase
    pub completed: bool,
}

/// Result of advancing a session
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Started { id: RoundId, prompt: String },
    Ended,
}
