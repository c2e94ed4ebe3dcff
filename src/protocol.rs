use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Events pushed to every subscriber of a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Joined {
        player_id: PlayerId,
    },
    Prompt {
        id: RoundId,
        prompt: String,
    },
    ResponsesSubmitted {
        id: RoundId,
        responses: HashMap<PlayerId, String>,
    },
    VotesSubmitted {
        id: RoundId,
        votes: HashMap<PlayerId, u32>,
    },
    /// The session has played its last round
    End {
        id: SessionCode,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponseRequest {
    pub player_id: PlayerId,
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitVoteRequest {
    /// Player being voted for
    pub vote: PlayerId,
}

/// A freshly started round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundInfo {
    pub id: RoundId,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvanceResponse {
    pub ended: bool,
    pub round: Option<RoundInfo>,
}

impl From<Advance> for AdvanceResponse {
    fn from(advance: Advance) -> Self {
        match advance {
            Advance::Started { id, prompt } => Self {
                ended: false,
                round: Some(RoundInfo { id, prompt }),
            },
            Advance::Ended => Self {
                ended: true,
                round: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
