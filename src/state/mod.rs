mod response;
mod round;
mod score;
mod session;
mod vote;

use crate::broadcast::{BroadcastHub, BroadcastReport};
use crate::config::GameRules;
use crate::error::{GameError, GameResult};
use crate::prompts::PromptSource;
use crate::protocol::ServerEvent;
use crate::store::{MemRoundStore, MemSessionStore, RoundRepository, SessionRepository};
use crate::types::*;
use std::sync::Arc;

/// Shared application state: the round lifecycle controller.
///
/// Every operation works on one session, identified by its code. Mutations
/// go through the repositories, which serialize per entity; events are
/// fanned out through the hub once a transition has been claimed.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionRepository>,
    pub rounds: Arc<dyn RoundRepository>,
    pub prompts: Arc<dyn PromptSource>,
    pub hub: BroadcastHub,
    pub rules: GameRules,
}

impl AppState {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        rounds: Arc<dyn RoundRepository>,
        prompts: Arc<dyn PromptSource>,
        rules: GameRules,
    ) -> Self {
        Self {
            sessions,
            rounds,
            prompts,
            hub: BroadcastHub::new(),
            rules,
        }
    }

    /// State backed by the in-memory stores
    pub fn in_memory(prompts: Arc<dyn PromptSource>, rules: GameRules) -> Self {
        Self::new(
            Arc::new(MemSessionStore::new(rules.code_length)),
            Arc::new(MemRoundStore::new()),
            prompts,
            rules,
        )
    }

    /// Fetch a session that is still accepting game actions
    async fn running_session(&self, code: &str) -> GameResult<Session> {
        let session = self.sessions.get(code).await?;
        if session.ended {
            return Err(GameError::Conflict(format!("game {} has ended", code)));
        }
        Ok(session)
    }

    /// Broadcast an event to the session's subscribers and prune the ones
    /// whose connection is gone
    pub async fn publish(&self, code: &str, event: ServerEvent) -> BroadcastReport {
        let subscribers = match self.sessions.subscribers(code).await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                tracing::warn!("Cannot broadcast to game {}: {}", code, e);
                return BroadcastReport::default();
            }
        };

        let report = self.hub.broadcast(code, &subscribers, &event);

        if !report.failed.is_empty() {
            match self.sessions.remove_subscribers(code, &report.failed).await {
                Ok(removed) => {
                    tracing::info!("Pruned {} closed subscribers from game {}", removed, code)
                }
                Err(e) => tracing::warn!("Failed to prune subscribers of game {}: {}", code, e),
            }
        }

        report
    }
}

/// A round the session references but the round store lacks is an
/// inconsistency, not a client error
fn missing_round_is_internal(code: &str, err: GameError) -> GameError {
    match err {
        GameError::NotFound { kind: "round", id } => {
            tracing::error!("Game {} references missing round {}", code, id);
            GameError::Internal(format!("round {} of game {} is missing", id, code))
        }
        other => other,
    }
}
