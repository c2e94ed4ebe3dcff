use super::SessionRepository;
use crate::broadcast::Subscriber;
use crate::error::{GameError, GameResult};
use crate::ids;
use crate::types::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

struct SessionEntry {
    session: Session,
    subscribers: Vec<Subscriber>,
}

/// In-memory session store, lives for the whole process
pub struct MemSessionStore {
    sessions: RwLock<HashMap<SessionCode, Arc<Mutex<SessionEntry>>>>,
    code_length: usize,
}

impl MemSessionStore {
    pub fn new(code_length: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            code_length: code_length.max(1),
        }
    }

    async fn entry(&self, code: &str) -> GameResult<Arc<Mutex<SessionEntry>>> {
        self.sessions
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| GameError::session_not_found(code))
    }
}

impl Default for MemSessionStore {
    fn default() -> Self {
        Self::new(ids::DEFAULT_CODE_LENGTH)
    }
}

#[async_trait]
impl SessionRepository for MemSessionStore {
    async fn create(&self) -> Session {
        let mut sessions = self.sessions.write().await;

        // Re-roll on collision
        let code = loop {
            let code = ids::new_session_code(self.code_length);
            if !sessions.contains_key(&code) {
                break code;
            }
            tracing::debug!("Session code collision on {}, re-rolling", code);
        };

        let session = Session::new(code.clone());
        sessions.insert(
            code,
            Arc::new(Mutex::new(SessionEntry {
                session: session.clone(),
                subscribers: Vec::new(),
            })),
        );
        session
    }

    async fn get(&self, code: &str) -> GameResult<Session> {
        let entry = self.entry(code).await?;
        let entry = entry.lock().await;
        Ok(entry.session.clone())
    }

    async fn add_player(&self, code: &str, player_id: PlayerId) -> GameResult<bool> {
        let entry = self.entry(code).await?;
        let mut entry = entry.lock().await;
        let leader = entry.session.player_ids.is_empty();
        entry.session.player_ids.push(player_id);
        Ok(leader)
    }

    async fn add_subscriber(&self, code: &str, subscriber: Subscriber) -> GameResult<()> {
        let entry = self.entry(code).await?;
        entry.lock().await.subscribers.push(subscriber);
        Ok(())
    }

    async fn remove_subscribers(&self, code: &str, ids: &[SubscriberId]) -> GameResult<usize> {
        let entry = self.entry(code).await?;
        let mut entry = entry.lock().await;
        let before = entry.subscribers.len();
        entry.subscribers.retain(|s| !ids.contains(&s.id));
        Ok(before - entry.subscribers.len())
    }

    async fn subscribers(&self, code: &str) -> GameResult<Vec<Subscriber>> {
        let entry = self.entry(code).await?;
        let entry = entry.lock().await;
        Ok(entry.subscribers.clone())
    }

    async fn add_round(&self, code: &str, round_id: RoundId, limit: usize) -> GameResult<usize> {
        let entry = self.entry(code).await?;
        let mut entry = entry.lock().await;
        let session = &mut entry.session;

        if session.ended {
            return Err(GameError::Conflict(format!("game {} has ended", code)));
        }
        if session.round_ids.len() >= limit {
            return Err(GameError::Conflict(format!(
                "game {} already has {} rounds",
                code,
                session.round_ids.len()
            )));
        }

        session.round_ids.push(round_id);
        Ok(session.round_ids.len())
    }

    async fn mark_ended(&self, code: &str) -> GameResult<bool> {
        let entry = self.entry(code).await?;
        let mut entry = entry.lock().await;
        if entry.session.ended {
            return Ok(false);
        }
        entry.session.ended = true;
        Ok(true)
    }
}
