use super::AppState;
use crate::broadcast::Subscriber;
use crate::error::{require_non_empty, GameResult};
use crate::protocol::ServerEvent;
use crate::types::*;

impl AppState {
    /// Create a new session under a fresh code
    pub async fn create_session(&self) -> Session {
        let session = self.sessions.create().await;
        tracing::info!("Created game {}", session.code);
        session
    }

    /// Add a player to a session. The first player to join leads.
    pub async fn join_session(&self, code: &str, player_id: &str) -> GameResult<JoinOutcome> {
        require_non_empty("player_id", player_id)?;

        let leader = self
            .sessions
            .add_player(code, player_id.to_string())
            .await?;
        tracing::info!("Player {} joined game {} (leader: {})", player_id, code, leader);

        self.publish(
            code,
            ServerEvent::Joined {
                player_id: player_id.to_string(),
            },
        )
        .await;

        Ok(JoinOutcome { leader })
    }

    /// Register a live connection for the session's events
    pub async fn subscribe(&self, code: &str, subscriber: Subscriber) -> GameResult<()> {
        let id = subscriber.id.clone();
        self.sessions.add_subscriber(code, subscriber).await?;
        tracing::debug!("Subscriber {} attached to game {}", id, code);
        Ok(())
    }

    /// Called by the transport when a connection goes away
    pub async fn unsubscribe(&self, code: &str, subscriber_id: &str) -> GameResult<()> {
        let removed = self
            .sessions
            .remove_subscribers(code, &[subscriber_id.to_string()])
            .await?;
        if removed > 0 {
            tracing::debug!("Subscriber {} detached from game {}", subscriber_id, code);
        }
        Ok(())
    }

    pub async fn session_view(&self, code: &str) -> GameResult<SessionView> {
        let session = self.sessions.get(code).await?;
        let subscribers = self.sessions.subscribers(code).await?;
        Ok(SessionView {
            id: session.code,
            player_ids: session.player_ids,
            round_ids: session.round_ids,
            subscribers: subscribers.len(),
            ended: session.ended,
            created_at: session.created_at,
        })
    }
}
