//! Session registry
//!
//! One [`SessionHandle`] per connected client, owned by the relay instance
//! and shared behind a concurrency-safe map. No process-wide state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::protocol::ServerMessage;
use crate::{Error, Result};

/// Outbound channel depth per session
pub const OUTBOUND_BUFFER: usize = 32;

/// An active client connection
#[derive(Debug)]
pub struct SessionHandle {
    /// Unique session identifier
    pub id: Uuid,
    /// When the client connected
    pub connected_at: DateTime<Utc>,
    last_activity: Mutex<DateTime<Utc>>,
    outbound: mpsc::Sender<ServerMessage>,
}

impl SessionHandle {
    /// Create a session around an outbound message channel
    #[must_use]
    pub fn new(outbound: mpsc::Sender<ServerMessage>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            connected_at: now,
            last_activity: Mutex::new(now),
            outbound,
        }
    }

    /// Queue a message for delivery to this client
    ///
    /// # Errors
    ///
    /// Returns error if the client's outbound channel is closed
    pub async fn send(&self, message: ServerMessage) -> Result<()> {
        self.outbound
            .send(message)
            .await
            .map_err(|_| Error::Relay(format!("session {} outbound channel closed", self.id)))
    }

    /// Record inbound activity
    pub fn touch(&self) {
        if let Ok(mut last) = self.last_activity.lock() {
            *last = Utc::now();
        }
    }

    /// Last time this session received a message
    #[must_use]
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
            .lock()
            .map_or(self.connected_at, |last| *last)
    }
}

/// Concurrency-safe set of active sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<SessionHandle>>>,
}

impl SessionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session
    pub async fn insert(&self, session: Arc<SessionHandle>) {
        self.sessions.write().await.insert(session.id, session);
    }

    /// Remove a session; returns whether it was present
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Look up a session by id
    pub async fn get(&self, id: Uuid) -> Option<Arc<SessionHandle>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Number of active sessions
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Snapshot of active session ids
    pub async fn ids(&self) -> Vec<Uuid> {
        self.sessions.read().await.keys().copied().collect()
    }
}
