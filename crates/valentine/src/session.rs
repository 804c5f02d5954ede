//! Conversation state for the send-valentine flow.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Where a user is in the send-valentine flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeStage {
    /// Waiting for the handle of the person to send to.
    AwaitingUsername,
    /// Waiting for the valentine text.
    AwaitingMessage { target_handle: String },
}

/// Per-user conversation state, keyed by chat identity.
///
/// Implementations need not persist anything; an abandoned flow may sit in
/// the store until it is cleared or the process exits.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Start a fresh flow, discarding any state the user had.
    async fn begin(&self, user_id: i64) {
        self.advance(user_id, ComposeStage::AwaitingUsername).await;
    }

    /// Current stage, if the user is in a flow.
    async fn get(&self, user_id: i64) -> Option<ComposeStage>;

    /// Replace the user's stage.
    async fn advance(&self, user_id: i64, stage: ComposeStage);

    /// End the user's flow.
    async fn clear(&self, user_id: i64);
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<i64, ComposeStage>>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users currently mid-flow.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether nobody is mid-flow.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: i64) -> Option<ComposeStage> {
        self.sessions.read().await.get(&user_id).cloned()
    }

    async fn advance(&self, user_id: i64, stage: ComposeStage) {
        self.sessions.write().await.insert(user_id, stage);
    }

    async fn clear(&self, user_id: i64) {
        self.sessions.write().await.remove(&user_id);
    }
}
