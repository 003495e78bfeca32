use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use innerspace_core::flows::ConversationState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conversation store unavailable: {0}")]
    Unavailable(String),
}

/// Ephemeral per-sender dialogue state, keyed by phone number.
///
/// A missing entry means the sender is at the start of the dialogue.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get(&self, phone: &str) -> Result<Option<ConversationState>, StoreError>;
    async fn set(&self, phone: &str, state: ConversationState) -> Result<(), StoreError>;
    async fn delete(&self, phone: &str) -> Result<(), StoreError>;
    /// Drops idle entries and returns how many were removed.
    async fn purge_expired(&self) -> Result<usize, StoreError>;
}

struct StoredConversation {
    state: ConversationState,
    touched_at: Instant,
}

/// Process-local store. Entries untouched for `idle_timeout` read as absent.
#[derive(Default)]
pub struct InMemoryConversationStore {
    entries: RwLock<HashMap<String, StoredConversation>>,
    idle_timeout: Option<Duration>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self { entries: RwLock::default(), idle_timeout: Some(idle_timeout) }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn is_expired(&self, entry: &StoredConversation, now: Instant) -> bool {
        self.idle_timeout
            .is_some_and(|timeout| now.saturating_duration_since(entry.touched_at) >= timeout)
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get(&self, phone: &str) -> Result<Option<ConversationState>, StoreError> {
        let entries = self.entries.read().await;
        let now = Instant::now();
        Ok(entries
            .get(phone)
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| entry.state.clone()))
    }

    async fn set(&self, phone: &str, state: ConversationState) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(phone.to_string(), StoredConversation { state, touched_at: Instant::now() });
        Ok(())
    }

    async fn delete(&self, phone: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(phone);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        Ok(before - entries.len())
    }
}
