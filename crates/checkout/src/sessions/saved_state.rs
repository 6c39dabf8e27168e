//! Session state surviving process death

use std::sync::Arc;

use checkout_common::{Error, KVStore, SessionModel};
use serde::{Deserialize, Serialize};

const NAMESPACE: &str = "checkout";
const SESSION_KEY: &str = "session_model";

/// Persisted session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSessionState {
    /// Session model with the latest session data
    pub session_model: SessionModel,
    /// Whether the merchant took over the flow
    #[serde(default)]
    pub is_flow_taken_over: bool,
}

/// Stores [`SavedSessionState`] in a [`KVStore`]
#[derive(Debug, Clone)]
pub struct SessionSavedStateHandle {
    store: Arc<dyn KVStore>,
}

impl SessionSavedStateHandle {
    /// Create new [`SessionSavedStateHandle`]
    pub fn new(store: Arc<dyn KVStore>) -> Self {
        Self { store }
    }

    /// Saved state, `None` when nothing was saved
    pub async fn load(&self) -> Result<Option<SavedSessionState>, Error> {
        match self.store.kv_read(NAMESPACE, SESSION_KEY).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Save `state`, replacing the previous one
    pub async fn save(&self, state: &SavedSessionState) -> Result<(), Error> {
        let bytes = serde_json::to_vec(state)?;
        self.store.kv_write(NAMESPACE, SESSION_KEY, &bytes).await
    }

    /// Remove the saved state
    pub async fn clear(&self) -> Result<(), Error> {
        self.store.kv_remove(NAMESPACE, SESSION_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use checkout_common::MemoryKVStore;

    use super::*;

    #[tokio::test]
    async fn test_save_load_clear() {
        let handle = SessionSavedStateHandle::new(Arc::new(MemoryKVStore::new()));
        assert_eq!(handle.load().await.expect("load"), None);

        let state = SavedSessionState {
            session_model: SessionModel::new("CS1", Some("session_data".to_string())),
            is_flow_taken_over: true,
        };
        handle.save(&state).await.expect("save");
        assert_eq!(handle.load().await.expect("load"), Some(state));

        handle.clear().await.expect("clear");
        assert_eq!(handle.load().await.expect("load"), None);
    }

    #[tokio::test]
    async fn test_corrupt_state_is_an_error() {
        let store = Arc::new(MemoryKVStore::new());
        store
            .kv_write(NAMESPACE, SESSION_KEY, b"not json")
            .await
            .expect("write");

        let handle = SessionSavedStateHandle::new(store);
        assert!(matches!(handle.load().await, Err(Error::Json(_))));
    }
}
