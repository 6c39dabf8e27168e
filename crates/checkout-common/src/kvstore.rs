//! Key-value persistence for component state that must survive process death
//!
//! Components never talk to platform storage directly; hosts pass a [`KVStore`] implementation
//! and components persist the few values they need (payment data, session model) through it.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Error;

/// Valid ASCII characters for namespace and key strings in KV store
pub const KVSTORE_NAMESPACE_KEY_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-";

/// Maximum length for namespace and key strings in KV store
pub const KVSTORE_NAMESPACE_KEY_MAX_LEN: usize = 120;

/// Validates that a string contains only valid KV store characters and is within length limits
pub fn validate_kvstore_string(s: &str) -> Result<(), Error> {
    if s.is_empty() {
        return Err(Error::KVStoreInvalidKey("key must not be empty".to_string()));
    }

    if s.len() > KVSTORE_NAMESPACE_KEY_MAX_LEN {
        return Err(Error::KVStoreInvalidKey(format!(
            "{KVSTORE_NAMESPACE_KEY_MAX_LEN} exceeds maximum length of key characters"
        )));
    }

    if !s
        .chars()
        .all(|c| KVSTORE_NAMESPACE_KEY_ALPHABET.contains(c))
    {
        return Err(Error::KVStoreInvalidKey("key contains invalid characters. Only ASCII letters, numbers, underscore, and hyphen are allowed".to_string()));
    }

    Ok(())
}

/// Validates namespace and key parameters for KV store operations
pub fn validate_kvstore_params(namespace: &str, key: &str) -> Result<(), Error> {
    validate_kvstore_string(namespace)?;
    validate_kvstore_string(key)?;

    if key == namespace {
        return Err(Error::KVStoreInvalidKey(format!(
            "Key '{key}' conflicts with namespace names"
        )));
    }

    Ok(())
}

/// Key-Value Store
#[async_trait]
pub trait KVStore: std::fmt::Debug + Send + Sync {
    /// Read value from key-value store
    async fn kv_read(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, Error>;

    /// Write value to key-value store
    async fn kv_write(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), Error>;

    /// Remove value from key-value store
    async fn kv_remove(&self, namespace: &str, key: &str) -> Result<(), Error>;
}

/// In-memory [`KVStore`], state is lost with the process
#[derive(Debug, Default)]
pub struct MemoryKVStore {
    values: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryKVStore {
    /// Create new [`MemoryKVStore`]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KVStore for MemoryKVStore {
    async fn kv_read(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, Error> {
        validate_kvstore_params(namespace, key)?;
        Ok(self
            .values
            .read()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn kv_write(&self, namespace: &str, key: &str, value: &[u8]) -> Result<(), Error> {
        validate_kvstore_params(namespace, key)?;
        self.values
            .write()
            .insert((namespace.to_string(), key.to_string()), value.to_vec());
        Ok(())
    }

    async fn kv_remove(&self, namespace: &str, key: &str) -> Result<(), Error> {
        validate_kvstore_params(namespace, key)?;
        self.values
            .write()
            .remove(&(namespace.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_kvstore_string() {
        assert!(validate_kvstore_string("payment_data").is_ok());
        assert!(validate_kvstore_string("session-model").is_ok());
        assert!(validate_kvstore_string("").is_err());
        assert!(validate_kvstore_string("has space").is_err());
        assert!(validate_kvstore_string("slash/key").is_err());
        assert!(validate_kvstore_string(&"a".repeat(KVSTORE_NAMESPACE_KEY_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_key_conflicting_with_namespace() {
        assert!(validate_kvstore_params("checkout", "checkout").is_err());
        assert!(validate_kvstore_params("checkout", "payment_data").is_ok());
    }

    #[tokio::test]
    async fn test_memory_kvstore() {
        let store = MemoryKVStore::new();

        assert_eq!(store.kv_read("checkout", "key").await.expect("read"), None);

        store.kv_write("checkout", "key", b"value").await.expect("write");
        assert_eq!(
            store.kv_read("checkout", "key").await.expect("read"),
            Some(b"value".to_vec())
        );

        store.kv_remove("checkout", "key").await.expect("remove");
        assert_eq!(store.kv_read("checkout", "key").await.expect("read"), None);

        assert!(store.kv_write("checkout", "bad key", b"value").await.is_err());
    }
}
