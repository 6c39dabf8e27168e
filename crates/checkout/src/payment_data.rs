//! Persisted payment data of an action in progress

use std::sync::Arc;

use checkout_common::{Error, KVStore};

const NAMESPACE: &str = "checkout";
const PAYMENT_DATA_KEY: &str = "payment_data";

/// Keeps the `paymentData` of the current action in a [`KVStore`]
///
/// Actions may outlive the process that started them, the payment data is needed to submit the
/// action details afterwards.
#[derive(Debug, Clone)]
pub struct PaymentDataRepository {
    store: Arc<dyn KVStore>,
}

impl PaymentDataRepository {
    /// Create new [`PaymentDataRepository`]
    pub fn new(store: Arc<dyn KVStore>) -> Self {
        Self { store }
    }

    /// Stored payment data
    pub async fn get(&self) -> Result<Option<String>, Error> {
        let Some(bytes) = self.store.kv_read(NAMESPACE, PAYMENT_DATA_KEY).await? else {
            return Ok(None);
        };

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|err| Error::KVStore(format!("payment data is not utf-8: {err}")))
    }

    /// Store payment data, `None` removes it
    pub async fn set(&self, payment_data: Option<&str>) -> Result<(), Error> {
        match payment_data {
            Some(payment_data) => {
                self.store
                    .kv_write(NAMESPACE, PAYMENT_DATA_KEY, payment_data.as_bytes())
                    .await
            }
            None => self.store.kv_remove(NAMESPACE, PAYMENT_DATA_KEY).await,
        }
    }
}
