//! Errors

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Checkout Error
#[derive(Debug, Error)]
pub enum Error {
    /// Payment method type is not handled by the requested component
    #[error("Unsupported payment method type: `{0}`")]
    UnsupportedPaymentMethod(String),
    /// Public key could not be fetched, the component will never become ready
    #[error("Unable to fetch public key: {0}")]
    PublicKeyFetch(#[source] Box<Error>),
    /// Encryption of a sensitive field failed
    #[error(transparent)]
    Encryption(#[from] EncryptionError),
    /// Gift card balance could not be used for this payment
    #[error(transparent)]
    GiftCard(#[from] GiftCardError),
    /// Sessions flow was taken over but the merchant did not handle the call
    #[error("Sessions flow was already taken over in a previous call, `{0}` should be implemented")]
    FlowAlreadyTakenOver(String),
    /// Session response did not contain the expected data
    #[error("Invalid session response: {0}")]
    InvalidSessionResponse(String),
    /// Status polling ended without a final result
    #[error("Status polling timed out")]
    StatusPollingTimeout,
    /// Component used before `initialize`
    #[error("Component is not initialized")]
    NotInitialized,
    /// Client key is empty or belongs to another environment
    #[error("Invalid client key: {0}")]
    InvalidClientKey(String),
    /// Key-value store error
    #[error("KV store error: {0}")]
    KVStore(String),
    /// Invalid key-value store key
    #[error("Invalid KV store key: {0}")]
    KVStoreInvalidKey(String),
    /// Http transport error
    #[error("HTTP error: {1}")]
    HttpError(Option<u16>, String),
    /// Error returned by the checkout API
    #[error("API error: {0}")]
    ErrorResponse(ErrorResponse),
    /// Url parse error
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
    /// Serde json error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Custom error
    #[error("`{0}`")]
    Custom(String),
    /// Internal error
    #[error("Internal error")]
    Internal,
}

impl Error {
    /// Whether retrying the same request can not succeed
    ///
    /// Client side (4xx) responses and usage errors are definitive. Transport failures and
    /// server side (5xx) responses are not.
    pub fn is_definitive_failure(&self) -> bool {
        match self {
            Self::HttpError(Some(status), _) => (400..500).contains(status),
            Self::HttpError(None, _) => false,
            Self::ErrorResponse(response) => response
                .status
                .map(|status| (400..500).contains(&status))
                .unwrap_or(true),
            Self::Internal | Self::Custom(_) => false,
            _ => true,
        }
    }
}

impl From<ErrorResponse> for Error {
    fn from(err: ErrorResponse) -> Error {
        Self::ErrorResponse(err)
    }
}

/// Encryption error reported by a field encrypter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncryptionError {
    /// The public key could not be used
    #[error("Invalid public key: {0}")]
    InvalidKey(String),
    /// The value could not be encrypted
    #[error("Encryption failed: {0}")]
    Failed(String),
}

/// Reasons a gift card balance can not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GiftCardError {
    /// Gift card currency differs from the payment currency
    #[error("Currency of the gift card does not match the payment amount")]
    NonMatchingCurrencies,
    /// Payment amount is zero
    #[error("Amount of the payment is zero")]
    ZeroAmountToBePaid,
    /// Gift card has no balance left
    #[error("Gift card has no balance")]
    ZeroBalance,
}

/// Error body returned by the checkout API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status echoed in the body
    #[serde(default)]
    pub status: Option<u16>,
    /// API error code
    #[serde(default)]
    pub error_code: Option<String>,
    /// Human readable description
    #[serde(default)]
    pub message: String,
    /// Error category
    #[serde(default)]
    pub error_type: Option<String>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "code: {}, message: {}",
            self.error_code.as_deref().unwrap_or("unknown"),
            self.message
        )
    }
}

impl ErrorResponse {
    /// Error response from json
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;

        Self::from_value(value)
    }

    /// Error response from json Value
    ///
    /// Bodies that do not look like an error response are kept verbatim as the message.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match serde_json::from_value::<ErrorResponse>(value.clone()) {
            Ok(res) if res.error_code.is_some() || !res.message.is_empty() => Ok(res),
            _ => Ok(Self {
                status: None,
                error_code: None,
                message: value.to_string(),
                error_type: None,
            }),
        }
    }
}
