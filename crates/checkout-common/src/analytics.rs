//! Analytics and client key types

use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// Analytics setup request sent when a component is initialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSetupRequest {
    /// SDK version
    pub version: String,
    /// Integration channel
    pub channel: String,
    /// Integration platform
    pub platform: String,
    /// Shopper locale
    pub locale: String,
    /// Payment method type of the component
    pub component: String,
    /// `components` or `dropin`
    pub flavor: String,
    /// Amount of the payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    /// Session id when using the sessions flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Analytics setup response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSetupResponse {
    /// Id attached to every payment made from this component
    #[serde(default)]
    pub checkout_attempt_id: Option<String>,
}

/// Client key response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    /// Public key used for client side encryption
    pub public_key: String,
}
