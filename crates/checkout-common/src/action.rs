//! Actions returned by payment calls

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Action the shopper has to complete before the payment is final
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Action type (`await`, `qrCode`, `redirect`, ...)
    #[serde(rename = "type")]
    pub action_type: String,
    /// Payment method the action belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_type: Option<String>,
    /// Payment data used for status polling and the details call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<String>,
    /// Redirect url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Action specific fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Details produced by handling an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionComponentData {
    /// Payment data of the handled action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<String>,
    /// Details to send to the details call
    pub details: Value,
}
