//! Sessions API types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;
use crate::amount::Amount;
use crate::giftcard::BalanceResult;
use crate::payment::{OrderRequest, OrderResponse};

/// Session created by the merchant backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionModel {
    /// Session id
    pub id: String,
    /// Opaque session data, refreshed after every call
    #[serde(default)]
    pub session_data: Option<String>,
}

impl SessionModel {
    /// Create new [`SessionModel`]
    pub fn new(id: impl Into<String>, session_data: Option<String>) -> Self {
        Self {
            id: id.into(),
            session_data,
        }
    }
}

/// Session setup request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSetupRequest {
    /// Session data
    pub session_data: String,
    /// Order of an ongoing partial payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderRequest>,
}

/// Session configuration returned by the setup call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSetupConfiguration {
    /// Whether the store payment method switch is shown
    #[serde(default)]
    pub enable_store_details: Option<bool>,
    /// Whether stored payment methods can be removed
    #[serde(default)]
    pub show_remove_payment_method_button: Option<bool>,
}

/// Session setup response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSetupResponse {
    /// Session id
    pub id: String,
    /// Refreshed session data
    pub session_data: String,
    /// Amount of the session
    #[serde(default)]
    pub amount: Option<Amount>,
    /// Session expiry
    #[serde(default)]
    pub expires_at: Option<String>,
    /// Available payment methods, passed through untouched
    #[serde(default)]
    pub payment_methods: Option<Value>,
    /// Return url for redirects
    #[serde(default)]
    pub return_url: Option<String>,
    /// Component configuration set on the session
    #[serde(default)]
    pub configuration: Option<SessionSetupConfiguration>,
    /// Shopper locale
    #[serde(default)]
    pub shopper_locale: Option<String>,
}

/// Payments call through a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPaymentsRequest {
    /// Session data
    pub session_data: String,
    /// Serialized payment component data
    #[serde(flatten)]
    pub payment_component_data: Value,
}

/// Payments response through a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPaymentsResponse {
    /// Refreshed session data
    pub session_data: String,
    /// Final session result
    #[serde(default)]
    pub session_result: Option<String>,
    /// Payment result code
    #[serde(default)]
    pub result_code: Option<String>,
    /// Action to handle
    #[serde(default)]
    pub action: Option<Action>,
    /// Order of a partial payment
    #[serde(default)]
    pub order: Option<OrderResponse>,
}

/// Details call through a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailsRequest {
    /// Session data
    pub session_data: String,
    /// Payment data of the handled action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<String>,
    /// Action details
    pub details: Value,
}

/// Balance check through a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBalanceRequest {
    /// Session data
    pub session_data: String,
    /// Serialized payment method details
    pub payment_method: Value,
    /// Amount to check against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

/// Balance check response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBalanceResponse {
    /// Refreshed session data
    pub session_data: String,
    /// Available balance
    pub balance: Amount,
    /// Maximum amount per transaction
    #[serde(default)]
    pub transaction_limit: Option<Amount>,
}

impl From<&SessionBalanceResponse> for BalanceResult {
    fn from(response: &SessionBalanceResponse) -> Self {
        Self {
            balance: response.balance.clone(),
            transaction_limit: response.transaction_limit.clone(),
        }
    }
}

/// Order creation through a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOrderRequest {
    /// Session data
    pub session_data: String,
}

/// Order creation response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOrderResponse {
    /// Refreshed session data
    pub session_data: String,
    /// Order data
    pub order_data: String,
    /// PSP reference of the order
    pub psp_reference: String,
}

impl From<&SessionOrderResponse> for OrderResponse {
    fn from(response: &SessionOrderResponse) -> Self {
        Self {
            psp_reference: response.psp_reference.clone(),
            order_data: response.order_data.clone(),
            amount: None,
            remaining_amount: None,
        }
    }
}

/// Order cancellation through a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCancelOrderRequest {
    /// Session data
    pub session_data: String,
    /// Order to cancel
    pub order: OrderRequest,
}

/// Order cancellation response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCancelOrderResponse {
    /// Refreshed session data
    pub session_data: String,
    /// Cancellation status
    #[serde(default)]
    pub status: Option<String>,
}

/// Final result of a component driven by a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPaymentResult {
    /// Session result to verify on the merchant backend
    pub session_result: Option<String>,
    /// Session data after the last call
    pub session_data: Option<String>,
    /// Payment result code
    pub result_code: Option<String>,
    /// Order of a partial payment
    pub order: Option<OrderResponse>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_payments_request_flattens_component_data() {
        let request = SessionPaymentsRequest {
            session_data: "session-data".to_string(),
            payment_component_data: json!({
                "paymentMethod": {"type": "blik", "blikCode": "777777"},
                "amount": {"currency": "PLN", "value": 1000},
            }),
        };

        let value = serde_json::to_value(&request).expect("serializable");
        assert_eq!(value["sessionData"], "session-data");
        assert_eq!(value["paymentMethod"]["blikCode"], "777777");
        assert_eq!(value["amount"]["value"], 1000);
    }

    #[test]
    fn test_setup_response_deserialization() {
        let json = r#"{
            "id": "CS12345",
            "sessionData": "Ab02b4c0",
            "amount": {"currency": "EUR", "value": 1000},
            "returnUrl": "checkout://return",
            "configuration": {"enableStoreDetails": true}
        }"#;

        let response: SessionSetupResponse = serde_json::from_str(json).expect("valid json");
        assert_eq!(response.id, "CS12345");
        assert_eq!(response.amount, Some(Amount::new("EUR", 1000)));
        assert_eq!(
            response.configuration.and_then(|c| c.enable_store_details),
            Some(true)
        );
    }
}
