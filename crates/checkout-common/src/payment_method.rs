//! Payment methods and their request payloads

use serde::{Deserialize, Serialize};

/// Known payment method types
pub mod types {
    /// ACH direct debit
    pub const ACH: &str = "ach";
    /// BACS direct debit
    pub const BACS: &str = "directdebit_GB";
    /// BLIK
    pub const BLIK: &str = "blik";
    /// Gift card
    pub const GIFTCARD: &str = "giftcard";
    /// Card
    pub const SCHEME: &str = "scheme";
    /// Bancontact card
    pub const BCMC: &str = "bcmc";
    /// Fallback when the payment method carries no type
    pub const UNKNOWN: &str = "unknown";
}

/// Payment method as returned by the payment methods endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    /// Payment method type
    #[serde(rename = "type", default)]
    pub payment_method_type: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Supported brands
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brands: Vec<String>,
    /// Gift card brand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl PaymentMethod {
    /// Create new [`PaymentMethod`] of the given type
    pub fn new(payment_method_type: impl Into<String>) -> Self {
        Self {
            payment_method_type: Some(payment_method_type.into()),
            ..Default::default()
        }
    }

    /// Type or [`types::UNKNOWN`]
    pub fn type_or_unknown(&self) -> &str {
        self.payment_method_type.as_deref().unwrap_or(types::UNKNOWN)
    }
}

/// ACH direct debit details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchPaymentMethod {
    /// Payment method type
    #[serde(rename = "type")]
    pub payment_method_type: String,
    /// Checkout attempt id from the analytics setup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_attempt_id: Option<String>,
    /// Encrypted bank account number
    pub encrypted_bank_account_number: String,
    /// Encrypted routing number
    pub encrypted_bank_location_id: String,
    /// Account owner
    pub owner_name: String,
}

/// BACS direct debit details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacsDirectDebitPaymentMethod {
    /// Payment method type
    #[serde(rename = "type")]
    pub payment_method_type: String,
    /// Checkout attempt id from the analytics setup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_attempt_id: Option<String>,
    /// Account holder
    pub holder_name: String,
    /// Account number
    pub bank_account_number: String,
    /// Sort code
    pub bank_location_id: String,
}

/// BLIK details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlikPaymentMethod {
    /// Payment method type
    #[serde(rename = "type")]
    pub payment_method_type: String,
    /// Checkout attempt id from the analytics setup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_attempt_id: Option<String>,
    /// Six digit code from the banking app
    pub blik_code: String,
}

/// Gift card details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCardPaymentMethod {
    /// Payment method type
    #[serde(rename = "type")]
    pub payment_method_type: String,
    /// Checkout attempt id from the analytics setup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_attempt_id: Option<String>,
    /// Encrypted card number
    pub encrypted_card_number: String,
    /// Encrypted PIN
    pub encrypted_security_code: String,
    /// Gift card brand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

/// Card details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPaymentMethod {
    /// Payment method type
    #[serde(rename = "type")]
    pub payment_method_type: String,
    /// Checkout attempt id from the analytics setup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_attempt_id: Option<String>,
    /// Encrypted card number
    pub encrypted_card_number: String,
    /// Encrypted expiry month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_expiry_month: Option<String>,
    /// Encrypted expiry year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_expiry_year: Option<String>,
    /// Encrypted security code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_security_code: Option<String>,
    /// Card holder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,
    /// Detected brand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}
