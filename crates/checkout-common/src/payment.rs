//! Component state and payment request payload

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::Amount;

/// Order a partial payment belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// PSP reference of the order
    pub psp_reference: String,
    /// Opaque order data
    pub order_data: String,
}

impl OrderRequest {
    /// Create new [`OrderRequest`]
    pub fn new(psp_reference: impl Into<String>, order_data: impl Into<String>) -> Self {
        Self {
            psp_reference: psp_reference.into(),
            order_data: order_data.into(),
        }
    }
}

/// Order returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    /// PSP reference of the order
    pub psp_reference: String,
    /// Opaque order data
    pub order_data: String,
    /// Total order amount
    #[serde(default)]
    pub amount: Option<Amount>,
    /// Amount still to be paid
    #[serde(default)]
    pub remaining_amount: Option<Amount>,
}

impl From<&OrderResponse> for OrderRequest {
    fn from(order: &OrderResponse) -> Self {
        Self {
            psp_reference: order.psp_reference.clone(),
            order_data: order.order_data.clone(),
        }
    }
}

/// Payment request payload built by a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentComponentData<P> {
    /// Payment method details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<P>,
    /// Order for partial payments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderRequest>,
    /// Amount configured on the component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    /// Shopper asked to store the payment method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_payment_method: Option<bool>,
    /// Billing address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    /// Shopper email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shopper_email: Option<String>,
}

impl<P> Default for PaymentComponentData<P> {
    fn default() -> Self {
        Self {
            payment_method: None,
            order: None,
            amount: None,
            store_payment_method: None,
            billing_address: None,
            shopper_email: None,
        }
    }
}

/// Readiness flags shared by every component state
pub trait ComponentState {
    /// Input passed validation (and encryption)
    fn is_input_valid(&self) -> bool;

    /// Every external dependency (public key) is available
    fn is_ready(&self) -> bool;

    /// State can be submitted
    fn is_valid(&self) -> bool {
        self.is_input_valid() && self.is_ready()
    }
}

/// Component state carrying a payment request payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentComponentState<P> {
    /// Payment request payload, empty unless the input is valid
    pub data: PaymentComponentData<P>,
    /// Input passed validation
    pub is_input_valid: bool,
    /// Public key is available
    pub is_ready: bool,
}

impl<P> PaymentComponentState<P> {
    /// Create new [`PaymentComponentState`]
    pub fn new(data: PaymentComponentData<P>, is_input_valid: bool, is_ready: bool) -> Self {
        Self {
            data,
            is_input_valid,
            is_ready,
        }
    }

    /// State without payload
    pub fn empty(is_input_valid: bool, is_ready: bool) -> Self {
        Self::new(PaymentComponentData::default(), is_input_valid, is_ready)
    }
}

impl<P> ComponentState for PaymentComponentState<P> {
    fn is_input_valid(&self) -> bool {
        self.is_input_valid
    }

    fn is_ready(&self) -> bool {
        self.is_ready
    }
}
