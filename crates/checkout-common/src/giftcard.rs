//! Gift card balance types

use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// Balance of a gift card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    /// Available balance
    pub balance: Amount,
    /// Maximum amount that can be charged in one transaction
    #[serde(default)]
    pub transaction_limit: Option<Amount>,
}

/// Outcome of comparing a gift card balance with the amount to pay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GiftCardBalanceStatus {
    /// Gift card covers the whole amount
    FullPayment {
        /// Amount charged to the gift card
        amount_paid: Amount,
        /// Balance left on the gift card
        remaining_balance: Amount,
    },
    /// Gift card covers part of the amount
    PartialPayment {
        /// Amount charged to the gift card
        amount_paid: Amount,
        /// Balance left on the gift card
        remaining_balance: Amount,
    },
    /// Gift card currency differs from the payment currency
    NonMatchingCurrencies,
    /// Nothing to pay
    ZeroAmountToBePaid,
    /// Gift card is empty
    ZeroBalance,
}

/// Next step of the gift card flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GiftCardAction {
    /// Input is not complete yet
    #[default]
    Idle,
    /// Balance has to be checked
    CheckBalance,
    /// An order has to be created before paying
    CreateOrder,
    /// Payment can be sent
    SendPayment,
}
