//! Amount

use std::fmt;

use serde::{Deserialize, Serialize};

/// Monetary amount in minor units
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// ISO 4217 currency code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Value in minor units
    pub value: i64,
}

impl Amount {
    /// Placeholder for an amount that was never configured
    pub const EMPTY: Amount = Amount {
        currency: None,
        value: EMPTY_VALUE,
    };

    /// Create new [`Amount`]
    pub fn new(currency: impl Into<String>, value: i64) -> Self {
        Self {
            currency: Some(currency.into()),
            value,
        }
    }

    /// Whether this is [`Amount::EMPTY`] or has no currency
    ///
    /// A zero value with a currency is a valid amount.
    pub fn is_empty(&self) -> bool {
        self.currency.is_none() || self.value == EMPTY_VALUE
    }

    /// `None` for empty amounts
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Whether both amounts use the same currency
    pub fn same_currency(&self, other: &Amount) -> bool {
        self.currency.is_some() && self.currency == other.currency
    }
}

const EMPTY_VALUE: i64 = -1;

impl Default for Amount {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.currency {
            Some(currency) => write!(f, "{} {}", self.value, currency),
            None => write!(f, "{}", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_amount() {
        assert!(Amount::EMPTY.is_empty());
        assert!(Amount::default().is_empty());
        assert_eq!(Amount::EMPTY.non_empty(), None);
    }

    #[test]
    fn test_zero_amount_is_not_empty() {
        let amount = Amount::new("USD", 0);
        assert!(!amount.is_empty());
        assert_eq!(amount.clone().non_empty(), Some(amount));
    }

    #[test]
    fn test_amount_serialization() {
        let amount = Amount::new("EUR", 100);
        let json = serde_json::to_string(&amount).expect("serializable");
        assert_eq!(json, r#"{"currency":"EUR","value":100}"#);

        let parsed: Amount = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(parsed, amount);
    }

    #[test]
    fn test_same_currency() {
        assert!(Amount::new("EUR", 1).same_currency(&Amount::new("EUR", 5)));
        assert!(!Amount::new("EUR", 1).same_currency(&Amount::new("USD", 5)));
        assert!(!Amount::EMPTY.same_currency(&Amount::EMPTY));
    }
}
