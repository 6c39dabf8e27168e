//! Bin lookup types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bin lookup request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinLookupRequest {
    /// Encrypted first digits of the card number
    pub encrypted_bin: String,
    /// Unique request id
    pub request_id: String,
    /// Tx variants of the brands the merchant accepts
    pub supported_card_types: Vec<String>,
}

/// Bin lookup response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinLookupResponse {
    /// Brands matching the bin
    #[serde(default)]
    pub brands: Option<Vec<BrandResponse>>,
    /// Echo of the request id
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Brand entry of a bin lookup response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandResponse {
    /// Brand tx variant
    #[serde(default)]
    pub brand: Option<String>,
    /// Security code policy
    #[serde(default)]
    pub cvc_policy: Option<String>,
    /// Expiry date policy
    #[serde(default)]
    pub expiry_date_policy: Option<String>,
    /// Whether the Luhn check applies
    #[serde(default)]
    pub enable_luhn_check: Option<bool>,
    /// Whether the merchant supports the brand
    #[serde(default)]
    pub supported: Option<bool>,
}

/// Whether a card field must be filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FieldPolicy {
    /// Field must be filled
    #[default]
    Required,
    /// Field may be left empty
    Optional,
    /// Field is not shown
    Hidden,
}

impl FieldPolicy {
    /// Parse a policy, unknown values are treated as required
    pub fn parse(value: &str) -> Self {
        match value {
            "optional" => Self::Optional,
            "hidden" => Self::Hidden,
            _ => Self::Required,
        }
    }

    /// Whether the field must be filled
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }
}

/// Card brand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CardBrand {
    /// Visa
    Visa,
    /// Mastercard
    Mastercard,
    /// American Express
    Amex,
    /// Maestro
    Maestro,
    /// Bancontact
    Bcmc,
    /// Brand returned by the API without a local mapping
    Unknown(String),
}

impl CardBrand {
    /// Brand for a tx variant, unknown variants are kept
    pub fn from_tx_variant(tx_variant: &str) -> Self {
        match tx_variant {
            "visa" => Self::Visa,
            "mc" => Self::Mastercard,
            "amex" => Self::Amex,
            "maestro" => Self::Maestro,
            "bcmc" => Self::Bcmc,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Tx variant sent to the API
    pub fn tx_variant(&self) -> &str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mc",
            Self::Amex => "amex",
            Self::Maestro => "maestro",
            Self::Bcmc => "bcmc",
            Self::Unknown(tx_variant) => tx_variant,
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tx_variant())
    }
}

/// Card type detected for a card number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DetectedCardType {
    /// Brand
    pub card_brand: CardBrand,
    /// Whether the detection comes from the bin lookup service
    pub is_reliable: bool,
    /// Whether the Luhn check applies
    pub enable_luhn_check: bool,
    /// Security code policy
    pub cvc_policy: FieldPolicy,
    /// Expiry date policy
    pub expiry_date_policy: FieldPolicy,
    /// Whether the merchant supports the brand
    pub is_supported: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_policy_parse() {
        assert_eq!(FieldPolicy::parse("required"), FieldPolicy::Required);
        assert_eq!(FieldPolicy::parse("optional"), FieldPolicy::Optional);
        assert_eq!(FieldPolicy::parse("hidden"), FieldPolicy::Hidden);
        assert_eq!(FieldPolicy::parse("something"), FieldPolicy::Required);
    }

    #[test]
    fn test_card_brand_round_trip_unknown() {
        let brand = CardBrand::from_tx_variant("cartebancaire");
        assert_eq!(brand, CardBrand::Unknown("cartebancaire".to_string()));
        assert_eq!(brand.tx_variant(), "cartebancaire");
        assert_eq!(CardBrand::from_tx_variant("mc"), CardBrand::Mastercard);
    }
}
