//! Address form types

use serde::{Deserialize, Serialize};

use crate::validation::FieldState;

/// Address form requirement configured for a component
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AddressConfiguration {
    /// No address form, address is never sent
    #[default]
    None,
    /// Full billing address form, all mandatory fields are required
    FullAddress {
        /// Country selected when the shopper has not chosen one
        default_country_code: Option<String>,
        /// Countries the shopper can choose from, empty means all
        supported_country_codes: Vec<String>,
    },
}

impl AddressConfiguration {
    /// Whether the address participates in validation and is attached to the payload
    pub fn is_required(&self) -> bool {
        matches!(self, Self::FullAddress { .. })
    }
}

/// Address as typed by the shopper
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressInput {
    /// Postal code
    pub postal_code: String,
    /// Street
    pub street: String,
    /// State or province
    pub state_or_province: String,
    /// House number or name
    pub house_number_or_name: String,
    /// Apartment or suite
    pub apartment_suite: String,
    /// City
    pub city: String,
    /// ISO 3166-1 alpha-2 country code
    pub country: String,
}

impl AddressInput {
    /// Whether no field has been filled
    pub fn is_empty(&self) -> bool {
        [
            &self.postal_code,
            &self.street,
            &self.state_or_province,
            &self.house_number_or_name,
            &self.apartment_suite,
            &self.city,
            &self.country,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }
}

/// Validated address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressOutputData {
    /// Postal code
    pub postal_code: FieldState<String>,
    /// Street
    pub street: FieldState<String>,
    /// State or province
    pub state_or_province: FieldState<String>,
    /// House number or name
    pub house_number_or_name: FieldState<String>,
    /// Apartment or suite
    pub apartment_suite: FieldState<String>,
    /// City
    pub city: FieldState<String>,
    /// Country
    pub country: FieldState<String>,
    /// Address is not required, every field reports valid
    pub is_optional: bool,
}

impl AddressOutputData {
    /// Conjunction of all field validations
    pub fn is_valid(&self) -> bool {
        self.is_optional
            || (self.postal_code.is_valid()
                && self.street.is_valid()
                && self.state_or_province.is_valid()
                && self.house_number_or_name.is_valid()
                && self.apartment_suite.is_valid()
                && self.city.is_valid()
                && self.country.is_valid())
    }
}

/// Billing address sent with a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// City
    pub city: String,
    /// Country code
    pub country: String,
    /// House number, with the apartment appended when present
    pub house_number_or_name: String,
    /// Postal code
    pub postal_code: String,
    /// State or province
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_or_province: Option<String>,
    /// Street
    pub street: String,
}
