//! Billing address validation

use std::collections::HashMap;

use checkout_common::validation::ReasonCode;
use checkout_common::{
    Address, AddressConfiguration, AddressInput, AddressOutputData, FieldState, Validation,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Reason codes of invalid address fields
pub mod reasons {
    /// Mandatory field is blank
    pub const REQUIRED: &str = "address_field_required";
    /// Postal code does not match the country format
    pub const INVALID_POSTAL_CODE: &str = "address_postal_code_invalid";
    /// Country is not in the supported list
    pub const UNSUPPORTED_COUNTRY: &str = "address_country_not_supported";
}

const COUNTRIES_REQUIRING_STATE: [&str; 2] = ["US", "CA"];

static POSTAL_CODE_FORMATS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    [
        ("US", r"^\d{5}(-\d{4})?$"),
        ("CA", r"^[A-Za-z]\d[A-Za-z] ?\d[A-Za-z]\d$"),
        ("NL", r"^\d{4} ?[A-Za-z]{2}$"),
        ("GB", r"^[A-Za-z]{1,2}\d[A-Za-z\d]? ?\d[A-Za-z]{2}$"),
    ]
    .into_iter()
    .filter_map(|(country, pattern)| Regex::new(pattern).ok().map(|regex| (country, regex)))
    .collect()
});

/// Validate `input` under `configuration`
///
/// With [`AddressConfiguration::None`] every field is valid and the address is optional.
pub fn validate_address(
    input: &AddressInput,
    configuration: &AddressConfiguration,
) -> AddressOutputData {
    let AddressConfiguration::FullAddress {
        default_country_code,
        supported_country_codes,
    } = configuration
    else {
        return AddressOutputData {
            postal_code: FieldState::valid(input.postal_code.clone()),
            street: FieldState::valid(input.street.clone()),
            state_or_province: FieldState::valid(input.state_or_province.clone()),
            house_number_or_name: FieldState::valid(input.house_number_or_name.clone()),
            apartment_suite: FieldState::valid(input.apartment_suite.clone()),
            city: FieldState::valid(input.city.clone()),
            country: FieldState::valid(input.country.clone()),
            is_optional: true,
        };
    };

    let country = match input.country.trim() {
        "" => default_country_code.clone().unwrap_or_default(),
        country => country.to_uppercase(),
    };

    let country_validation = if country.is_empty() {
        Validation::Invalid(reasons::REQUIRED)
    } else {
        Validation::check(
            supported_country_codes.is_empty()
                || supported_country_codes
                    .iter()
                    .any(|supported| supported.eq_ignore_ascii_case(&country)),
            reasons::UNSUPPORTED_COUNTRY,
        )
    };

    let state_or_province = if COUNTRIES_REQUIRING_STATE.contains(&country.as_str()) {
        required(&input.state_or_province)
    } else {
        FieldState::valid(input.state_or_province.clone())
    };

    AddressOutputData {
        postal_code: FieldState::new(
            input.postal_code.clone(),
            validate_postal_code(&input.postal_code, &country),
        ),
        street: required(&input.street),
        state_or_province,
        house_number_or_name: required(&input.house_number_or_name),
        apartment_suite: FieldState::valid(input.apartment_suite.clone()),
        city: required(&input.city),
        country: FieldState::new(country, country_validation),
        is_optional: false,
    }
}

fn required(value: &str) -> FieldState<String> {
    FieldState::new(
        value.to_string(),
        Validation::check(!value.trim().is_empty(), reasons::REQUIRED),
    )
}

fn validate_postal_code(postal_code: &str, country: &str) -> Validation {
    let postal_code = postal_code.trim();
    if postal_code.is_empty() {
        return Validation::Invalid(reasons::REQUIRED);
    }

    match POSTAL_CODE_FORMATS.get(country) {
        Some(format) => Validation::check(format.is_match(postal_code), reasons::INVALID_POSTAL_CODE),
        None => Validation::Valid,
    }
}

/// Reason of the first invalid field, if any
pub fn first_invalid_reason(output: &AddressOutputData) -> Option<ReasonCode> {
    [
        &output.street,
        &output.house_number_or_name,
        &output.apartment_suite,
        &output.postal_code,
        &output.city,
        &output.state_or_province,
        &output.country,
    ]
    .into_iter()
    .find_map(|field| field.validation.reason())
}

/// Billing address payload, only present when the address form is shown and valid
pub fn billing_address(
    output: &AddressOutputData,
    configuration: &AddressConfiguration,
) -> Option<Address> {
    if !configuration.is_required() || !output.is_valid() {
        return None;
    }

    let state_or_province = output.state_or_province.value.trim();

    Some(Address {
        city: output.city.value.trim().to_string(),
        country: output.country.value.clone(),
        house_number_or_name: output.house_number_or_name.value.trim().to_string(),
        postal_code: output.postal_code.value.trim().to_string(),
        state_or_province: (!state_or_province.is_empty()).then(|| state_or_province.to_string()),
        street: output.street.value.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_address(country: Option<&str>) -> AddressConfiguration {
        AddressConfiguration::FullAddress {
            default_country_code: country.map(str::to_string),
            supported_country_codes: vec![],
        }
    }

    fn us_address() -> AddressInput {
        AddressInput {
            postal_code: "94107".to_string(),
            street: "Market Street".to_string(),
            state_or_province: "CA".to_string(),
            house_number_or_name: "505".to_string(),
            apartment_suite: String::new(),
            city: "San Francisco".to_string(),
            country: "US".to_string(),
        }
    }

    #[test]
    fn test_no_address_is_always_valid() {
        let output = validate_address(&AddressInput::default(), &AddressConfiguration::None);

        assert!(output.is_optional);
        assert!(output.is_valid());
        assert_eq!(billing_address(&output, &AddressConfiguration::None), None);
    }

    #[test]
    fn test_full_address_requires_fields() {
        let output = validate_address(&AddressInput::default(), &full_address(None));

        assert!(!output.is_valid());
        assert_eq!(output.street.validation, Validation::Invalid(reasons::REQUIRED));
        assert_eq!(output.country.validation, Validation::Invalid(reasons::REQUIRED));
        assert!(output.apartment_suite.is_valid());
        assert_eq!(first_invalid_reason(&output), Some(reasons::REQUIRED));
    }

    #[test]
    fn test_valid_us_address() {
        let configuration = full_address(Some("US"));
        let output = validate_address(&us_address(), &configuration);

        assert!(output.is_valid());
        let address = billing_address(&output, &configuration).expect("valid address");
        assert_eq!(address.country, "US");
        assert_eq!(address.state_or_province.as_deref(), Some("CA"));
    }

    #[test]
    fn test_state_required_for_us_only() {
        let input = AddressInput {
            state_or_province: String::new(),
            ..us_address()
        };
        let output = validate_address(&input, &full_address(None));
        assert_eq!(
            output.state_or_province.validation,
            Validation::Invalid(reasons::REQUIRED)
        );

        let input = AddressInput {
            postal_code: "1012 JS".to_string(),
            state_or_province: String::new(),
            country: "NL".to_string(),
            ..us_address()
        };
        let output = validate_address(&input, &full_address(None));
        assert!(output.is_valid());
        let address = billing_address(&output, &full_address(None)).expect("valid address");
        assert_eq!(address.state_or_province, None);
    }

    #[test]
    fn test_postal_code_format() {
        let input = AddressInput {
            postal_code: "ABCDE".to_string(),
            ..us_address()
        };
        let output = validate_address(&input, &full_address(None));

        assert_eq!(
            output.postal_code.validation,
            Validation::Invalid(reasons::INVALID_POSTAL_CODE)
        );

        assert_eq!(validate_postal_code("SW1A 1AA", "GB"), Validation::Valid);
        assert_eq!(validate_postal_code("K1A 0B1", "CA"), Validation::Valid);
        assert_eq!(validate_postal_code("10115", "DE"), Validation::Valid);
    }

    #[test]
    fn test_default_country_and_supported_list() {
        let input = AddressInput {
            country: String::new(),
            ..us_address()
        };
        let output = validate_address(&input, &full_address(Some("US")));
        assert_eq!(output.country.value, "US");
        assert!(output.country.is_valid());

        let configuration = AddressConfiguration::FullAddress {
            default_country_code: None,
            supported_country_codes: vec!["NL".to_string()],
        };
        let output = validate_address(&us_address(), &configuration);
        assert_eq!(
            output.country.validation,
            Validation::Invalid(reasons::UNSUPPORTED_COUNTRY)
        );
    }
}
