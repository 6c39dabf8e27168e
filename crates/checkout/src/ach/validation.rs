//! ACH field validators

use checkout_common::{FieldState, Validation};

/// Reason codes of invalid ACH fields
pub mod reasons {
    /// Account number is not 4 to 17 digits
    pub const BANK_ACCOUNT_NUMBER_INVALID: &str = "ach_bank_account_number_invalid";
    /// Routing number is not 9 digits
    pub const BANK_LOCATION_ID_INVALID: &str = "ach_bank_location_id_invalid";
    /// Owner name is blank
    pub const OWNER_NAME_INVALID: &str = "ach_owner_name_invalid";
}

const BANK_ACCOUNT_NUMBER_LENGTH: std::ops::RangeInclusive<usize> = 4..=17;
const BANK_LOCATION_ID_LENGTH: usize = 9;

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn validate_bank_account_number(value: &str) -> FieldState<String> {
    FieldState::new(
        value.to_string(),
        Validation::check(
            is_digits(value) && BANK_ACCOUNT_NUMBER_LENGTH.contains(&value.len()),
            reasons::BANK_ACCOUNT_NUMBER_INVALID,
        ),
    )
}

pub(crate) fn validate_bank_location_id(value: &str) -> FieldState<String> {
    FieldState::new(
        value.to_string(),
        Validation::check(
            is_digits(value) && value.len() == BANK_LOCATION_ID_LENGTH,
            reasons::BANK_LOCATION_ID_INVALID,
        ),
    )
}

pub(crate) fn validate_owner_name(value: &str) -> FieldState<String> {
    FieldState::new(
        value.to_string(),
        Validation::check(!value.trim().is_empty(), reasons::OWNER_NAME_INVALID),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_account_number() {
        assert!(validate_bank_account_number("1234").is_valid());
        assert!(validate_bank_account_number("12345678901234567").is_valid());
        assert!(!validate_bank_account_number("123").is_valid());
        assert!(!validate_bank_account_number("123456789012345678").is_valid());
        assert!(!validate_bank_account_number("12a456").is_valid());
        assert!(!validate_bank_account_number("").is_valid());
    }

    #[test]
    fn test_bank_location_id() {
        assert!(validate_bank_location_id("123456789").is_valid());
        assert!(!validate_bank_location_id("12345678").is_valid());
        assert!(!validate_bank_location_id("1234567890").is_valid());
        assert_eq!(
            validate_bank_location_id("abcdefghi").validation.reason(),
            Some(reasons::BANK_LOCATION_ID_INVALID)
        );
    }

    #[test]
    fn test_owner_name() {
        assert!(validate_owner_name("Joseph").is_valid());
        assert!(!validate_owner_name("   ").is_valid());
    }
}
