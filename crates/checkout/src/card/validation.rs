//! Card field validators

use checkout_common::bin_lookup::{CardBrand, DetectedCardType, FieldPolicy};
use checkout_common::{FieldState, Validation};
use time::Date;

/// Reason codes of invalid card fields
pub mod reasons {
    /// Number has the wrong length, non digits or fails the Luhn check
    pub const NUMBER_INVALID: &str = "card_number_invalid";
    /// Brand of the number is not accepted
    pub const NUMBER_UNSUPPORTED: &str = "card_number_unsupported";
    /// Expiry date is not `MM/YY` or `MM/YYYY`
    pub const EXPIRY_DATE_INVALID: &str = "card_expiry_date_invalid";
    /// Card is expired
    pub const EXPIRY_DATE_EXPIRED: &str = "card_expiry_date_expired";
    /// Expiry date is too far in the future
    pub const EXPIRY_DATE_TOO_FAR: &str = "card_expiry_date_too_far";
    /// Security code has the wrong length
    pub const SECURITY_CODE_INVALID: &str = "card_security_code_invalid";
    /// Holder name is required but blank
    pub const HOLDER_NAME_INVALID: &str = "card_holder_name_invalid";
}

const NUMBER_LENGTH: std::ops::RangeInclusive<usize> = 12..=19;
const MAX_EXPIRY_YEARS: i32 = 30;
const AMEX_SECURITY_CODE_LENGTH: usize = 4;
const SECURITY_CODE_LENGTH: usize = 3;

/// Card expiry month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpiryDate {
    /// Month, 1 to 12
    pub month: u8,
    /// Four digit year
    pub year: i32,
}

impl ExpiryDate {
    /// `MM`
    pub fn month_string(&self) -> String {
        format!("{:02}", self.month)
    }

    /// `YYYY`
    pub fn year_string(&self) -> String {
        self.year.to_string()
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn validate_card_number(
    number: &str,
    detected_card_types: &[DetectedCardType],
) -> FieldState<String> {
    let field = |validation| FieldState::new(number.to_string(), validation);

    if !is_digits(number) || !NUMBER_LENGTH.contains(&number.len()) {
        return field(Validation::Invalid(reasons::NUMBER_INVALID));
    }

    let reliable: Vec<&DetectedCardType> = detected_card_types
        .iter()
        .filter(|card_type| card_type.is_reliable)
        .collect();

    if !reliable.is_empty() && reliable.iter().all(|card_type| !card_type.is_supported) {
        return field(Validation::Invalid(reasons::NUMBER_UNSUPPORTED));
    }

    let check_luhn =
        reliable.is_empty() || reliable.iter().any(|card_type| card_type.enable_luhn_check);

    field(Validation::check(
        !check_luhn || luhn::valid(number),
        reasons::NUMBER_INVALID,
    ))
}

fn parse_expiry_date(value: &str) -> Option<ExpiryDate> {
    let (month, year) = value.trim().split_once('/')?;
    let (month, year) = (month.trim(), year.trim());

    if !is_digits(month) || !is_digits(year) {
        return None;
    }

    let month: u8 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    let year: i32 = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        4 => year.parse().ok()?,
        _ => return None,
    };

    Some(ExpiryDate { month, year })
}

/// Validate an expiry date against `today`, a card is valid until the end of its expiry month
pub(crate) fn validate_expiry_date(
    value: &str,
    policy: FieldPolicy,
    today: Date,
) -> FieldState<Option<ExpiryDate>> {
    if value.trim().is_empty() && !policy.is_required() {
        return FieldState::valid(None);
    }

    let Some(expiry_date) = parse_expiry_date(value) else {
        return FieldState::new(None, Validation::Invalid(reasons::EXPIRY_DATE_INVALID));
    };

    let current = (today.year(), u8::from(today.month()));
    let validation = if (expiry_date.year, expiry_date.month) < current {
        Validation::Invalid(reasons::EXPIRY_DATE_EXPIRED)
    } else if expiry_date.year > today.year() + MAX_EXPIRY_YEARS {
        Validation::Invalid(reasons::EXPIRY_DATE_TOO_FAR)
    } else {
        Validation::Valid
    };

    FieldState::new(Some(expiry_date), validation)
}

pub(crate) fn validate_security_code(
    value: &str,
    policy: FieldPolicy,
    brand: Option<&CardBrand>,
) -> FieldState<String> {
    match policy {
        FieldPolicy::Hidden => return FieldState::valid(String::new()),
        FieldPolicy::Optional if value.is_empty() => return FieldState::valid(String::new()),
        _ => {}
    }

    let expected_length = match brand {
        Some(CardBrand::Amex) => AMEX_SECURITY_CODE_LENGTH,
        _ => SECURITY_CODE_LENGTH,
    };

    FieldState::new(
        value.to_string(),
        Validation::check(
            is_digits(value) && value.len() == expected_length,
            reasons::SECURITY_CODE_INVALID,
        ),
    )
}

pub(crate) fn validate_holder_name(value: &str, is_required: bool) -> FieldState<String> {
    FieldState::new(
        value.trim().to_string(),
        Validation::check(
            !is_required || !value.trim().is_empty(),
            reasons::HOLDER_NAME_INVALID,
        ),
    )
}

#[cfg(test)]
mod tests {
    use time::Month;

    use super::*;

    fn today() -> Date {
        Date::from_calendar_date(2026, Month::March, 15).expect("valid date")
    }

    fn reliable(card_brand: CardBrand, enable_luhn_check: bool, is_supported: bool) -> DetectedCardType {
        DetectedCardType {
            card_brand,
            is_reliable: true,
            enable_luhn_check,
            cvc_policy: FieldPolicy::Required,
            expiry_date_policy: FieldPolicy::Required,
            is_supported,
        }
    }

    #[test]
    fn test_card_number_luhn() {
        assert!(validate_card_number("4111111111111111", &[]).is_valid());
        assert!(!validate_card_number("4111111111111112", &[]).is_valid());
        assert!(!validate_card_number("41111111111", &[]).is_valid());
        assert!(!validate_card_number("4111 1111 1111 1111", &[]).is_valid());
    }

    #[test]
    fn test_card_number_luhn_disabled_by_lookup() {
        let detected = [reliable(CardBrand::Unknown("plcc".to_string()), false, true)];
        assert!(validate_card_number("4111111111111112", &detected).is_valid());
    }

    #[test]
    fn test_card_number_unsupported() {
        let detected = [reliable(CardBrand::Amex, true, false)];
        assert_eq!(
            validate_card_number("371449635398431", &detected)
                .validation
                .reason(),
            Some(reasons::NUMBER_UNSUPPORTED)
        );
    }

    #[test]
    fn test_expiry_date() {
        let valid = validate_expiry_date("03/26", FieldPolicy::Required, today());
        assert!(valid.is_valid());
        assert_eq!(valid.value, Some(ExpiryDate { month: 3, year: 2026 }));

        assert!(validate_expiry_date("12/2030", FieldPolicy::Required, today()).is_valid());
        assert_eq!(
            validate_expiry_date("02/26", FieldPolicy::Required, today())
                .validation
                .reason(),
            Some(reasons::EXPIRY_DATE_EXPIRED)
        );
        assert_eq!(
            validate_expiry_date("01/2070", FieldPolicy::Required, today())
                .validation
                .reason(),
            Some(reasons::EXPIRY_DATE_TOO_FAR)
        );
        for invalid in ["13/26", "1226", "ab/cd", "", "03/026"] {
            assert_eq!(
                validate_expiry_date(invalid, FieldPolicy::Required, today())
                    .validation
                    .reason(),
                Some(reasons::EXPIRY_DATE_INVALID),
                "{invalid}"
            );
        }
        assert!(validate_expiry_date("", FieldPolicy::Optional, today()).is_valid());
    }

    #[test]
    fn test_security_code_policy() {
        assert!(validate_security_code("737", FieldPolicy::Required, None).is_valid());
        assert!(!validate_security_code("", FieldPolicy::Required, None).is_valid());
        assert!(!validate_security_code("737", FieldPolicy::Required, Some(&CardBrand::Amex)).is_valid());
        assert!(validate_security_code("7373", FieldPolicy::Required, Some(&CardBrand::Amex)).is_valid());
        assert!(validate_security_code("", FieldPolicy::Optional, None).is_valid());
        assert!(!validate_security_code("7", FieldPolicy::Optional, None).is_valid());
        assert!(validate_security_code("whatever", FieldPolicy::Hidden, None).is_valid());
    }

    #[test]
    fn test_holder_name() {
        assert!(validate_holder_name("", false).is_valid());
        assert!(!validate_holder_name(" ", true).is_valid());
        assert_eq!(validate_holder_name(" J. Smith ", true).value, "J. Smith");
    }
}
