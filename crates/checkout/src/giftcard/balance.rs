//! Balance classification

use checkout_common::{Amount, BalanceResult, GiftCardBalanceStatus};

/// Compare a gift card balance with the amount to pay
///
/// The payable amount is capped by the transaction limit when there is one. A missing or empty
/// amount to pay is classified as [`GiftCardBalanceStatus::ZeroAmountToBePaid`].
pub fn check_balance(
    balance: &Amount,
    transaction_limit: Option<&Amount>,
    amount_to_be_paid: Option<&Amount>,
) -> GiftCardBalanceStatus {
    let amount_to_be_paid = match amount_to_be_paid {
        Some(amount) if !amount.is_empty() => amount,
        _ => return GiftCardBalanceStatus::ZeroAmountToBePaid,
    };

    if !balance.same_currency(amount_to_be_paid) {
        return GiftCardBalanceStatus::NonMatchingCurrencies;
    }

    if let Some(limit) = transaction_limit {
        if !limit.same_currency(balance) {
            return GiftCardBalanceStatus::NonMatchingCurrencies;
        }
    }

    if amount_to_be_paid.value <= 0 {
        return GiftCardBalanceStatus::ZeroAmountToBePaid;
    }

    if balance.value <= 0 {
        return GiftCardBalanceStatus::ZeroBalance;
    }

    let max_payable = match transaction_limit {
        Some(limit) => balance.value.min(limit.value),
        None => balance.value,
    };

    let with_value = |value: i64| Amount {
        currency: balance.currency.clone(),
        value,
    };

    if max_payable >= amount_to_be_paid.value {
        GiftCardBalanceStatus::FullPayment {
            amount_paid: amount_to_be_paid.clone(),
            remaining_balance: with_value(balance.value - amount_to_be_paid.value),
        }
    } else {
        GiftCardBalanceStatus::PartialPayment {
            amount_paid: with_value(max_payable),
            remaining_balance: with_value(balance.value - max_payable),
        }
    }
}

/// [`check_balance`] for a balance check response
pub fn check_balance_result(
    result: &BalanceResult,
    amount_to_be_paid: Option<&Amount>,
) -> GiftCardBalanceStatus {
    check_balance(
        &result.balance,
        result.transaction_limit.as_ref(),
        amount_to_be_paid,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur(value: i64) -> Amount {
        Amount::new("EUR", value)
    }

    #[test]
    fn test_full_payment() {
        assert_eq!(
            check_balance(&eur(5000), None, Some(&eur(2000))),
            GiftCardBalanceStatus::FullPayment {
                amount_paid: eur(2000),
                remaining_balance: eur(3000),
            }
        );
    }

    #[test]
    fn test_partial_payment() {
        assert_eq!(
            check_balance(&eur(1500), None, Some(&eur(2000))),
            GiftCardBalanceStatus::PartialPayment {
                amount_paid: eur(1500),
                remaining_balance: eur(0),
            }
        );
    }

    #[test]
    fn test_transaction_limit_caps_payment() {
        assert_eq!(
            check_balance(&eur(5000), Some(&eur(1000)), Some(&eur(2000))),
            GiftCardBalanceStatus::PartialPayment {
                amount_paid: eur(1000),
                remaining_balance: eur(4000),
            }
        );
    }

    #[test]
    fn test_non_matching_currencies() {
        assert_eq!(
            check_balance(&eur(5000), None, Some(&Amount::new("USD", 100))),
            GiftCardBalanceStatus::NonMatchingCurrencies
        );
        assert_eq!(
            check_balance(&eur(5000), Some(&Amount::new("USD", 100)), Some(&eur(100))),
            GiftCardBalanceStatus::NonMatchingCurrencies
        );
    }

    #[test]
    fn test_zero_amounts() {
        assert_eq!(
            check_balance(&eur(5000), None, Some(&eur(0))),
            GiftCardBalanceStatus::ZeroAmountToBePaid
        );
        assert_eq!(
            check_balance(&eur(5000), None, None),
            GiftCardBalanceStatus::ZeroAmountToBePaid
        );
        assert_eq!(
            check_balance(&eur(0), None, Some(&eur(100))),
            GiftCardBalanceStatus::ZeroBalance
        );
    }
}
