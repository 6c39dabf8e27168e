//! BACS direct debit component
//!
//! BACS details are sent in clear, the component does not need a public key. The shopper first
//! fills the form and then confirms the mandate in a second step.

use std::sync::Arc;

use checkout_common::payment_method::{types, BacsDirectDebitPaymentMethod};
use checkout_common::{
    EncryptionError, Error, FieldState, PaymentComponentState, PaymentMethod, Validation,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::component::{
    ComponentParams, ComponentReducer, DelegateCore, PaymentComponentDelegate, StateContext,
    SubmitOutcome,
};
use crate::connector::CheckoutConnector;
use crate::encryption::Encrypter;

/// Reason codes of invalid BACS fields
pub mod reasons {
    /// Holder name is blank
    pub const HOLDER_NAME_INVALID: &str = "bacs_holder_name_invalid";
    /// Account number is not 8 digits
    pub const BANK_ACCOUNT_NUMBER_INVALID: &str = "bacs_bank_account_number_invalid";
    /// Sort code is not 6 digits
    pub const SORT_CODE_INVALID: &str = "bacs_sort_code_invalid";
    /// Email address is malformed
    pub const SHOPPER_EMAIL_INVALID: &str = "bacs_shopper_email_invalid";
}

const BANK_ACCOUNT_NUMBER_LENGTH: usize = 8;
const SORT_CODE_LENGTH: usize = 6;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("valid email pattern")
});

/// Step of the BACS form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BacsMode {
    /// Shopper enters the details
    #[default]
    Input,
    /// Shopper reviews the details and confirms the mandate
    Confirmation,
}

/// Shopper input of the BACS form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BacsInputData {
    /// Account holder
    pub holder_name: String,
    /// Account number
    pub bank_account_number: String,
    /// Sort code
    pub sort_code: String,
    /// Email the mandate is sent to
    pub shopper_email: String,
    /// Shopper agreed to the amount being debited
    pub is_amount_consent_checked: bool,
    /// Shopper confirmed being the account holder
    pub is_account_consent_checked: bool,
    /// Form step
    pub mode: BacsMode,
}

/// Validated BACS form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacsOutputData {
    /// Account holder
    pub holder_name: FieldState<String>,
    /// Account number
    pub bank_account_number: FieldState<String>,
    /// Sort code
    pub sort_code: FieldState<String>,
    /// Email the mandate is sent to
    pub shopper_email: FieldState<String>,
    /// Shopper agreed to the amount being debited
    pub is_amount_consent_checked: bool,
    /// Shopper confirmed being the account holder
    pub is_account_consent_checked: bool,
    /// Form step
    pub mode: BacsMode,
}

impl BacsOutputData {
    /// Every field is valid and both consents are given
    pub fn is_valid(&self) -> bool {
        self.holder_name.is_valid()
            && self.bank_account_number.is_valid()
            && self.sort_code.is_valid()
            && self.shopper_email.is_valid()
            && self.is_amount_consent_checked
            && self.is_account_consent_checked
    }
}

/// State of the BACS component
pub type BacsComponentState = PaymentComponentState<BacsDirectDebitPaymentMethod>;

fn digits_of_length(value: &str, length: usize) -> bool {
    value.len() == length && value.chars().all(|c| c.is_ascii_digit())
}

/// BACS reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct BacsReducer;

impl ComponentReducer for BacsReducer {
    type Input = BacsInputData;
    type Output = BacsOutputData;
    type State = BacsComponentState;

    const PAYMENT_METHOD_TYPES: &'static [&'static str] = &[types::BACS];

    fn create_output_data(&self, input: &BacsInputData) -> BacsOutputData {
        let sort_code: String = input.sort_code.chars().filter(|c| *c != '-').collect();

        BacsOutputData {
            holder_name: FieldState::new(
                input.holder_name.clone(),
                Validation::check(
                    !input.holder_name.trim().is_empty(),
                    reasons::HOLDER_NAME_INVALID,
                ),
            ),
            bank_account_number: FieldState::new(
                input.bank_account_number.clone(),
                Validation::check(
                    digits_of_length(&input.bank_account_number, BANK_ACCOUNT_NUMBER_LENGTH),
                    reasons::BANK_ACCOUNT_NUMBER_INVALID,
                ),
            ),
            sort_code: FieldState::new(
                sort_code.clone(),
                Validation::check(
                    digits_of_length(&sort_code, SORT_CODE_LENGTH),
                    reasons::SORT_CODE_INVALID,
                ),
            ),
            shopper_email: FieldState::new(
                input.shopper_email.trim().to_string(),
                Validation::check(
                    EMAIL_REGEX.is_match(input.shopper_email.trim()),
                    reasons::SHOPPER_EMAIL_INVALID,
                ),
            ),
            is_amount_consent_checked: input.is_amount_consent_checked,
            is_account_consent_checked: input.is_account_consent_checked,
            mode: input.mode,
        }
    }

    fn create_component_state(
        &self,
        output: &BacsOutputData,
        context: &StateContext<'_>,
    ) -> Result<BacsComponentState, EncryptionError> {
        if !output.is_valid() {
            return Ok(BacsComponentState::new(
                context.base_component_data(),
                false,
                context.is_ready,
            ));
        }

        let mut data = context.component_data(BacsDirectDebitPaymentMethod {
            payment_method_type: context.payment_method_type(),
            checkout_attempt_id: context.checkout_attempt_id.clone(),
            holder_name: output.holder_name.value.trim().to_string(),
            bank_account_number: output.bank_account_number.value.clone(),
            bank_location_id: output.sort_code.value.clone(),
        });
        data.shopper_email = Some(output.shopper_email.value.clone());

        Ok(BacsComponentState::new(data, true, context.is_ready))
    }

    fn encryption_failed_state(&self, _context: &StateContext<'_>) -> BacsComponentState {
        BacsComponentState::empty(false, true)
    }

    fn requires_public_key(&self) -> bool {
        false
    }
}

/// BACS direct debit delegate
#[derive(Debug, Clone)]
pub struct BacsDelegate {
    core: DelegateCore<BacsReducer>,
}

impl BacsDelegate {
    /// Create new [`BacsDelegate`]
    pub fn new(
        payment_method: PaymentMethod,
        params: ComponentParams,
        connector: Arc<dyn CheckoutConnector>,
        encrypter: Arc<dyn Encrypter>,
    ) -> Result<Self, Error> {
        Ok(Self {
            core: DelegateCore::new(BacsReducer, payment_method, params, connector, encrypter)?,
        })
    }

    /// Switch the form step
    pub fn set_mode(&self, mode: BacsMode) {
        self.core.update_input_data(|input| input.mode = mode);
    }

    /// Go back from confirmation to input, returns whether the press was handled
    pub fn handle_back_press(&self) -> bool {
        if self.core.output_data().mode == BacsMode::Confirmation {
            self.set_mode(BacsMode::Input);
            true
        } else {
            false
        }
    }
}

impl PaymentComponentDelegate for BacsDelegate {
    type Reducer = BacsReducer;

    fn core(&self) -> &DelegateCore<BacsReducer> {
        &self.core
    }

    /// Valid input in [`BacsMode::Input`] moves the form to confirmation instead of submitting
    fn on_submit(&self) -> SubmitOutcome {
        let output = self.core.output_data();
        if output.mode == BacsMode::Input && output.is_valid() {
            self.set_mode(BacsMode::Confirmation);
            return SubmitOutcome::ConfirmationRequired;
        }

        self.core.on_submit()
    }
}
