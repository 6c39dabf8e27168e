//! Gift card component
//!
//! Paying with a gift card takes several round trips driven by the host:
//!
//! 1. a valid state carries [`GiftCardAction::CheckBalance`], the host checks the balance;
//! 2. [`GiftCardDelegate::resolve_balance_result`] classifies the balance, a partial payment
//!    without order asks the host to create one ([`GiftCardAction::CreateOrder`]);
//! 3. [`GiftCardDelegate::resolve_order_response`] attaches the order and the state moves to
//!    [`GiftCardAction::SendPayment`].
//!
//! Resolved states are submitted right away.

use std::sync::Arc;

use checkout_common::payment_method::{types, GiftCardPaymentMethod};
use checkout_common::{
    BalanceResult, ComponentState, EncryptionError, Error, FieldState, GiftCardAction,
    GiftCardBalanceStatus, GiftCardError, OrderRequest, OrderResponse, PaymentComponentData,
    PaymentMethod, Validation,
};

use crate::component::{
    ComponentParams, ComponentReducer, DelegateCore, PaymentComponentDelegate, StateContext,
    SubmitOutcome,
};
use crate::connector::CheckoutConnector;
use crate::encryption::{fields, Encrypter};

mod balance;

pub use self::balance::{check_balance, check_balance_result};

/// Reason codes of invalid gift card fields
pub mod reasons {
    /// Number is not 15 to 32 digits
    pub const NUMBER_INVALID: &str = "giftcard_number_invalid";
    /// PIN is not 3 to 10 digits
    pub const PIN_INVALID: &str = "giftcard_pin_invalid";
}

const NUMBER_LENGTH: std::ops::RangeInclusive<usize> = 15..=32;
const PIN_LENGTH: std::ops::RangeInclusive<usize> = 3..=10;
const LAST_DIGITS: usize = 4;

/// Shopper input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GiftCardInputData {
    /// Card number, spaces allowed
    pub card_number: String,
    /// PIN
    pub pin: String,
}

/// Validated input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftCardOutputData {
    /// Card number without spaces
    pub number: FieldState<String>,
    /// PIN
    pub pin: FieldState<String>,
}

impl GiftCardOutputData {
    /// Both fields are valid
    pub fn is_valid(&self) -> bool {
        self.number.is_valid() && self.pin.is_valid()
    }
}

/// State of the gift card component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftCardComponentState {
    /// Payment request payload
    pub data: PaymentComponentData<GiftCardPaymentMethod>,
    /// Input passed validation and encryption
    pub is_input_valid: bool,
    /// Public key is available
    pub is_ready: bool,
    /// Last four digits of the card number, shown by the host while checking the balance
    pub last_four_digits: Option<String>,
    /// What the host has to do with the state
    pub gift_card_action: GiftCardAction,
}

impl ComponentState for GiftCardComponentState {
    fn is_input_valid(&self) -> bool {
        self.is_input_valid
    }

    fn is_ready(&self) -> bool {
        self.is_ready
    }
}

fn digits_in(value: &str, range: std::ops::RangeInclusive<usize>) -> bool {
    range.contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

/// Gift card reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct GiftCardReducer;

impl GiftCardReducer {
    /// Derive the state for the given action, [`GiftCardAction::CheckBalance`] when `None`
    ///
    /// Incomplete input or a missing public key always yields [`GiftCardAction::Idle`].
    pub fn create_state(
        &self,
        output: &GiftCardOutputData,
        context: &StateContext<'_>,
        action: Option<GiftCardAction>,
    ) -> Result<GiftCardComponentState, EncryptionError> {
        if !output.is_valid() || !context.is_ready {
            return Ok(GiftCardComponentState {
                data: context.base_component_data(),
                is_input_valid: output.is_valid(),
                is_ready: context.is_ready,
                last_four_digits: None,
                gift_card_action: GiftCardAction::Idle,
            });
        }

        let public_key = context.require_public_key()?;
        let number = &output.number.value;
        let encrypted_card_number =
            context
                .encrypter
                .encrypt_field(fields::NUMBER, number, public_key)?;
        let encrypted_security_code =
            context
                .encrypter
                .encrypt_field(fields::CVC, &output.pin.value, public_key)?;

        let data = context.component_data(GiftCardPaymentMethod {
            payment_method_type: context.payment_method_type(),
            checkout_attempt_id: context.checkout_attempt_id.clone(),
            encrypted_card_number,
            encrypted_security_code,
            brand: context.payment_method.brand.clone(),
        });

        Ok(GiftCardComponentState {
            data,
            is_input_valid: true,
            is_ready: true,
            last_four_digits: Some(number[number.len() - LAST_DIGITS..].to_string()),
            gift_card_action: action.unwrap_or(GiftCardAction::CheckBalance),
        })
    }
}

impl ComponentReducer for GiftCardReducer {
    type Input = GiftCardInputData;
    type Output = GiftCardOutputData;
    type State = GiftCardComponentState;

    const PAYMENT_METHOD_TYPES: &'static [&'static str] = &[types::GIFTCARD];

    fn create_output_data(&self, input: &GiftCardInputData) -> GiftCardOutputData {
        let number: String = input
            .card_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let pin = input.pin.trim().to_string();

        GiftCardOutputData {
            number: FieldState::new(
                number.clone(),
                Validation::check(digits_in(&number, NUMBER_LENGTH), reasons::NUMBER_INVALID),
            ),
            pin: FieldState::new(
                pin.clone(),
                Validation::check(digits_in(&pin, PIN_LENGTH), reasons::PIN_INVALID),
            ),
        }
    }

    fn create_component_state(
        &self,
        output: &GiftCardOutputData,
        context: &StateContext<'_>,
    ) -> Result<GiftCardComponentState, EncryptionError> {
        self.create_state(output, context, None)
    }

    fn encryption_failed_state(&self, context: &StateContext<'_>) -> GiftCardComponentState {
        GiftCardComponentState {
            data: context.base_component_data(),
            is_input_valid: false,
            is_ready: true,
            last_four_digits: None,
            gift_card_action: GiftCardAction::Idle,
        }
    }
}

/// Gift card delegate
#[derive(Debug, Clone)]
pub struct GiftCardDelegate {
    core: DelegateCore<GiftCardReducer>,
}

impl GiftCardDelegate {
    /// Create new [`GiftCardDelegate`]
    pub fn new(
        payment_method: PaymentMethod,
        params: ComponentParams,
        connector: Arc<dyn CheckoutConnector>,
        encrypter: Arc<dyn Encrypter>,
    ) -> Result<Self, Error> {
        Ok(Self {
            core: DelegateCore::new(
                GiftCardReducer,
                payment_method,
                params,
                connector,
                encrypter,
            )?,
        })
    }

    /// Continue an existing order, e.g. when a previous gift card paid part of it
    pub fn with_order(self, order: OrderRequest) -> Self {
        self.core.set_order(Some(order));
        self.core.refresh();
        self
    }

    /// Classify a balance check response and resolve it
    pub fn resolve_balance_result(&self, result: &BalanceResult) -> Option<GiftCardAction> {
        let status = check_balance_result(result, self.core.params().amount.as_ref());
        self.resolve_balance_status(status)
    }

    /// Move the state to the next action, or report why the gift card cannot be used
    ///
    /// Returns the resolved action, `None` when an error was reported.
    pub fn resolve_balance_status(&self, status: GiftCardBalanceStatus) -> Option<GiftCardAction> {
        tracing::debug!(parent: self.core.span(), "Gift card balance status: {:?}", status);

        let action = match status {
            GiftCardBalanceStatus::FullPayment { .. } => GiftCardAction::SendPayment,
            GiftCardBalanceStatus::PartialPayment { .. } => {
                if self.core.order().is_some() {
                    GiftCardAction::SendPayment
                } else {
                    GiftCardAction::CreateOrder
                }
            }
            GiftCardBalanceStatus::NonMatchingCurrencies => {
                return self.reject(GiftCardError::NonMatchingCurrencies)
            }
            GiftCardBalanceStatus::ZeroAmountToBePaid => {
                return self.reject(GiftCardError::ZeroAmountToBePaid)
            }
            GiftCardBalanceStatus::ZeroBalance => return self.reject(GiftCardError::ZeroBalance),
        };

        self.publish_and_submit(action);
        Some(action)
    }

    /// Attach the order created by the host and send the payment
    pub fn resolve_order_response(&self, order: &OrderResponse) -> SubmitOutcome {
        self.core.set_order(Some(OrderRequest::from(order)));
        self.publish_and_submit(GiftCardAction::SendPayment)
    }

    fn publish_and_submit(&self, action: GiftCardAction) -> SubmitOutcome {
        let state = self
            .core
            .publish_state_with(|reducer, output, context| {
                reducer.create_state(output, context, Some(action))
            });
        self.core.submit_handler().submit_resolved(&state)
    }

    fn reject(&self, err: GiftCardError) -> Option<GiftCardAction> {
        self.core.publish_state_with(|reducer, output, context| {
            reducer
                .create_state(output, context, None)
                .map(|state| GiftCardComponentState {
                    gift_card_action: GiftCardAction::Idle,
                    ..state
                })
        });
        self.core.submit_handler().reset_ui_state();
        self.core.report_error(Error::GiftCard(err));
        None
    }
}

impl PaymentComponentDelegate for GiftCardDelegate {
    type Reducer = GiftCardReducer;

    fn core(&self) -> &DelegateCore<GiftCardReducer> {
        &self.core
    }
}
