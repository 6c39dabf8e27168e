//! Payment component delegates
//!
//! Every payment method plugs a [`ComponentReducer`] into the shared [`DelegateCore`], which owns
//! the input data and publishes output data and component state on every change:
//!
//! ```text
//! update_input_data -> create_output_data -> create_component_state -> submit handler
//!                                                      ^
//!                                public key, checkout attempt id, order
//! ```

use std::fmt::Debug;

use checkout_common::{
    ComponentState, EncryptionError, Error, OrderRequest, PaymentComponentData, PaymentMethod,
};
use tokio_stream::wrappers::WatchStream;

use crate::encryption::Encrypter;
use crate::observable::EventChannel;
use crate::scope::ComponentScope;

mod delegate_core;
mod params;
mod submit;

pub use self::delegate_core::DelegateCore;
pub use self::params::{ComponentParams, ComponentParamsBuilder};
pub use self::submit::{
    PaymentComponentUiEvent, PaymentComponentUiState, SubmitHandler, SubmitOutcome,
};

/// Everything besides output data a component state is derived from
#[derive(Debug)]
pub struct StateContext<'a> {
    /// Component configuration
    pub params: &'a ComponentParams,
    /// Payment method the component was created for
    pub payment_method: &'a PaymentMethod,
    /// Public key, `None` until fetched
    pub public_key: Option<String>,
    /// Checkout attempt id from the analytics setup
    pub checkout_attempt_id: Option<String>,
    /// Order of a partial payment
    pub order: Option<OrderRequest>,
    /// Every external dependency of the component is available
    pub is_ready: bool,
    /// Encryption collaborator
    pub encrypter: &'a dyn Encrypter,
}

impl StateContext<'_> {
    /// Type of the payment method
    pub fn payment_method_type(&self) -> String {
        self.payment_method.type_or_unknown().to_string()
    }

    /// Request payload without payment method details, used while the input is invalid
    pub fn base_component_data<P>(&self) -> PaymentComponentData<P> {
        PaymentComponentData {
            order: self.order.clone(),
            amount: self.params.amount.clone(),
            ..Default::default()
        }
    }

    /// Request payload around the given payment method details
    pub fn component_data<P>(&self, payment_method: P) -> PaymentComponentData<P> {
        PaymentComponentData {
            payment_method: Some(payment_method),
            ..self.base_component_data()
        }
    }

    /// Public key, or [`EncryptionError::InvalidKey`] when missing
    pub fn require_public_key(&self) -> Result<&str, EncryptionError> {
        self.public_key
            .as_deref()
            .ok_or_else(|| EncryptionError::InvalidKey("public key is missing".to_string()))
    }
}

/// Input, output and state derivation of a payment method
pub trait ComponentReducer: Debug + Send + Sync + 'static {
    /// Mutable shopper input
    type Input: Debug + Default + Send + 'static;
    /// Validated snapshot of the input
    type Output: Debug + Clone + PartialEq + Send + Sync + 'static;
    /// Payment ready state
    type State: ComponentState + Debug + Clone + PartialEq + Send + Sync + 'static;

    /// Payment method types the reducer handles
    const PAYMENT_METHOD_TYPES: &'static [&'static str];

    /// Validate the input
    fn create_output_data(&self, input: &Self::Input) -> Self::Output;

    /// Derive the component state, encrypting sensitive fields when the output is valid
    fn create_component_state(
        &self,
        output: &Self::Output,
        context: &StateContext<'_>,
    ) -> Result<Self::State, EncryptionError>;

    /// State published when encryption fails
    fn encryption_failed_state(&self, context: &StateContext<'_>) -> Self::State;

    /// Whether the component needs a public key to become ready
    fn requires_public_key(&self) -> bool {
        true
    }
}

/// Input type of a delegate
pub type InputOf<D> = <<D as PaymentComponentDelegate>::Reducer as ComponentReducer>::Input;
/// Output type of a delegate
pub type OutputOf<D> = <<D as PaymentComponentDelegate>::Reducer as ComponentReducer>::Output;
/// State type of a delegate
pub type StateOf<D> = <<D as PaymentComponentDelegate>::Reducer as ComponentReducer>::State;

/// Public contract of every payment component delegate
pub trait PaymentComponentDelegate {
    /// Reducer of the payment method
    type Reducer: ComponentReducer;

    /// Shared delegate machinery
    fn core(&self) -> &DelegateCore<Self::Reducer>;

    /// Mutate the input and publish the derived output data and component state
    fn update_input_data<F>(&self, update: F)
    where
        F: FnOnce(&mut InputOf<Self>),
    {
        self.core().update_input_data(update)
    }

    /// Latest output data
    fn output_data(&self) -> OutputOf<Self> {
        self.core().output_data()
    }

    /// Stream of output data
    fn output_data_stream(&self) -> WatchStream<OutputOf<Self>> {
        self.core().output_data_stream()
    }

    /// Latest component state
    fn component_state(&self) -> StateOf<Self> {
        self.core().component_state()
    }

    /// Stream of component states
    fn component_state_stream(&self) -> WatchStream<StateOf<Self>> {
        self.core().component_state_stream()
    }

    /// Errors raised by the component
    fn exceptions(&self) -> &EventChannel<Error> {
        self.core().exceptions()
    }

    /// Submitted component states
    fn submit_channel(&self) -> &EventChannel<StateOf<Self>> {
        self.core().submit_handler().submit_channel()
    }

    /// Current UI state
    fn ui_state(&self) -> PaymentComponentUiState {
        self.core().submit_handler().ui_state()
    }

    /// Stream of UI states
    fn ui_state_stream(&self) -> WatchStream<PaymentComponentUiState> {
        self.core().submit_handler().ui_state_stream()
    }

    /// One-off UI events
    fn ui_events(&self) -> &EventChannel<PaymentComponentUiEvent> {
        self.core().submit_handler().ui_events()
    }

    /// Bind the component to a scope and start its background work
    fn initialize(&self, scope: &ComponentScope) {
        self.core().initialize(scope)
    }

    /// Cancel the background work of the component
    fn on_cleared(&self) {
        self.core().on_cleared()
    }

    /// Submit the current component state
    fn on_submit(&self) -> SubmitOutcome {
        self.core().on_submit()
    }

    /// Block or unblock interaction while the host runs a network call
    fn set_interaction_blocked(&self, is_interaction_blocked: bool) {
        self.core()
            .submit_handler()
            .set_interaction_blocked(is_interaction_blocked)
    }

    /// Whether the shopper has to confirm the payment with a pay button
    fn is_confirmation_required(&self) -> bool {
        true
    }

    /// Whether the component renders its own pay button
    fn should_show_submit_button(&self) -> bool {
        self.is_confirmation_required() && self.core().params().is_submit_button_visible
    }

    /// Type of the payment method
    fn payment_method_type(&self) -> &str {
        self.core().payment_method().type_or_unknown()
    }
}
