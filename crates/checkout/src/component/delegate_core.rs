//! Shared delegate machinery

use std::sync::Arc;

use checkout_common::analytics::AnalyticsSetupRequest;
use checkout_common::parking_lot::{Mutex, RwLock};
use checkout_common::{EncryptionError, Error, OrderRequest, PaymentMethod};
use tokio_stream::wrappers::WatchStream;
use tracing::Span;

use super::{ComponentParams, ComponentReducer, StateContext, SubmitHandler, SubmitOutcome};
use crate::connector::CheckoutConnector;
use crate::encryption::Encrypter;
use crate::observable::{EventChannel, StateHolder};
use crate::scope::ComponentScope;

const ANALYTICS_CHANNEL: &str = "rust";
const ANALYTICS_FLAVOR: &str = "components";

#[derive(Debug)]
struct CoreInner<R: ComponentReducer> {
    reducer: R,
    params: ComponentParams,
    payment_method: PaymentMethod,
    connector: Arc<dyn CheckoutConnector>,
    encrypter: Arc<dyn Encrypter>,
    input: Mutex<R::Input>,
    output: StateHolder<R::Output>,
    state: StateHolder<R::State>,
    exceptions: EventChannel<Error>,
    submit_handler: SubmitHandler<R::State>,
    public_key: RwLock<Option<String>>,
    checkout_attempt_id: RwLock<Option<String>>,
    order: RwLock<Option<OrderRequest>>,
    scope: Mutex<Option<ComponentScope>>,
    span: Span,
}

/// Owns the input of a component and derives its output data and state
///
/// Cloning is cheap, clones share the same component.
#[derive(Debug)]
pub struct DelegateCore<R: ComponentReducer> {
    inner: Arc<CoreInner<R>>,
}

impl<R: ComponentReducer> Clone for DelegateCore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: ComponentReducer> DelegateCore<R> {
    /// Create new [`DelegateCore`]
    ///
    /// Fails with [`Error::UnsupportedPaymentMethod`] when the reducer does not handle the type
    /// of `payment_method`.
    pub fn new(
        reducer: R,
        payment_method: PaymentMethod,
        params: ComponentParams,
        connector: Arc<dyn CheckoutConnector>,
        encrypter: Arc<dyn Encrypter>,
    ) -> Result<Self, Error> {
        let payment_method_type = payment_method.type_or_unknown().to_string();
        if !R::PAYMENT_METHOD_TYPES.contains(&payment_method_type.as_str()) {
            return Err(Error::UnsupportedPaymentMethod(payment_method_type));
        }

        let span = params.span.clone().unwrap_or_else(|| {
            tracing::info_span!("checkout_component", payment_method = %payment_method_type)
        });

        let input = R::Input::default();
        let output = reducer.create_output_data(&input);

        let context = StateContext {
            params: &params,
            payment_method: &payment_method,
            public_key: None,
            checkout_attempt_id: None,
            order: None,
            is_ready: !reducer.requires_public_key(),
            encrypter: encrypter.as_ref(),
        };
        let state = reducer
            .create_component_state(&output, &context)
            .unwrap_or_else(|_| reducer.encryption_failed_state(&context));

        let emission_policy = params.emission_policy;

        Ok(Self {
            inner: Arc::new(CoreInner {
                output: StateHolder::new(output, emission_policy),
                state: StateHolder::new(state, emission_policy),
                reducer,
                params,
                payment_method,
                connector,
                encrypter,
                input: Mutex::new(input),
                exceptions: EventChannel::new(),
                submit_handler: SubmitHandler::new(),
                public_key: RwLock::new(None),
                checkout_attempt_id: RwLock::new(None),
                order: RwLock::new(None),
                scope: Mutex::new(None),
                span,
            }),
        })
    }

    /// Reducer of the payment method
    pub fn reducer(&self) -> &R {
        &self.inner.reducer
    }

    /// Component configuration
    pub fn params(&self) -> &ComponentParams {
        &self.inner.params
    }

    /// Payment method the component was created for
    pub fn payment_method(&self) -> &PaymentMethod {
        &self.inner.payment_method
    }

    /// Connector used for background calls
    pub fn connector(&self) -> &Arc<dyn CheckoutConnector> {
        &self.inner.connector
    }

    /// Encryption collaborator
    pub fn encrypter(&self) -> &Arc<dyn Encrypter> {
        &self.inner.encrypter
    }

    /// Span component events are recorded under
    pub fn span(&self) -> &Span {
        &self.inner.span
    }

    /// Public key once fetched
    pub fn public_key(&self) -> Option<String> {
        self.inner.public_key.read().clone()
    }

    /// Checkout attempt id once the analytics setup succeeded
    pub fn checkout_attempt_id(&self) -> Option<String> {
        self.inner.checkout_attempt_id.read().clone()
    }

    /// Order of a partial payment
    pub fn order(&self) -> Option<OrderRequest> {
        self.inner.order.read().clone()
    }

    /// Attach an order, it is part of every state published afterwards
    pub fn set_order(&self, order: Option<OrderRequest>) {
        *self.inner.order.write() = order;
    }

    /// Apply `update` to the input and publish the derived output and state
    ///
    /// The input stays locked until both are published, concurrent updates are applied and
    /// published one after the other.
    pub fn update_input_data<F>(&self, update: F)
    where
        F: FnOnce(&mut R::Input),
    {
        let mut input = self.inner.input.lock();
        update(&mut input);
        self.publish(&input);
    }

    /// Recompute output and state from the current input
    pub fn refresh(&self) {
        let input = self.inner.input.lock();
        self.publish(&input);
    }

    fn publish(&self, input: &R::Input) {
        let output = self.inner.reducer.create_output_data(input);
        self.inner.output.publish(output.clone());

        let state = self.create_component_state(&output);
        self.publish_state(state);
    }

    /// Publish a state derived by `create` from the current output
    ///
    /// Used by components whose state also depends on results of follow-up calls.
    pub fn publish_state_with<F>(&self, create: F) -> R::State
    where
        F: FnOnce(&R, &R::Output, &StateContext<'_>) -> Result<R::State, EncryptionError>,
    {
        let _input = self.inner.input.lock();
        let output = self.inner.output.value();
        let context = self.state_context();

        let state = match create(&self.inner.reducer, &output, &context) {
            Ok(state) => state,
            Err(err) => self.on_encryption_failed(err, &context),
        };

        self.publish_state(state.clone());
        state
    }

    fn create_component_state(&self, output: &R::Output) -> R::State {
        let context = self.state_context();
        match self.inner.reducer.create_component_state(output, &context) {
            Ok(state) => state,
            Err(err) => self.on_encryption_failed(err, &context),
        }
    }

    fn on_encryption_failed(
        &self,
        err: EncryptionError,
        context: &StateContext<'_>,
    ) -> R::State {
        tracing::error!(parent: &self.inner.span, "Encryption failed: {}", err);
        self.inner.exceptions.send(Error::Encryption(err));
        self.inner.reducer.encryption_failed_state(context)
    }

    fn publish_state(&self, state: R::State) {
        self.inner.submit_handler.on_state(&state);
        self.inner.state.publish(state);
    }

    fn state_context(&self) -> StateContext<'_> {
        let public_key = self.public_key();
        let is_ready = !self.inner.reducer.requires_public_key() || public_key.is_some();

        StateContext {
            params: &self.inner.params,
            payment_method: &self.inner.payment_method,
            public_key,
            checkout_attempt_id: self.checkout_attempt_id(),
            order: self.order(),
            is_ready,
            encrypter: self.inner.encrypter.as_ref(),
        }
    }

    /// Latest output data
    pub fn output_data(&self) -> R::Output {
        self.inner.output.value()
    }

    /// Stream of output data
    pub fn output_data_stream(&self) -> WatchStream<R::Output> {
        self.inner.output.stream()
    }

    /// Latest component state
    pub fn component_state(&self) -> R::State {
        self.inner.state.value()
    }

    /// Stream of component states
    pub fn component_state_stream(&self) -> WatchStream<R::State> {
        self.inner.state.stream()
    }

    /// Errors raised by the component
    pub fn exceptions(&self) -> &EventChannel<Error> {
        &self.inner.exceptions
    }

    /// Submission gate
    pub fn submit_handler(&self) -> &SubmitHandler<R::State> {
        &self.inner.submit_handler
    }

    /// Submit the current component state
    pub fn on_submit(&self) -> SubmitOutcome {
        let state = self.component_state();
        self.inner.submit_handler.on_submit(&state)
    }

    /// Scope of the background work, `None` before `initialize`
    pub fn scope(&self) -> Option<ComponentScope> {
        self.inner.scope.lock().clone()
    }

    /// Bind to `scope`, fetch the public key and register the checkout attempt
    ///
    /// Initializing again cancels the work started in the previous scope.
    pub fn initialize(&self, scope: &ComponentScope) {
        let scope = scope.child();
        let previous = self.inner.scope.lock().replace(scope.clone());
        if let Some(previous) = previous {
            tracing::debug!(parent: &self.inner.span, "Replacing component scope");
            previous.cancel();
        }

        self.setup_analytics(&scope);

        if self.inner.reducer.requires_public_key() {
            self.fetch_public_key(&scope);
        }
    }

    /// Cancel every background task of the component
    pub fn on_cleared(&self) {
        if let Some(scope) = self.inner.scope.lock().take() {
            scope.cancel();
        }
    }

    fn fetch_public_key(&self, scope: &ComponentScope) {
        let core = self.clone();
        scope.spawn(async move {
            let span = core.inner.span.clone();
            tracing::debug!(parent: &span, "Fetching public key");

            match core
                .inner
                .connector
                .get_public_key(&core.inner.params.client_key)
                .await
            {
                Ok(response) => {
                    *core.inner.public_key.write() = Some(response.public_key);
                    core.refresh();
                }
                Err(err) => {
                    tracing::error!(parent: &span, "Unable to fetch public key: {}", err);
                    core.inner
                        .exceptions
                        .send(Error::PublicKeyFetch(Box::new(err)));
                }
            }
        });
    }

    fn setup_analytics(&self, scope: &ComponentScope) {
        let core = self.clone();
        scope.spawn(async move {
            let span = core.inner.span.clone();
            let request = AnalyticsSetupRequest {
                version: env!("CARGO_PKG_VERSION").to_string(),
                channel: ANALYTICS_CHANNEL.to_string(),
                platform: std::env::consts::OS.to_string(),
                locale: core.inner.params.shopper_locale.clone(),
                component: core.inner.payment_method.type_or_unknown().to_string(),
                flavor: ANALYTICS_FLAVOR.to_string(),
                amount: core.inner.params.amount.clone(),
                session_id: None,
            };

            match core
                .inner
                .connector
                .post_analytics_setup(&core.inner.params.client_key, request)
                .await
            {
                Ok(response) => {
                    if let Some(checkout_attempt_id) = response.checkout_attempt_id {
                        *core.inner.checkout_attempt_id.write() = Some(checkout_attempt_id);
                        core.refresh();
                    }
                }
                Err(err) => {
                    tracing::warn!(parent: &span, "Analytics setup failed: {}", err);
                }
            }
        });
    }

    /// Report an error on the exception channel
    pub fn report_error(&self, err: Error) {
        tracing::warn!(parent: &self.inner.span, "Component error: {}", err);
        self.inner.exceptions.send(err);
    }
}
