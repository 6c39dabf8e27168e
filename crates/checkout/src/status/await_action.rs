//! Await action: wait for the shopper to finish the payment in another app

use std::sync::Arc;

use checkout_common::parking_lot::Mutex;
use checkout_common::{Action, ActionComponentData, Error, StatusResponse};
use futures::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::Span;

use super::StatusRepository;
use crate::observable::{EmissionPolicy, EventChannel, StateHolder};
use crate::payment_data::PaymentDataRepository;
use crate::scope::ComponentScope;

/// Progress of the await action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwaitOutputData {
    /// Payment reached a final result with a payload
    pub is_valid: bool,
    /// Payment method the shopper pays with
    pub payment_method_type: Option<String>,
}

#[derive(Debug)]
struct AwaitInner {
    status_repository: StatusRepository,
    payment_data_repository: PaymentDataRepository,
    output: StateHolder<AwaitOutputData>,
    details: EventChannel<ActionComponentData>,
    exceptions: EventChannel<Error>,
    scope: Mutex<Option<ComponentScope>>,
    polling: Mutex<Option<ComponentScope>>,
    span: Span,
}

/// Polls the payment status of an await action and emits its details once final
#[derive(Debug, Clone)]
pub struct AwaitActionDelegate {
    inner: Arc<AwaitInner>,
}

impl AwaitActionDelegate {
    /// Create new [`AwaitActionDelegate`]
    pub fn new(
        status_repository: StatusRepository,
        payment_data_repository: PaymentDataRepository,
    ) -> Self {
        Self::with_span(
            status_repository,
            payment_data_repository,
            tracing::info_span!("await_action"),
        )
    }

    /// Create new [`AwaitActionDelegate`] recording its events under `span`
    pub fn with_span(
        status_repository: StatusRepository,
        payment_data_repository: PaymentDataRepository,
        span: Span,
    ) -> Self {
        Self {
            inner: Arc::new(AwaitInner {
                status_repository,
                payment_data_repository,
                output: StateHolder::new(
                    AwaitOutputData::default(),
                    EmissionPolicy::DistinctUntilChanged,
                ),
                details: EventChannel::new(),
                exceptions: EventChannel::new(),
                scope: Mutex::new(None),
                polling: Mutex::new(None),
                span,
            }),
        }
    }

    /// Bind to `scope`, polling stops when it is cancelled
    pub fn initialize(&self, scope: &ComponentScope) {
        let previous = self.inner.scope.lock().replace(scope.child());
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    /// Stop polling
    pub fn on_cleared(&self) {
        if let Some(scope) = self.inner.scope.lock().take() {
            scope.cancel();
        }
    }

    /// Latest progress
    pub fn output_data(&self) -> AwaitOutputData {
        self.inner.output.value()
    }

    /// Stream of progress updates
    pub fn output_data_stream(&self) -> WatchStream<AwaitOutputData> {
        self.inner.output.stream()
    }

    /// Details to submit once the payment is final
    pub fn details(&self) -> &EventChannel<ActionComponentData> {
        &self.inner.details
    }

    /// Errors raised while awaiting
    pub fn exceptions(&self) -> &EventChannel<Error> {
        &self.inner.exceptions
    }

    /// Persist the payment data of `action` and start polling its status,
    /// replacing the poller of a previous action
    pub fn handle_action(&self, action: &Action) {
        let Some(scope) = self.inner.scope.lock().clone() else {
            self.report_error(Error::NotInitialized);
            return;
        };

        let Some(payment_data) = action.payment_data.clone() else {
            self.report_error(Error::Custom("Await action has no payment data".to_string()));
            return;
        };

        self.inner.output.publish(AwaitOutputData {
            is_valid: false,
            payment_method_type: action.payment_method_type.clone(),
        });

        let polling = scope.child();
        let previous = self.inner.polling.lock().replace(polling.clone());
        if let Some(previous) = previous {
            tracing::debug!(parent: &self.inner.span, "Replacing running status poller");
            previous.cancel();
        }

        let delegate = self.clone();
        polling.spawn(async move { delegate.await_final_status(payment_data).await });
    }

    async fn await_final_status(&self, payment_data: String) {
        let inner = &self.inner;

        if let Err(err) = inner
            .payment_data_repository
            .set(Some(&payment_data))
            .await
        {
            self.report_error(err);
        }

        let mut statuses = Box::pin(inner.status_repository.poll(payment_data));
        while let Some(result) = statuses.next().await {
            match result {
                Ok(response) if response.is_final_result() => {
                    self.on_final_status(response).await;
                    return;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!(parent: &inner.span, "Ignoring failed status call: {}", err);
                }
            }
        }

        self.report_error(Error::StatusPollingTimeout);
    }

    async fn on_final_status(&self, response: StatusResponse) {
        let inner = &self.inner;
        let payload = response.payload.filter(|payload| !payload.is_empty());

        inner.output.publish(AwaitOutputData {
            is_valid: payload.is_some(),
            ..inner.output.value()
        });

        let Some(payload) = payload else {
            self.report_error(Error::Custom(format!(
                "Payment was not completed, result code: {}",
                response.result_code.unwrap_or_default()
            )));
            return;
        };

        let payment_data = match inner.payment_data_repository.get().await {
            Ok(payment_data) => payment_data,
            Err(err) => {
                tracing::warn!(parent: &inner.span, "Unable to read payment data: {}", err);
                None
            }
        };

        tracing::info!(parent: &inner.span, "Payment finished, emitting details");
        inner.details.send(ActionComponentData {
            payment_data,
            details: serde_json::json!({ "payload": payload }),
        });

        if let Err(err) = inner.payment_data_repository.set(None).await {
            tracing::warn!(parent: &inner.span, "Unable to clear payment data: {}", err);
        }
    }

    fn report_error(&self, err: Error) {
        tracing::error!(parent: &self.inner.span, "Await action failed: {}", err);
        self.inner.exceptions.send(err);
    }
}
