//! Session calls with merchant take-over
//!
//! Every call first offers the merchant to handle it. Once the merchant handled one call the
//! flow is taken over: the merchant backend talks to the payments API from then on, and a later
//! call the merchant does not handle is an error instead of a silent fallback to the session.

use std::sync::atomic::{AtomicBool, Ordering};

use checkout_common::parking_lot::RwLock;
use checkout_common::session::SessionPaymentsResponse;
use checkout_common::{
    Action, ActionComponentData, BalanceResult, Error, OrderRequest, OrderResponse,
    PaymentComponentData, SessionModel, SessionPaymentResult,
};
use serde::Serialize;
use tracing::Span;

use super::repository::SessionRepository;
use super::saved_state::SavedSessionState;

const REFUSED_RESULT_CODE: &str = "Refused";

/// Outcome of a payments or details call
#[derive(Debug)]
pub enum SessionCallResult {
    /// Merchant handled the call
    TakenOver,
    /// Shopper has to complete an action
    Action(Action),
    /// Payment succeeded but the order still has an open amount
    NotFullyPaidOrder(SessionPaymentResult),
    /// Payment was refused while paying an order in parts
    RefusedPartialPayment(SessionPaymentResult),
    /// Payment flow finished
    Finished(SessionPaymentResult),
    /// Call failed
    Error(Error),
}

/// Outcome of a balance call
#[derive(Debug)]
pub enum BalanceCallResult {
    /// Merchant handled the call
    TakenOver,
    /// Balance of the payment method
    Successful(BalanceResult),
    /// Call failed
    Error(Error),
}

/// Outcome of an order call
#[derive(Debug)]
pub enum OrderCallResult {
    /// Merchant handled the call
    TakenOver,
    /// Order created
    Successful(OrderResponse),
    /// Call failed
    Error(Error),
}

/// Outcome of a cancel order call
#[derive(Debug)]
pub enum CancelOrderCallResult {
    /// Merchant handled the call
    TakenOver,
    /// Order cancelled
    Successful,
    /// Call failed
    Error(Error),
}

/// Mediates between components and the sessions API
#[derive(Debug)]
pub struct SessionInteractor {
    repository: SessionRepository,
    session_model: RwLock<SessionModel>,
    is_flow_taken_over: AtomicBool,
    span: Span,
}

fn payment_result(response: &SessionPaymentsResponse) -> SessionPaymentResult {
    SessionPaymentResult {
        session_result: response.session_result.clone(),
        session_data: Some(response.session_data.clone()),
        result_code: response.result_code.clone(),
        order: response.order.clone(),
    }
}

fn classify(response: SessionPaymentsResponse) -> SessionCallResult {
    let result = payment_result(&response);

    let is_refused_partial_payment =
        response.result_code.as_deref() == Some(REFUSED_RESULT_CODE) && response.order.is_some();
    let is_order_not_fully_paid = response
        .order
        .as_ref()
        .and_then(|order| order.remaining_amount.as_ref())
        .is_some_and(|remaining| remaining.value > 0);

    if is_refused_partial_payment {
        SessionCallResult::RefusedPartialPayment(result)
    } else if let Some(action) = response.action {
        SessionCallResult::Action(action)
    } else if is_order_not_fully_paid {
        SessionCallResult::NotFullyPaidOrder(result)
    } else {
        SessionCallResult::Finished(result)
    }
}

impl SessionInteractor {
    /// Create new [`SessionInteractor`]
    pub fn new(
        repository: SessionRepository,
        session_model: SessionModel,
        is_flow_taken_over: bool,
    ) -> Self {
        Self {
            repository,
            session_model: RwLock::new(session_model),
            is_flow_taken_over: AtomicBool::new(is_flow_taken_over),
            span: tracing::info_span!("session_interactor"),
        }
    }

    /// Restore an interactor from a saved state
    pub fn restore(repository: SessionRepository, state: SavedSessionState) -> Self {
        Self::new(repository, state.session_model, state.is_flow_taken_over)
    }

    /// Record session events under `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Current session model, with the latest session data
    pub fn session_model(&self) -> SessionModel {
        self.session_model.read().clone()
    }

    /// Whether the merchant took over the flow
    pub fn is_flow_taken_over(&self) -> bool {
        self.is_flow_taken_over.load(Ordering::SeqCst)
    }

    /// Snapshot to persist across process death
    pub fn saved_state(&self) -> SavedSessionState {
        SavedSessionState {
            session_model: self.session_model(),
            is_flow_taken_over: self.is_flow_taken_over(),
        }
    }

    fn update_session_data(&self, session_data: &str) {
        self.session_model.write().session_data = Some(session_data.to_string());
    }

    /// Offer the call to the merchant, `Ok(true)` when they handled it
    fn check_if_call_was_handled<F>(&self, merchant_call: F, call_name: &str) -> Result<bool, Error>
    where
        F: FnOnce() -> bool,
    {
        if merchant_call() {
            if !self.is_flow_taken_over.swap(true, Ordering::SeqCst) {
                tracing::info!(parent: &self.span, "Flow taken over by {}", call_name);
            }
            return Ok(true);
        }

        if self.is_flow_taken_over() {
            return Err(Error::FlowAlreadyTakenOver(call_name.to_string()));
        }

        Ok(false)
    }

    /// Make a payments call unless the merchant handles it
    ///
    /// Fails with [`Error::FlowAlreadyTakenOver`] when the flow was taken over before and the
    /// merchant did not handle this call.
    pub async fn on_payments_call_requested<P, F>(
        &self,
        data: &PaymentComponentData<P>,
        merchant_call: F,
        call_name: &str,
    ) -> Result<SessionCallResult, Error>
    where
        P: Serialize + Sync,
        F: FnOnce() -> bool,
    {
        if self.check_if_call_was_handled(merchant_call, call_name)? {
            return Ok(SessionCallResult::TakenOver);
        }

        tracing::debug!(parent: &self.span, "Making payments call");
        let model = self.session_model();
        Ok(match self.repository.submit_payment(&model, data).await {
            Ok(response) => {
                self.update_session_data(&response.session_data);
                classify(response)
            }
            Err(err) => {
                tracing::error!(parent: &self.span, "Payments call failed: {}", err);
                SessionCallResult::Error(err)
            }
        })
    }

    /// Make a details call unless the merchant handles it
    pub async fn on_details_call_requested<F>(
        &self,
        data: &ActionComponentData,
        merchant_call: F,
        call_name: &str,
    ) -> Result<SessionCallResult, Error>
    where
        F: FnOnce() -> bool,
    {
        if self.check_if_call_was_handled(merchant_call, call_name)? {
            return Ok(SessionCallResult::TakenOver);
        }

        tracing::debug!(parent: &self.span, "Making details call");
        let model = self.session_model();
        Ok(match self.repository.submit_details(&model, data).await {
            Ok(response) => {
                self.update_session_data(&response.session_data);
                classify(response)
            }
            Err(err) => {
                tracing::error!(parent: &self.span, "Details call failed: {}", err);
                SessionCallResult::Error(err)
            }
        })
    }

    /// Make a balance call unless the merchant handles it
    pub async fn on_balance_call_requested<P, F>(
        &self,
        data: &PaymentComponentData<P>,
        merchant_call: F,
        call_name: &str,
    ) -> Result<BalanceCallResult, Error>
    where
        P: Serialize + Sync,
        F: FnOnce() -> bool,
    {
        if self.check_if_call_was_handled(merchant_call, call_name)? {
            return Ok(BalanceCallResult::TakenOver);
        }

        let model = self.session_model();
        Ok(match self.repository.check_balance(&model, data).await {
            Ok(response) => {
                self.update_session_data(&response.session_data);
                BalanceCallResult::Successful(BalanceResult::from(&response))
            }
            Err(err) => {
                tracing::error!(parent: &self.span, "Balance call failed: {}", err);
                BalanceCallResult::Error(err)
            }
        })
    }

    /// Create an order unless the merchant handles it
    pub async fn on_order_call_requested<F>(
        &self,
        merchant_call: F,
        call_name: &str,
    ) -> Result<OrderCallResult, Error>
    where
        F: FnOnce() -> bool,
    {
        if self.check_if_call_was_handled(merchant_call, call_name)? {
            return Ok(OrderCallResult::TakenOver);
        }

        let model = self.session_model();
        Ok(match self.repository.create_order(&model).await {
            Ok(response) => {
                self.update_session_data(&response.session_data);
                OrderCallResult::Successful(OrderResponse::from(&response))
            }
            Err(err) => {
                tracing::error!(parent: &self.span, "Order call failed: {}", err);
                OrderCallResult::Error(err)
            }
        })
    }

    /// Cancel an order unless the merchant handles it
    pub async fn on_cancel_order_call_requested<F>(
        &self,
        order: &OrderRequest,
        merchant_call: F,
        call_name: &str,
    ) -> Result<CancelOrderCallResult, Error>
    where
        F: FnOnce() -> bool,
    {
        if self.check_if_call_was_handled(merchant_call, call_name)? {
            return Ok(CancelOrderCallResult::TakenOver);
        }

        let model = self.session_model();
        Ok(match self.repository.cancel_order(&model, order).await {
            Ok(response) => {
                self.update_session_data(&response.session_data);
                CancelOrderCallResult::Successful
            }
            Err(err) => {
                tracing::error!(parent: &self.span, "Cancel order call failed: {}", err);
                CancelOrderCallResult::Error(err)
            }
        })
    }
}
