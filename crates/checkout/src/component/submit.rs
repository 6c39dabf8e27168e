//! Single-flight submission gate

use checkout_common::parking_lot::Mutex;
use checkout_common::ComponentState;
use tokio_stream::wrappers::WatchStream;

use crate::observable::{EmissionPolicy, EventChannel, StateHolder};

/// UI state of the pay button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PaymentComponentUiState {
    /// Ready for input
    #[default]
    Idle,
    /// A submission is in flight or pending readiness
    Loading,
}

/// One-off UI events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentComponentUiEvent {
    /// Submit was pressed with invalid input, fields should show their errors
    InvalidUi,
}

/// Result of [`SubmitHandler::on_submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitOutcome {
    /// Already loading or interaction blocked, nothing happened
    Ignored,
    /// Input is invalid, [`PaymentComponentUiEvent::InvalidUi`] was sent
    InvalidInput,
    /// State was pushed to the submit channel
    Submitted,
    /// Input is valid but the component is not ready, the next valid state is submitted
    AwaitingReady,
    /// Input is valid, the shopper has to confirm it before anything is submitted
    ConfirmationRequired,
}

#[derive(Debug, Default)]
struct SubmitFlags {
    is_interaction_blocked: bool,
    awaiting_ready: bool,
}

/// Gates submissions of component states
///
/// Concurrent submits while loading are dropped, never queued.
#[derive(Debug)]
pub struct SubmitHandler<S> {
    ui_state: StateHolder<PaymentComponentUiState>,
    ui_events: EventChannel<PaymentComponentUiEvent>,
    submit_channel: EventChannel<S>,
    flags: Mutex<SubmitFlags>,
}

impl<S> Default for SubmitHandler<S>
where
    S: ComponentState + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SubmitHandler<S>
where
    S: ComponentState + Clone + Send + 'static,
{
    /// Create new [`SubmitHandler`]
    pub fn new() -> Self {
        Self {
            ui_state: StateHolder::new(
                PaymentComponentUiState::Idle,
                EmissionPolicy::DistinctUntilChanged,
            ),
            ui_events: EventChannel::new(),
            submit_channel: EventChannel::new(),
            flags: Mutex::new(SubmitFlags::default()),
        }
    }

    /// Submit the current component state
    pub fn on_submit(&self, state: &S) -> SubmitOutcome {
        let mut flags = self.flags.lock();

        if flags.is_interaction_blocked
            || self.ui_state.value() == PaymentComponentUiState::Loading
        {
            tracing::debug!("Submit ignored, interaction blocked or already loading");
            return SubmitOutcome::Ignored;
        }

        if !state.is_input_valid() {
            self.ui_events.send(PaymentComponentUiEvent::InvalidUi);
            self.ui_state.publish(PaymentComponentUiState::Idle);
            return SubmitOutcome::InvalidInput;
        }

        self.ui_state.publish(PaymentComponentUiState::Loading);

        if state.is_ready() {
            self.submit_channel.send(state.clone());
            SubmitOutcome::Submitted
        } else {
            flags.awaiting_ready = true;
            SubmitOutcome::AwaitingReady
        }
    }

    /// Submit a state produced by a follow-up call of an in-flight submission
    ///
    /// Unlike [`SubmitHandler::on_submit`] this does not require the UI to be idle.
    pub fn submit_resolved(&self, state: &S) -> SubmitOutcome {
        let flags = self.flags.lock();

        if flags.is_interaction_blocked {
            return SubmitOutcome::Ignored;
        }

        if !state.is_valid() {
            self.ui_state.publish(PaymentComponentUiState::Idle);
            return SubmitOutcome::InvalidInput;
        }

        self.ui_state.publish(PaymentComponentUiState::Loading);
        self.submit_channel.send(state.clone());
        SubmitOutcome::Submitted
    }

    /// Called with every published component state
    pub fn on_state(&self, state: &S) {
        let mut flags = self.flags.lock();

        if !flags.awaiting_ready {
            return;
        }

        if state.is_valid() {
            flags.awaiting_ready = false;
            self.submit_channel.send(state.clone());
        } else if !state.is_input_valid() {
            flags.awaiting_ready = false;
            self.ui_state.publish(PaymentComponentUiState::Idle);
        }
    }

    /// Block or unblock interaction, unblocking returns the UI to idle
    pub fn set_interaction_blocked(&self, is_interaction_blocked: bool) {
        let mut flags = self.flags.lock();
        flags.is_interaction_blocked = is_interaction_blocked;

        if is_interaction_blocked {
            self.ui_state.publish(PaymentComponentUiState::Loading);
        } else {
            flags.awaiting_ready = false;
            self.ui_state.publish(PaymentComponentUiState::Idle);
        }
    }

    /// Abort a pending or in-flight submission and return the UI to idle
    pub fn reset_ui_state(&self) {
        self.flags.lock().awaiting_ready = false;
        self.ui_state.publish(PaymentComponentUiState::Idle);
    }

    /// Whether interaction is blocked
    pub fn is_interaction_blocked(&self) -> bool {
        self.flags.lock().is_interaction_blocked
    }

    /// Current UI state
    pub fn ui_state(&self) -> PaymentComponentUiState {
        self.ui_state.value()
    }

    /// Stream of UI states
    pub fn ui_state_stream(&self) -> WatchStream<PaymentComponentUiState> {
        self.ui_state.stream()
    }

    /// UI events
    pub fn ui_events(&self) -> &EventChannel<PaymentComponentUiEvent> {
        &self.ui_events
    }

    /// Submitted states
    pub fn submit_channel(&self) -> &EventChannel<S> {
        &self.submit_channel
    }
}

#[cfg(test)]
mod tests {
    use checkout_common::PaymentComponentState;

    use super::*;

    type State = PaymentComponentState<()>;

    #[test]
    fn test_valid_state_is_submitted() {
        let handler = SubmitHandler::<State>::new();

        assert_eq!(
            handler.on_submit(&State::empty(true, true)),
            SubmitOutcome::Submitted
        );
        assert_eq!(handler.ui_state(), PaymentComponentUiState::Loading);
        assert_eq!(handler.submit_channel().drain().len(), 1);
    }

    #[test]
    fn test_submit_while_loading_is_dropped() {
        let handler = SubmitHandler::<State>::new();
        let state = State::empty(true, true);

        assert_eq!(handler.on_submit(&state), SubmitOutcome::Submitted);
        assert_eq!(handler.on_submit(&state), SubmitOutcome::Ignored);
        assert_eq!(handler.submit_channel().drain().len(), 1);
    }

    #[test]
    fn test_invalid_input_reverts_to_idle() {
        let handler = SubmitHandler::<State>::new();

        assert_eq!(
            handler.on_submit(&State::empty(false, true)),
            SubmitOutcome::InvalidInput
        );
        assert_eq!(handler.ui_state(), PaymentComponentUiState::Idle);
        assert_eq!(
            handler.ui_events().try_recv(),
            Some(PaymentComponentUiEvent::InvalidUi)
        );
        assert!(handler.submit_channel().drain().is_empty());
    }

    #[test]
    fn test_blocked_interaction_ignores_submit() {
        let handler = SubmitHandler::<State>::new();
        handler.set_interaction_blocked(true);

        assert_eq!(
            handler.on_submit(&State::empty(true, true)),
            SubmitOutcome::Ignored
        );

        handler.set_interaction_blocked(false);
        assert_eq!(handler.ui_state(), PaymentComponentUiState::Idle);
        assert_eq!(
            handler.on_submit(&State::empty(true, true)),
            SubmitOutcome::Submitted
        );
    }

    #[test]
    fn test_awaiting_ready_submits_next_valid_state() {
        let handler = SubmitHandler::<State>::new();

        assert_eq!(
            handler.on_submit(&State::empty(true, false)),
            SubmitOutcome::AwaitingReady
        );
        assert_eq!(handler.ui_state(), PaymentComponentUiState::Loading);
        assert!(handler.submit_channel().drain().is_empty());

        handler.on_state(&State::empty(true, false));
        assert!(handler.submit_channel().drain().is_empty());

        handler.on_state(&State::empty(true, true));
        assert_eq!(handler.submit_channel().drain().len(), 1);

        handler.on_state(&State::empty(true, true));
        assert!(handler.submit_channel().drain().is_empty());
    }

    #[test]
    fn test_awaiting_ready_reverts_on_invalid_state() {
        let handler = SubmitHandler::<State>::new();
        handler.on_submit(&State::empty(true, false));

        handler.on_state(&State::empty(false, true));

        assert_eq!(handler.ui_state(), PaymentComponentUiState::Idle);
        assert!(handler.submit_channel().drain().is_empty());
    }

    #[test]
    fn test_submit_resolved_while_loading() {
        let handler = SubmitHandler::<State>::new();
        handler.on_submit(&State::empty(true, true));

        assert_eq!(
            handler.submit_resolved(&State::empty(true, true)),
            SubmitOutcome::Submitted
        );
        assert_eq!(handler.submit_channel().drain().len(), 2);
    }
}
