//! Observable holders used to publish component output
//!
//! [`StateHolder`] is a single-slot latest-value holder: observers only ever see the most recent
//! value, there is no queue. [`EventChannel`] is an unbounded buffered channel for events that
//! must not be conflated (errors, submissions, UI events).

use std::sync::Arc;

use futures::Stream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio_stream::wrappers::WatchStream;

/// What happens when a value equal to the current one is published
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EmissionPolicy {
    /// Every publish notifies observers, even when nothing changed
    #[default]
    EmitAll,
    /// Publishing a value equal to the current one is a no-op
    DistinctUntilChanged,
}

/// Latest-value holder with push notification
#[derive(Debug)]
pub struct StateHolder<T> {
    sender: watch::Sender<T>,
    policy: EmissionPolicy,
}

impl<T> StateHolder<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create new [`StateHolder`]
    pub fn new(initial: T, policy: EmissionPolicy) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender, policy }
    }

    /// Current value
    pub fn value(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Replace the current value, returns whether observers were notified
    pub fn publish(&self, value: T) -> bool {
        match self.policy {
            EmissionPolicy::EmitAll => {
                self.sender.send_replace(value);
                true
            }
            EmissionPolicy::DistinctUntilChanged => self.sender.send_if_modified(|current| {
                if *current == value {
                    false
                } else {
                    *current = value;
                    true
                }
            }),
        }
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// Stream yielding the current value and then every published one
    pub fn stream(&self) -> WatchStream<T> {
        WatchStream::new(self.sender.subscribe())
    }
}

/// Unbounded buffered event channel
///
/// Events are kept until a consumer takes them. Several consumers compete for events, each
/// event is delivered once.
#[derive(Debug)]
pub struct EventChannel<T> {
    sender: mpsc::UnboundedSender<T>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<T>>>,
}

impl<T> Default for EventChannel<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventChannel<T>
where
    T: Send + 'static,
{
    /// Create new [`EventChannel`]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Queue an event
    pub fn send(&self, event: T) {
        if self.sender.send(event).is_err() {
            tracing::warn!("Event channel closed, dropping event");
        }
    }

    /// Wait for the next event
    pub async fn recv(&self) -> Option<T> {
        self.receiver.lock().await.recv().await
    }

    /// Next event if one is queued and no other consumer is waiting
    pub fn try_recv(&self) -> Option<T> {
        self.receiver.try_lock().ok()?.try_recv().ok()
    }

    /// All queued events
    pub fn drain(&self) -> Vec<T> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Stream of events
    pub fn stream(&self) -> impl Stream<Item = T> + Send + 'static {
        futures::stream::unfold(Arc::clone(&self.receiver), |receiver| async move {
            let event = receiver.lock().await.recv().await;
            event.map(|event| (event, receiver))
        })
    }
}
