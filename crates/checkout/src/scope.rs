//! Lifetime scope for background work started by components

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Scope owning the background tasks of a component
///
/// Cancelling the scope stops every task spawned in it and in its children. Components receive
/// the scope on `initialize` and never outlive it.
#[derive(Debug, Clone, Default)]
pub struct ComponentScope {
    token: CancellationToken,
}

impl ComponentScope {
    /// Create new [`ComponentScope`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope cancelled together with this one
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Spawn a task that is dropped once the scope is cancelled
    pub fn spawn<F>(&self, future: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                output = future => Some(output),
            }
        })
    }

    /// Cancel every task in the scope
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the scope was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the scope is cancelled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
