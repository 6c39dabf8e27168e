//! Payment status polling

use std::sync::Arc;
use std::time::Duration;

use checkout_common::{Error, StatusRequest, StatusResponse};
use futures::Stream;
use tokio::time::Instant;
use tracing::Span;

use crate::connector::CheckoutConnector;

mod await_action;

pub use self::await_action::{AwaitActionDelegate, AwaitOutputData};

/// Delays between status calls
///
/// Polling is fast during the first minute and slow afterwards, it stops after 15 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    /// Delay while the elapsed time is within `fast_threshold`
    pub fast_delay: Duration,
    /// Delay once `fast_threshold` passed
    pub slow_delay: Duration,
    /// Elapsed time polling stays fast
    pub fast_threshold: Duration,
    /// Elapsed time after which polling stops
    pub max_duration: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            fast_delay: Duration::from_secs(2),
            slow_delay: Duration::from_secs(10),
            fast_threshold: Duration::from_secs(60),
            max_duration: Duration::from_secs(15 * 60),
        }
    }
}

impl PollingPolicy {
    /// Delay before the next call, `None` when polling has to stop
    pub fn next_delay(&self, elapsed: Duration) -> Option<Duration> {
        if elapsed <= self.fast_threshold {
            Some(self.fast_delay)
        } else if elapsed <= self.max_duration {
            Some(self.slow_delay)
        } else {
            None
        }
    }
}

/// Polls the status endpoint
#[derive(Debug, Clone)]
pub struct StatusRepository {
    connector: Arc<dyn CheckoutConnector>,
    client_key: String,
    policy: PollingPolicy,
    span: Span,
}

#[derive(Debug)]
struct Poller {
    connector: Arc<dyn CheckoutConnector>,
    client_key: String,
    payment_data: String,
    policy: PollingPolicy,
    span: Span,
    started: Option<Instant>,
    delay: Duration,
    is_done: bool,
}

impl StatusRepository {
    /// Create new [`StatusRepository`] with the default [`PollingPolicy`]
    pub fn new(connector: Arc<dyn CheckoutConnector>, client_key: impl Into<String>) -> Self {
        Self {
            connector,
            client_key: client_key.into(),
            policy: PollingPolicy::default(),
            span: tracing::info_span!("status_repository"),
        }
    }

    /// Use `policy` for the delays
    pub fn with_policy(mut self, policy: PollingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Record polling events under `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Polling policy
    pub fn policy(&self) -> &PollingPolicy {
        &self.policy
    }

    /// Poll the status of `payment_data`
    ///
    /// The first call is made as soon as the stream is polled. Every result is emitted, failed
    /// calls do not stop polling. The stream ends after a final result or once the policy gives
    /// up. Dropping the stream stops polling.
    pub fn poll(
        &self,
        payment_data: impl Into<String>,
    ) -> impl Stream<Item = Result<StatusResponse, Error>> + Send + 'static {
        let poller = Poller {
            connector: Arc::clone(&self.connector),
            client_key: self.client_key.clone(),
            payment_data: payment_data.into(),
            policy: self.policy,
            span: self.span.clone(),
            started: None,
            delay: Duration::ZERO,
            is_done: false,
        };

        futures::stream::unfold(poller, |mut poller| async move {
            if poller.is_done {
                return None;
            }

            if !poller.delay.is_zero() {
                tokio::time::sleep(poller.delay).await;
            }

            let started = *poller.started.get_or_insert_with(Instant::now);

            let result = poller
                .connector
                .post_status(
                    &poller.client_key,
                    StatusRequest {
                        payment_data: poller.payment_data.clone(),
                    },
                )
                .await;

            match &result {
                Ok(response) if response.is_final_result() => {
                    tracing::debug!(
                        parent: &poller.span,
                        "Final status received: {:?}",
                        response.result_code
                    );
                    poller.is_done = true;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(parent: &poller.span, "Status call failed: {}", err);
                }
            }

            match poller.policy.next_delay(started.elapsed()) {
                Some(delay) => poller.delay = delay,
                None => {
                    tracing::info!(parent: &poller.span, "Status polling gave up");
                    poller.is_done = true;
                }
            }

            Some((result, poller))
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::test_utils::{MockConnector, TEST_CLIENT_KEY};

    fn status(result_code: &str) -> StatusResponse {
        StatusResponse {
            response_type: Some("complete".to_string()),
            payload: Some("payload".to_string()),
            result_code: Some(result_code.to_string()),
        }
    }

    fn repository(connector: Arc<MockConnector>) -> StatusRepository {
        StatusRepository::new(connector, TEST_CLIENT_KEY)
    }

    #[test]
    fn test_next_delay() {
        let policy = PollingPolicy::default();

        assert_eq!(policy.next_delay(Duration::ZERO), Some(Duration::from_secs(2)));
        assert_eq!(policy.next_delay(Duration::from_secs(60)), Some(Duration::from_secs(2)));
        assert_eq!(policy.next_delay(Duration::from_secs(61)), Some(Duration::from_secs(10)));
        assert_eq!(policy.next_delay(Duration::from_secs(900)), Some(Duration::from_secs(10)));
        assert_eq!(policy.next_delay(Duration::from_secs(901)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_final_result() {
        let connector = Arc::new(MockConnector::new());
        connector.push_status_response(Ok(status("pending")));
        connector.push_status_response(Ok(status("received")));
        connector.push_status_response(Ok(status("authorised")));
        connector.push_status_response(Ok(status("authorised")));

        let start = Instant::now();
        let results: Vec<_> = repository(connector.clone())
            .poll("payment_data")
            .collect()
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(connector.calls("post_status"), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_do_not_stop_polling() {
        let connector = Arc::new(MockConnector::new());
        connector.push_status_response(Err(Error::HttpError(None, "offline".to_string())));
        connector.push_status_response(Ok(status("refused")));

        let results: Vec<_> = repository(connector).poll("payment_data").collect().await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert_eq!(
            results[1].as_ref().ok().and_then(|r| r.result_code.as_deref()),
            Some("refused")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_adaptive_delay_until_timeout() {
        let connector = Arc::new(MockConnector::new());
        let start = Instant::now();

        let mut stream = Box::pin(repository(connector).poll("payment_data"));
        let mut call_times = Vec::new();
        while let Some(result) = stream.next().await {
            assert!(result.is_ok());
            call_times.push(start.elapsed());
        }

        assert_eq!(call_times[0], Duration::ZERO);
        assert_eq!(call_times[1], Duration::from_secs(2));
        assert_eq!(call_times[30], Duration::from_secs(60));
        assert_eq!(call_times[31], Duration::from_secs(62));
        assert_eq!(call_times[32], Duration::from_secs(72));

        let last = *call_times.last().expect("polled at least once");
        assert!(last > Duration::from_secs(900));
        assert!(last <= Duration::from_secs(910));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_stream_stops_polling() {
        let connector = Arc::new(MockConnector::new());

        let mut stream = Box::pin(repository(connector.clone()).poll("payment_data"));
        assert!(stream.next().await.is_some());
        drop(stream);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(connector.calls("post_status"), 1);
    }
}
