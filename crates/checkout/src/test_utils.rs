//! Test helpers: canned connector responses and a deterministic encrypter
#![allow(missing_docs)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use checkout_common::analytics::{AnalyticsSetupRequest, AnalyticsSetupResponse, PublicKeyResponse};
use checkout_common::bin_lookup::{BinLookupRequest, BinLookupResponse};
use checkout_common::parking_lot::Mutex;
use checkout_common::session::{
    SessionBalanceRequest, SessionBalanceResponse, SessionCancelOrderRequest,
    SessionCancelOrderResponse, SessionDetailsRequest, SessionOrderRequest, SessionOrderResponse,
    SessionPaymentsRequest, SessionPaymentsResponse, SessionSetupRequest, SessionSetupResponse,
};
use checkout_common::{EncryptionError, Environment, Error, StatusRequest, StatusResponse};

use crate::component::ComponentParams;
use crate::connector::CheckoutConnector;
use crate::encryption::Encrypter;

pub const TEST_CLIENT_KEY: &str = "test_CLIENTKEY";
pub const TEST_PUBLIC_KEY: &str = "10001|PUBLICKEY";

/// Default component params for tests
pub fn test_params() -> ComponentParams {
    ComponentParams::builder(Environment::Test, TEST_CLIENT_KEY)
        .build()
        .expect("valid test params")
}

/// Yield to spawned tasks until `condition` holds, returns whether it did
pub async fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..1000 {
        if condition() {
            return true;
        }
        tokio::task::yield_now().await;
    }
    condition()
}

fn not_configured<T>(endpoint: &str) -> Result<T, Error> {
    Err(Error::Custom(format!(
        "MockConnector: {endpoint} called without configured response"
    )))
}

/// Mock [`CheckoutConnector`]
///
/// Unconfigured endpoints fail with [`Error::Custom`]. Status responses are queued, an empty
/// queue answers `pending`.
#[derive(Debug, Default)]
pub struct MockConnector {
    pub public_key_response: Mutex<Option<Result<PublicKeyResponse, Error>>>,
    pub analytics_response: Mutex<Option<Result<AnalyticsSetupResponse, Error>>>,
    pub status_responses: Mutex<VecDeque<Result<StatusResponse, Error>>>,
    pub bin_lookup_response: Mutex<Option<Result<BinLookupResponse, Error>>>,
    pub session_setup_response: Mutex<Option<Result<SessionSetupResponse, Error>>>,
    pub session_payments_response: Mutex<Option<Result<SessionPaymentsResponse, Error>>>,
    pub session_details_response: Mutex<Option<Result<SessionPaymentsResponse, Error>>>,
    pub session_balance_response: Mutex<Option<Result<SessionBalanceResponse, Error>>>,
    pub session_order_response: Mutex<Option<Result<SessionOrderResponse, Error>>>,
    pub session_cancel_order_response: Mutex<Option<Result<SessionCancelOrderResponse, Error>>>,
    pub last_session_payments_request: Mutex<Option<SessionPaymentsRequest>>,
    pub last_bin_lookup_request: Mutex<Option<BinLookupRequest>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector answering the public key request with [`TEST_PUBLIC_KEY`]
    pub fn with_public_key() -> Self {
        let connector = Self::new();
        connector.set_public_key_response(Ok(PublicKeyResponse {
            public_key: TEST_PUBLIC_KEY.to_string(),
        }));
        connector
    }

    pub fn set_public_key_response(&self, response: Result<PublicKeyResponse, Error>) {
        *self.public_key_response.lock() = Some(response);
    }

    pub fn set_analytics_response(&self, response: Result<AnalyticsSetupResponse, Error>) {
        *self.analytics_response.lock() = Some(response);
    }

    pub fn push_status_response(&self, response: Result<StatusResponse, Error>) {
        self.status_responses.lock().push_back(response);
    }

    pub fn set_bin_lookup_response(&self, response: Result<BinLookupResponse, Error>) {
        *self.bin_lookup_response.lock() = Some(response);
    }

    pub fn set_session_setup_response(&self, response: Result<SessionSetupResponse, Error>) {
        *self.session_setup_response.lock() = Some(response);
    }

    pub fn set_session_payments_response(&self, response: Result<SessionPaymentsResponse, Error>) {
        *self.session_payments_response.lock() = Some(response);
    }

    pub fn set_session_details_response(&self, response: Result<SessionPaymentsResponse, Error>) {
        *self.session_details_response.lock() = Some(response);
    }

    pub fn set_session_balance_response(&self, response: Result<SessionBalanceResponse, Error>) {
        *self.session_balance_response.lock() = Some(response);
    }

    pub fn set_session_order_response(&self, response: Result<SessionOrderResponse, Error>) {
        *self.session_order_response.lock() = Some(response);
    }

    pub fn set_session_cancel_order_response(
        &self,
        response: Result<SessionCancelOrderResponse, Error>,
    ) {
        *self.session_cancel_order_response.lock() = Some(response);
    }

    /// Number of calls made to `endpoint`
    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().get(endpoint).copied().unwrap_or_default()
    }

    fn record(&self, endpoint: &'static str) {
        *self.calls.lock().entry(endpoint).or_default() += 1;
    }
}

fn take<T>(slot: &Mutex<Option<Result<T, Error>>>, endpoint: &str) -> Result<T, Error> {
    slot.lock()
        .take()
        .unwrap_or_else(|| not_configured(endpoint))
}

#[async_trait]
impl CheckoutConnector for MockConnector {
    async fn get_public_key(&self, _client_key: &str) -> Result<PublicKeyResponse, Error> {
        self.record("get_public_key");
        take(&self.public_key_response, "get_public_key")
    }

    async fn post_analytics_setup(
        &self,
        _client_key: &str,
        _request: AnalyticsSetupRequest,
    ) -> Result<AnalyticsSetupResponse, Error> {
        self.record("post_analytics_setup");
        take(&self.analytics_response, "post_analytics_setup")
    }

    async fn post_status(
        &self,
        _client_key: &str,
        _request: StatusRequest,
    ) -> Result<StatusResponse, Error> {
        self.record("post_status");
        self.status_responses.lock().pop_front().unwrap_or_else(|| {
            Ok(StatusResponse {
                response_type: Some("pending".to_string()),
                payload: None,
                result_code: Some("pending".to_string()),
            })
        })
    }

    async fn post_bin_lookup(
        &self,
        _client_key: &str,
        request: BinLookupRequest,
    ) -> Result<BinLookupResponse, Error> {
        self.record("post_bin_lookup");
        *self.last_bin_lookup_request.lock() = Some(request);
        take(&self.bin_lookup_response, "post_bin_lookup")
    }

    async fn post_session_setup(
        &self,
        _client_key: &str,
        _session_id: &str,
        _request: SessionSetupRequest,
    ) -> Result<SessionSetupResponse, Error> {
        self.record("post_session_setup");
        take(&self.session_setup_response, "post_session_setup")
    }

    async fn post_session_payments(
        &self,
        _client_key: &str,
        _session_id: &str,
        request: SessionPaymentsRequest,
    ) -> Result<SessionPaymentsResponse, Error> {
        self.record("post_session_payments");
        *self.last_session_payments_request.lock() = Some(request);
        take(&self.session_payments_response, "post_session_payments")
    }

    async fn post_session_details(
        &self,
        _client_key: &str,
        _session_id: &str,
        _request: SessionDetailsRequest,
    ) -> Result<SessionPaymentsResponse, Error> {
        self.record("post_session_details");
        take(&self.session_details_response, "post_session_details")
    }

    async fn post_session_balance(
        &self,
        _client_key: &str,
        _session_id: &str,
        _request: SessionBalanceRequest,
    ) -> Result<SessionBalanceResponse, Error> {
        self.record("post_session_balance");
        take(&self.session_balance_response, "post_session_balance")
    }

    async fn post_session_order(
        &self,
        _client_key: &str,
        _session_id: &str,
        _request: SessionOrderRequest,
    ) -> Result<SessionOrderResponse, Error> {
        self.record("post_session_order");
        take(&self.session_order_response, "post_session_order")
    }

    async fn post_session_cancel_order(
        &self,
        _client_key: &str,
        _session_id: &str,
        _request: SessionCancelOrderRequest,
    ) -> Result<SessionCancelOrderResponse, Error> {
        self.record("post_session_cancel_order");
        take(
            &self.session_cancel_order_response,
            "post_session_cancel_order",
        )
    }
}

/// Deterministic [`Encrypter`], `encrypted:{field}:{value}`
#[derive(Debug, Default)]
pub struct TestEncrypter {
    fail: AtomicBool,
}

impl TestEncrypter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encrypter failing every call
    pub fn failing() -> Self {
        let encrypter = Self::new();
        encrypter.set_failing(true);
        encrypter
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Encrypter for TestEncrypter {
    fn encrypt_field(
        &self,
        field: &str,
        value: &str,
        _public_key: &str,
    ) -> Result<String, EncryptionError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EncryptionError::Failed("test encrypter failure".to_string()));
        }

        Ok(format!("encrypted:{field}:{value}"))
    }
}
