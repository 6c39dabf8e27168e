//! Checkout API connector

use std::fmt::Debug;

use async_trait::async_trait;
use checkout_common::analytics::{AnalyticsSetupRequest, AnalyticsSetupResponse, PublicKeyResponse};
use checkout_common::bin_lookup::{BinLookupRequest, BinLookupResponse};
use checkout_common::session::{
    SessionBalanceRequest, SessionBalanceResponse, SessionCancelOrderRequest,
    SessionCancelOrderResponse, SessionDetailsRequest, SessionOrderRequest, SessionOrderResponse,
    SessionPaymentsRequest, SessionPaymentsResponse, SessionSetupRequest, SessionSetupResponse,
};
use checkout_common::{Error, StatusRequest, StatusResponse};

pub mod http_client;

pub use http_client::HttpClient;

/// Interface that connects components to the checkout API. Typically represents an [HttpClient].
#[async_trait]
pub trait CheckoutConnector: Debug + Send + Sync {
    /// Public key used to encrypt card and bank details
    async fn get_public_key(&self, client_key: &str) -> Result<PublicKeyResponse, Error>;
    /// Register a checkout attempt
    async fn post_analytics_setup(
        &self,
        client_key: &str,
        request: AnalyticsSetupRequest,
    ) -> Result<AnalyticsSetupResponse, Error>;
    /// Payment status for await-style actions
    async fn post_status(
        &self,
        client_key: &str,
        request: StatusRequest,
    ) -> Result<StatusResponse, Error>;
    /// Card brands matching an encrypted bin
    async fn post_bin_lookup(
        &self,
        client_key: &str,
        request: BinLookupRequest,
    ) -> Result<BinLookupResponse, Error>;
    /// Set up a session
    async fn post_session_setup(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionSetupRequest,
    ) -> Result<SessionSetupResponse, Error>;
    /// Make a payment within a session
    async fn post_session_payments(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionPaymentsRequest,
    ) -> Result<SessionPaymentsResponse, Error>;
    /// Submit action details within a session
    async fn post_session_details(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionDetailsRequest,
    ) -> Result<SessionPaymentsResponse, Error>;
    /// Check a gift card balance within a session
    async fn post_session_balance(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionBalanceRequest,
    ) -> Result<SessionBalanceResponse, Error>;
    /// Create an order within a session
    async fn post_session_order(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionOrderRequest,
    ) -> Result<SessionOrderResponse, Error>;
    /// Cancel an order within a session
    async fn post_session_cancel_order(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionCancelOrderRequest,
    ) -> Result<SessionCancelOrderResponse, Error>;
}
