//! HTTP implementation of [`CheckoutConnector`]

use async_trait::async_trait;
use checkout_common::analytics::{AnalyticsSetupRequest, AnalyticsSetupResponse, PublicKeyResponse};
use checkout_common::bin_lookup::{BinLookupRequest, BinLookupResponse};
use checkout_common::session::{
    SessionBalanceRequest, SessionBalanceResponse, SessionCancelOrderRequest,
    SessionCancelOrderResponse, SessionDetailsRequest, SessionOrderRequest, SessionOrderResponse,
    SessionPaymentsRequest, SessionPaymentsResponse, SessionSetupRequest, SessionSetupResponse,
};
use checkout_common::{Environment, Error, ErrorResponse, StatusRequest, StatusResponse};
use reqwest::{Client, IntoUrl};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;
use url::Url;

use super::CheckoutConnector;

#[derive(Debug, Clone)]
struct HttpClientCore {
    inner: Client,
}

impl HttpClientCore {
    fn new(inner: Client) -> Self {
        Self { inner }
    }

    fn client(&self) -> &Client {
        &self.inner
    }

    async fn http_get<U: IntoUrl + Send, R: DeserializeOwned>(&self, url: U) -> Result<R, Error> {
        let response = self
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| {
                Error::HttpError(
                    e.status().map(|status_code| status_code.as_u16()),
                    e.to_string(),
                )
            })?
            .text()
            .await
            .map_err(|e| {
                Error::HttpError(
                    e.status().map(|status_code| status_code.as_u16()),
                    e.to_string(),
                )
            })?;

        parse_response(&response)
    }

    async fn http_post<U: IntoUrl + Send, P: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: U,
        payload: &P,
    ) -> Result<R, Error> {
        let response = self
            .client()
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                Error::HttpError(
                    e.status().map(|status_code| status_code.as_u16()),
                    e.to_string(),
                )
            })?;

        let response = response.text().await.map_err(|e| {
            Error::HttpError(
                e.status().map(|status_code| status_code.as_u16()),
                e.to_string(),
            )
        })?;

        parse_response(&response)
    }
}

fn parse_response<R: DeserializeOwned>(response: &str) -> Result<R, Error> {
    serde_json::from_str::<R>(response).map_err(|err| {
        tracing::warn!("Http Response error: {}", err);
        match ErrorResponse::from_json(response) {
            Ok(ok) => <ErrorResponse as Into<Error>>::into(ok),
            Err(err) => err.into(),
        }
    })
}

/// Http Client
#[derive(Debug, Clone)]
pub struct HttpClient {
    core: HttpClientCore,
    base_url: Url,
}

impl HttpClient {
    /// Create new [`HttpClient`]
    pub fn new(environment: Environment) -> Result<Self, Error> {
        Self::with_client(environment, Client::new())
    }

    /// Create new [`HttpClient`] on top of an existing [`reqwest::Client`]
    pub fn with_client(environment: Environment, client: Client) -> Result<Self, Error> {
        Ok(Self {
            core: HttpClientCore::new(client),
            base_url: environment.base_url()?,
        })
    }

    /// Base url requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, query: Option<(&str, &str)>) -> Result<Url, Error> {
        let mut url = self.base_url.join(path)?;
        if let Some((name, value)) = query {
            url.query_pairs_mut().append_pair(name, value);
        }
        Ok(url)
    }

    fn session_endpoint(
        &self,
        session_id: &str,
        action: &str,
        client_key: &str,
    ) -> Result<Url, Error> {
        self.endpoint(
            &format!("v1/sessions/{session_id}/{action}"),
            Some(("clientKey", client_key)),
        )
    }
}

#[async_trait]
impl CheckoutConnector for HttpClient {
    #[instrument(skip(self))]
    async fn get_public_key(&self, client_key: &str) -> Result<PublicKeyResponse, Error> {
        let url = self.endpoint(&format!("v1/clientKeys/{client_key}"), None)?;
        self.core.http_get(url).await
    }

    #[instrument(skip(self, request))]
    async fn post_analytics_setup(
        &self,
        client_key: &str,
        request: AnalyticsSetupRequest,
    ) -> Result<AnalyticsSetupResponse, Error> {
        let url = self.endpoint("v3/analytics/setup", Some(("clientKey", client_key)))?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self, request))]
    async fn post_status(
        &self,
        client_key: &str,
        request: StatusRequest,
    ) -> Result<StatusResponse, Error> {
        let url = self.endpoint(
            "services/PaymentInitiation/v1/status",
            Some(("token", client_key)),
        )?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    async fn post_bin_lookup(
        &self,
        client_key: &str,
        request: BinLookupRequest,
    ) -> Result<BinLookupResponse, Error> {
        let url = self.endpoint("v2/bin/binLookup", Some(("token", client_key)))?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self, request))]
    async fn post_session_setup(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionSetupRequest,
    ) -> Result<SessionSetupResponse, Error> {
        let url = self.session_endpoint(session_id, "setup", client_key)?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self, request))]
    async fn post_session_payments(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionPaymentsRequest,
    ) -> Result<SessionPaymentsResponse, Error> {
        let url = self.session_endpoint(session_id, "payments", client_key)?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self, request))]
    async fn post_session_details(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionDetailsRequest,
    ) -> Result<SessionPaymentsResponse, Error> {
        let url = self.session_endpoint(session_id, "paymentDetails", client_key)?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self, request))]
    async fn post_session_balance(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionBalanceRequest,
    ) -> Result<SessionBalanceResponse, Error> {
        let url = self.session_endpoint(session_id, "paymentMethodBalance", client_key)?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self, request))]
    async fn post_session_order(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionOrderRequest,
    ) -> Result<SessionOrderResponse, Error> {
        let url = self.session_endpoint(session_id, "orders", client_key)?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self, request))]
    async fn post_session_cancel_order(
        &self,
        client_key: &str,
        session_id: &str,
        request: SessionCancelOrderRequest,
    ) -> Result<SessionCancelOrderResponse, Error> {
        let url = self.session_endpoint(session_id, "orders/cancel", client_key)?;
        self.core.http_post(url, &request).await
    }
}
