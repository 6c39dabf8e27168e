//! Sessions API calls

use std::sync::Arc;

use checkout_common::session::{
    SessionBalanceRequest, SessionBalanceResponse, SessionCancelOrderRequest,
    SessionCancelOrderResponse, SessionDetailsRequest, SessionOrderRequest, SessionOrderResponse,
    SessionPaymentsRequest, SessionPaymentsResponse, SessionSetupRequest, SessionSetupResponse,
};
use checkout_common::{
    ActionComponentData, Error, OrderRequest, PaymentComponentData, SessionModel,
};
use serde::Serialize;
use tracing::instrument;

use crate::connector::CheckoutConnector;

/// Calls the sessions endpoints on behalf of a [`SessionModel`]
///
/// The repository is stateless, callers keep the `sessionData` returned by every call.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    connector: Arc<dyn CheckoutConnector>,
    client_key: String,
}

fn session_data(model: &SessionModel) -> Result<String, Error> {
    model
        .session_data
        .clone()
        .ok_or_else(|| Error::Custom(format!("Session {} has no session data", model.id)))
}

impl SessionRepository {
    /// Create new [`SessionRepository`]
    pub fn new(connector: Arc<dyn CheckoutConnector>, client_key: impl Into<String>) -> Self {
        Self {
            connector,
            client_key: client_key.into(),
        }
    }

    /// Client key the calls are made with
    pub fn client_key(&self) -> &str {
        &self.client_key
    }

    /// Fetch the session configuration, optionally for an existing order
    #[instrument(skip(self, model), fields(session_id = %model.id))]
    pub async fn setup_session(
        &self,
        model: &SessionModel,
        order: Option<OrderRequest>,
    ) -> Result<SessionSetupResponse, Error> {
        let request = SessionSetupRequest {
            session_data: session_data(model)?,
            order,
        };

        self.connector
            .post_session_setup(&self.client_key, &model.id, request)
            .await
    }

    /// Submit a payment
    #[instrument(skip_all, fields(session_id = %model.id))]
    pub async fn submit_payment<P>(
        &self,
        model: &SessionModel,
        data: &PaymentComponentData<P>,
    ) -> Result<SessionPaymentsResponse, Error>
    where
        P: Serialize + Sync,
    {
        let request = SessionPaymentsRequest {
            session_data: session_data(model)?,
            payment_component_data: serde_json::to_value(data)?,
        };

        self.connector
            .post_session_payments(&self.client_key, &model.id, request)
            .await
    }

    /// Submit the details of an action
    #[instrument(skip_all, fields(session_id = %model.id))]
    pub async fn submit_details(
        &self,
        model: &SessionModel,
        data: &ActionComponentData,
    ) -> Result<SessionPaymentsResponse, Error> {
        let request = SessionDetailsRequest {
            session_data: session_data(model)?,
            payment_data: data.payment_data.clone(),
            details: data.details.clone(),
        };

        self.connector
            .post_session_details(&self.client_key, &model.id, request)
            .await
    }

    /// Check the balance of the payment method in `data`
    #[instrument(skip_all, fields(session_id = %model.id))]
    pub async fn check_balance<P>(
        &self,
        model: &SessionModel,
        data: &PaymentComponentData<P>,
    ) -> Result<SessionBalanceResponse, Error>
    where
        P: Serialize + Sync,
    {
        let request = SessionBalanceRequest {
            session_data: session_data(model)?,
            payment_method: serde_json::to_value(&data.payment_method)?,
            amount: data.amount.clone(),
        };

        self.connector
            .post_session_balance(&self.client_key, &model.id, request)
            .await
    }

    /// Create an order for a partial payment
    #[instrument(skip_all, fields(session_id = %model.id))]
    pub async fn create_order(&self, model: &SessionModel) -> Result<SessionOrderResponse, Error> {
        let request = SessionOrderRequest {
            session_data: session_data(model)?,
        };

        self.connector
            .post_session_order(&self.client_key, &model.id, request)
            .await
    }

    /// Cancel an order
    #[instrument(skip_all, fields(session_id = %model.id))]
    pub async fn cancel_order(
        &self,
        model: &SessionModel,
        order: &OrderRequest,
    ) -> Result<SessionCancelOrderResponse, Error> {
        let request = SessionCancelOrderRequest {
            session_data: session_data(model)?,
            order: order.clone(),
        };

        self.connector
            .post_session_cancel_order(&self.client_key, &model.id, request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use checkout_common::payment_method::BlikPaymentMethod;
    use checkout_common::session::SessionPaymentsResponse;

    use super::*;
    use crate::test_utils::{MockConnector, TEST_CLIENT_KEY};

    #[tokio::test]
    async fn test_missing_session_data() {
        let connector = Arc::new(MockConnector::new());
        let repository = SessionRepository::new(connector.clone(), TEST_CLIENT_KEY);

        let result = repository
            .setup_session(&SessionModel::new("CS1", None), None)
            .await;

        assert!(matches!(result, Err(Error::Custom(_))));
        assert_eq!(connector.calls("post_session_setup"), 0);
    }

    #[tokio::test]
    async fn test_payment_request_carries_component_data() {
        let connector = Arc::new(MockConnector::new());
        connector.set_session_payments_response(Ok(SessionPaymentsResponse {
            session_data: "next".to_string(),
            ..Default::default()
        }));
        let repository = SessionRepository::new(connector.clone(), TEST_CLIENT_KEY);

        let data = PaymentComponentData {
            payment_method: Some(BlikPaymentMethod {
                payment_method_type: "blik".to_string(),
                checkout_attempt_id: None,
                blik_code: "777777".to_string(),
            }),
            ..Default::default()
        };
        let response = repository
            .submit_payment(&SessionModel::new("CS1", Some("data".to_string())), &data)
            .await
            .expect("payment submitted");
        assert_eq!(response.session_data, "next");

        let request = connector
            .last_session_payments_request
            .lock()
            .clone()
            .expect("request recorded");
        assert_eq!(request.session_data, "data");
        assert_eq!(
            request.payment_component_data["paymentMethod"]["blikCode"],
            "777777"
        );
    }
}
