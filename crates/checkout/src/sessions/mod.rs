//! Sessions
//!
//! A session is created by the merchant backend. The components then talk to the sessions
//! endpoints with the client key, carrying the opaque `sessionData` from call to call.

use std::sync::Arc;

use checkout_common::session::SessionSetupResponse;
use checkout_common::{Amount, Environment, Error, OrderRequest, SessionModel};
use tracing::instrument;

use crate::component::ComponentParams;
use crate::connector::CheckoutConnector;

mod interactor;
mod repository;
mod saved_state;

pub use self::interactor::{
    BalanceCallResult, CancelOrderCallResult, OrderCallResult, SessionCallResult,
    SessionInteractor,
};
pub use self::repository::SessionRepository;
pub use self::saved_state::{SavedSessionState, SessionSavedStateHandle};

/// Component configuration coming from a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionParams {
    /// API environment
    pub environment: Environment,
    /// Client key
    pub client_key: String,
    /// Whether the shopper may store the payment method
    pub enable_store_details: Option<bool>,
    /// Whether stored payment methods can be removed
    pub show_remove_payment_method_button: Option<bool>,
    /// Amount of the session
    pub amount: Option<Amount>,
    /// Return url for redirects
    pub return_url: Option<String>,
    /// Shopper locale
    pub shopper_locale: Option<String>,
}

impl SessionParams {
    /// [`ComponentParams`] with the session values applied
    ///
    /// The session decides the amount and the locale. The store payment switch is hidden unless
    /// the session enables it.
    pub fn component_params(&self) -> Result<ComponentParams, Error> {
        let mut builder = ComponentParams::builder(self.environment.clone(), &self.client_key)
            .store_payment_field_visible(self.enable_store_details.unwrap_or(false));

        if let Some(amount) = &self.amount {
            builder = builder.amount(amount.clone());
        }
        if let Some(locale) = &self.shopper_locale {
            builder = builder.shopper_locale(locale);
        }

        builder.build()
    }
}

/// Session ready to be used by components
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    /// Setup response
    pub setup_response: SessionSetupResponse,
    /// Order of an ongoing partial payment
    pub order: Option<OrderRequest>,
    /// API environment
    pub environment: Environment,
    /// Client key
    pub client_key: String,
}

impl CheckoutSession {
    /// Session model with the session data of the setup response
    pub fn session_model(&self) -> SessionModel {
        SessionModel::new(
            self.setup_response.id.clone(),
            Some(self.setup_response.session_data.clone()),
        )
    }

    /// Component configuration of the session
    pub fn session_params(&self) -> SessionParams {
        let configuration = self.setup_response.configuration.clone().unwrap_or_default();

        SessionParams {
            environment: self.environment.clone(),
            client_key: self.client_key.clone(),
            enable_store_details: configuration.enable_store_details,
            show_remove_payment_method_button: configuration.show_remove_payment_method_button,
            amount: self
                .setup_response
                .amount
                .clone()
                .and_then(Amount::non_empty),
            return_url: self.setup_response.return_url.clone(),
            shopper_locale: self.setup_response.shopper_locale.clone(),
        }
    }
}

/// Set up `session_model` and return the [`CheckoutSession`]
#[instrument(skip(connector, client_key), fields(session_id = %session_model.id))]
pub async fn create_checkout_session(
    connector: Arc<dyn CheckoutConnector>,
    session_model: &SessionModel,
    environment: Environment,
    client_key: &str,
    order: Option<OrderRequest>,
) -> Result<CheckoutSession, Error> {
    let repository = SessionRepository::new(connector, client_key);
    let setup_response = repository
        .setup_session(session_model, order.clone())
        .await?;

    tracing::debug!("Session {} set up", setup_response.id);

    Ok(CheckoutSession {
        setup_response,
        order,
        environment,
        client_key: client_key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use checkout_common::session::SessionSetupConfiguration;

    use super::*;
    use crate::test_utils::{MockConnector, TEST_CLIENT_KEY};

    fn setup_response() -> SessionSetupResponse {
        SessionSetupResponse {
            id: "CS1".to_string(),
            session_data: "session_data_1".to_string(),
            amount: Some(Amount::new("EUR", 1000)),
            expires_at: None,
            payment_methods: None,
            return_url: Some("app://return".to_string()),
            configuration: Some(SessionSetupConfiguration {
                enable_store_details: Some(true),
                show_remove_payment_method_button: None,
            }),
            shopper_locale: Some("nl-NL".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_checkout_session() {
        let connector = Arc::new(MockConnector::new());
        connector.set_session_setup_response(Ok(setup_response()));

        let session = create_checkout_session(
            connector,
            &SessionModel::new("CS1", Some("session_data_0".to_string())),
            Environment::Test,
            TEST_CLIENT_KEY,
            Some(OrderRequest::new("psp", "order_data")),
        )
        .await
        .expect("session created");

        assert_eq!(
            session.session_model(),
            SessionModel::new("CS1", Some("session_data_1".to_string()))
        );
        assert_eq!(session.order, Some(OrderRequest::new("psp", "order_data")));

        let params = session
            .session_params()
            .component_params()
            .expect("valid params");
        assert_eq!(params.amount, Some(Amount::new("EUR", 1000)));
        assert_eq!(params.shopper_locale, "nl-NL");
        assert!(params.is_store_payment_field_visible);
    }

    #[test]
    fn test_store_field_hidden_by_default() {
        let session = CheckoutSession {
            setup_response: SessionSetupResponse {
                configuration: None,
                amount: Some(Amount::EMPTY),
                ..setup_response()
            },
            order: None,
            environment: Environment::Test,
            client_key: TEST_CLIENT_KEY.to_string(),
        };

        let params = session
            .session_params()
            .component_params()
            .expect("valid params");
        assert!(!params.is_store_payment_field_visible);
        assert_eq!(params.amount, None);
    }

    #[tokio::test]
    async fn test_setup_failure() {
        let connector = Arc::new(MockConnector::new());
        connector.set_session_setup_response(Err(Error::HttpError(
            Some(401),
            "Unauthorized".to_string(),
        )));

        let result = create_checkout_session(
            connector,
            &SessionModel::new("CS1", Some("session_data_0".to_string())),
            Environment::Test,
            TEST_CLIENT_KEY,
            None,
        )
        .await;

        assert!(matches!(result, Err(Error::HttpError(Some(401), _))));
    }
}
