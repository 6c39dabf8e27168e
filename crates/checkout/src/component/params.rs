//! Component configuration

use checkout_common::{AddressConfiguration, Amount, Environment, Error};
use tracing::Span;

use crate::observable::EmissionPolicy;

const DEFAULT_SHOPPER_LOCALE: &str = "en-US";
const TEST_CLIENT_KEY_PREFIX: &str = "test_";
const LIVE_CLIENT_KEY_PREFIX: &str = "live_";

/// Configuration shared by every component
#[derive(Debug, Clone)]
pub struct ComponentParams {
    /// API environment
    pub environment: Environment,
    /// Client key used to authenticate API calls
    pub client_key: String,
    /// Locale sent with analytics
    pub shopper_locale: String,
    /// Amount of the payment, `None` when not configured or empty
    pub amount: Option<Amount>,
    /// Whether the component renders its own pay button
    pub is_submit_button_visible: bool,
    /// Whether the shopper can choose to store the payment method
    pub is_store_payment_field_visible: bool,
    /// Emission policy of output data and component state holders
    pub emission_policy: EmissionPolicy,
    /// Billing address form mode
    pub address_configuration: AddressConfiguration,
    /// Parent span for component events
    pub span: Option<Span>,
}

impl ComponentParams {
    /// Start building [`ComponentParams`]
    pub fn builder(
        environment: Environment,
        client_key: impl Into<String>,
    ) -> ComponentParamsBuilder {
        ComponentParamsBuilder::new(environment, client_key)
    }
}

/// Builder for [`ComponentParams`]
#[derive(Debug, Clone)]
pub struct ComponentParamsBuilder {
    environment: Environment,
    client_key: String,
    shopper_locale: Option<String>,
    amount: Option<Amount>,
    is_submit_button_visible: bool,
    is_store_payment_field_visible: bool,
    emission_policy: EmissionPolicy,
    address_configuration: AddressConfiguration,
    span: Option<Span>,
}

impl ComponentParamsBuilder {
    /// Create a new ComponentParamsBuilder
    pub fn new(environment: Environment, client_key: impl Into<String>) -> Self {
        Self {
            environment,
            client_key: client_key.into(),
            shopper_locale: None,
            amount: None,
            is_submit_button_visible: true,
            is_store_payment_field_visible: true,
            emission_policy: EmissionPolicy::default(),
            address_configuration: AddressConfiguration::default(),
            span: None,
        }
    }

    /// Set the shopper locale
    pub fn shopper_locale(mut self, shopper_locale: impl Into<String>) -> Self {
        self.shopper_locale = Some(shopper_locale.into());
        self
    }

    /// Set the payment amount, [`Amount::EMPTY`] clears it
    pub fn amount(mut self, amount: Amount) -> Self {
        self.amount = amount.non_empty();
        self
    }

    /// Set submit button visibility
    pub fn submit_button_visible(mut self, visible: bool) -> Self {
        self.is_submit_button_visible = visible;
        self
    }

    /// Set store payment method switch visibility
    pub fn store_payment_field_visible(mut self, visible: bool) -> Self {
        self.is_store_payment_field_visible = visible;
        self
    }

    /// Set the emission policy of state holders
    pub fn emission_policy(mut self, emission_policy: EmissionPolicy) -> Self {
        self.emission_policy = emission_policy;
        self
    }

    /// Set the billing address form mode
    pub fn address_configuration(mut self, address_configuration: AddressConfiguration) -> Self {
        self.address_configuration = address_configuration;
        self
    }

    /// Route component events under the given span
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Build [`ComponentParams`]
    pub fn build(self) -> Result<ComponentParams, Error> {
        validate_client_key(&self.environment, &self.client_key)?;

        Ok(ComponentParams {
            environment: self.environment,
            client_key: self.client_key,
            shopper_locale: self
                .shopper_locale
                .unwrap_or_else(|| DEFAULT_SHOPPER_LOCALE.to_string()),
            amount: self.amount,
            is_submit_button_visible: self.is_submit_button_visible,
            is_store_payment_field_visible: self.is_store_payment_field_visible,
            emission_policy: self.emission_policy,
            address_configuration: self.address_configuration,
            span: self.span,
        })
    }
}

fn validate_client_key(environment: &Environment, client_key: &str) -> Result<(), Error> {
    if client_key.trim().is_empty() {
        return Err(Error::InvalidClientKey("client key is empty".to_string()));
    }

    let matches_environment = match environment {
        Environment::Test => client_key.starts_with(TEST_CLIENT_KEY_PREFIX),
        Environment::Custom(_) => true,
        _ => client_key.starts_with(LIVE_CLIENT_KEY_PREFIX),
    };

    if !matches_environment {
        return Err(Error::InvalidClientKey(format!(
            "client key does not match the {environment} environment"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ComponentParams::builder(Environment::Test, "test_KEY")
            .build()
            .expect("valid params");

        assert_eq!(params.shopper_locale, "en-US");
        assert_eq!(params.amount, None);
        assert!(params.is_submit_button_visible);
        assert!(params.is_store_payment_field_visible);
        assert_eq!(params.emission_policy, EmissionPolicy::EmitAll);
        assert_eq!(params.address_configuration, AddressConfiguration::None);
    }

    #[test]
    fn test_empty_amount_is_dropped() {
        let params = ComponentParams::builder(Environment::Test, "test_KEY")
            .amount(Amount::EMPTY)
            .build()
            .expect("valid params");
        assert_eq!(params.amount, None);

        let params = ComponentParams::builder(Environment::Test, "test_KEY")
            .amount(Amount::new("USD", 0))
            .build()
            .expect("valid params");
        assert_eq!(params.amount, Some(Amount::new("USD", 0)));
    }

    #[test]
    fn test_client_key_must_match_environment() {
        assert!(ComponentParams::builder(Environment::Test, "live_KEY")
            .build()
            .is_err());
        assert!(ComponentParams::builder(Environment::Europe, "test_KEY")
            .build()
            .is_err());
        assert!(ComponentParams::builder(Environment::Europe, "live_KEY")
            .build()
            .is_ok());
        assert!(ComponentParams::builder(Environment::Test, "  ")
            .build()
            .is_err());
    }
}
