//! ACH direct debit component

use std::sync::Arc;

use checkout_common::payment_method::{types, AchPaymentMethod};
use checkout_common::{
    AddressConfiguration, AddressInput, AddressOutputData, EncryptionError, Error, FieldState,
    PaymentComponentState, PaymentMethod,
};

use crate::address::{billing_address, validate_address};
use crate::component::{
    ComponentParams, ComponentReducer, DelegateCore, PaymentComponentDelegate, StateContext,
};
use crate::connector::CheckoutConnector;
use crate::encryption::{fields, Encrypter};

mod validation;

pub use self::validation::reasons;

/// Shopper input of the ACH form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AchInputData {
    /// Bank account number
    pub bank_account_number: String,
    /// ABA routing number
    pub bank_location_id: String,
    /// Account owner
    pub owner_name: String,
    /// Billing address
    pub address: AddressInput,
    /// Store payment method switch
    pub is_storage_selected: bool,
}

/// Validated ACH form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchOutputData {
    /// Bank account number
    pub bank_account_number: FieldState<String>,
    /// ABA routing number
    pub bank_location_id: FieldState<String>,
    /// Account owner
    pub owner_name: FieldState<String>,
    /// Billing address
    pub address: AddressOutputData,
    /// Store payment method switch
    pub is_storage_selected: bool,
}

impl AchOutputData {
    /// Every field applicable under the address configuration is valid
    pub fn is_valid(&self) -> bool {
        self.bank_account_number.is_valid()
            && self.bank_location_id.is_valid()
            && self.owner_name.is_valid()
            && self.address.is_valid()
    }
}

/// State of the ACH component
pub type AchComponentState = PaymentComponentState<AchPaymentMethod>;

/// ACH reducer
#[derive(Debug, Clone, Default)]
pub struct AchReducer {
    address_configuration: AddressConfiguration,
}

impl AchReducer {
    /// Create new [`AchReducer`]
    pub fn new(address_configuration: AddressConfiguration) -> Self {
        Self {
            address_configuration,
        }
    }
}

impl ComponentReducer for AchReducer {
    type Input = AchInputData;
    type Output = AchOutputData;
    type State = AchComponentState;

    const PAYMENT_METHOD_TYPES: &'static [&'static str] = &[types::ACH];

    fn create_output_data(&self, input: &AchInputData) -> AchOutputData {
        AchOutputData {
            bank_account_number: validation::validate_bank_account_number(
                &input.bank_account_number,
            ),
            bank_location_id: validation::validate_bank_location_id(&input.bank_location_id),
            owner_name: validation::validate_owner_name(&input.owner_name),
            address: validate_address(&input.address, &self.address_configuration),
            is_storage_selected: input.is_storage_selected,
        }
    }

    fn create_component_state(
        &self,
        output: &AchOutputData,
        context: &StateContext<'_>,
    ) -> Result<AchComponentState, EncryptionError> {
        if !output.is_valid() || !context.is_ready {
            return Ok(AchComponentState::new(
                context.base_component_data(),
                output.is_valid(),
                context.is_ready,
            ));
        }

        let public_key = context.require_public_key()?;
        let encrypted_bank_account_number = context.encrypter.encrypt_field(
            fields::BANK_ACCOUNT_NUMBER,
            &output.bank_account_number.value,
            public_key,
        )?;
        let encrypted_bank_location_id = context.encrypter.encrypt_field(
            fields::BANK_LOCATION_ID,
            &output.bank_location_id.value,
            public_key,
        )?;

        let mut data = context.component_data(AchPaymentMethod {
            payment_method_type: context.payment_method_type(),
            checkout_attempt_id: context.checkout_attempt_id.clone(),
            encrypted_bank_account_number,
            encrypted_bank_location_id,
            owner_name: output.owner_name.value.clone(),
        });
        data.billing_address = billing_address(&output.address, &self.address_configuration);
        data.store_payment_method = context
            .params
            .is_store_payment_field_visible
            .then_some(output.is_storage_selected);

        Ok(AchComponentState::new(data, true, true))
    }

    fn encryption_failed_state(&self, _context: &StateContext<'_>) -> AchComponentState {
        AchComponentState::empty(false, true)
    }
}

/// ACH direct debit delegate
#[derive(Debug, Clone)]
pub struct AchDelegate {
    core: DelegateCore<AchReducer>,
}

impl AchDelegate {
    /// Create new [`AchDelegate`]
    pub fn new(
        payment_method: PaymentMethod,
        params: ComponentParams,
        connector: Arc<dyn CheckoutConnector>,
        encrypter: Arc<dyn Encrypter>,
    ) -> Result<Self, Error> {
        let reducer = AchReducer::new(params.address_configuration.clone());

        Ok(Self {
            core: DelegateCore::new(reducer, payment_method, params, connector, encrypter)?,
        })
    }

    /// Whether the address form is shown
    pub fn is_address_required(&self) -> bool {
        self.core.params().address_configuration.is_required()
    }
}

impl PaymentComponentDelegate for AchDelegate {
    type Reducer = AchReducer;

    fn core(&self) -> &DelegateCore<AchReducer> {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use checkout_common::analytics::AnalyticsSetupResponse;
    use checkout_common::{Amount, ComponentState, Environment};

    use super::*;
    use crate::component::SubmitOutcome;
    use crate::scope::ComponentScope;
    use crate::test_utils::{test_params, wait_for, MockConnector, TestEncrypter, TEST_CLIENT_KEY};

    const TEST_BANK_ACCOUNT_NUMBER: &str = "123456";
    const TEST_BANK_LOCATION_ID: &str = "123456789";
    const TEST_OWNER_NAME: &str = "Joseph";

    fn create_delegate(
        params: ComponentParams,
        connector: Arc<MockConnector>,
        encrypter: Arc<TestEncrypter>,
    ) -> AchDelegate {
        AchDelegate::new(PaymentMethod::new(types::ACH), params, connector, encrypter)
            .expect("ach is supported")
    }

    fn fill_valid_input(input: &mut AchInputData) {
        input.bank_account_number = TEST_BANK_ACCOUNT_NUMBER.to_string();
        input.bank_location_id = TEST_BANK_LOCATION_ID.to_string();
        input.owner_name = TEST_OWNER_NAME.to_string();
    }

    async fn initialized_delegate(params: ComponentParams) -> AchDelegate {
        let delegate = create_delegate(
            params,
            Arc::new(MockConnector::with_public_key()),
            Arc::new(TestEncrypter::new()),
        );
        delegate.initialize(&ComponentScope::new());
        assert!(wait_for(|| delegate.core().public_key().is_some()).await);
        delegate
    }

    #[test]
    fn test_unsupported_payment_method() {
        let result = AchDelegate::new(
            PaymentMethod::new(types::BLIK),
            test_params(),
            Arc::new(MockConnector::new()),
            Arc::new(TestEncrypter::new()),
        );

        assert!(matches!(
            result,
            Err(Error::UnsupportedPaymentMethod(payment_method_type)) if payment_method_type == "blik"
        ));
    }

    #[tokio::test]
    async fn test_component_not_initialized_is_not_ready() {
        let delegate = create_delegate(
            test_params(),
            Arc::new(MockConnector::with_public_key()),
            Arc::new(TestEncrypter::new()),
        );

        delegate.update_input_data(fill_valid_input);

        let state = delegate.component_state();
        assert!(state.is_input_valid);
        assert!(!state.is_ready);
    }

    #[tokio::test]
    async fn test_public_key_fetch_failure_is_propagated() {
        let connector = Arc::new(MockConnector::new());
        connector.set_public_key_response(Err(Error::HttpError(
            Some(500),
            "Internal Server Error".to_string(),
        )));
        let delegate = create_delegate(test_params(), connector, Arc::new(TestEncrypter::new()));

        delegate.initialize(&ComponentScope::new());
        let error = delegate.exceptions().recv().await.expect("error emitted");

        assert!(matches!(error, Error::PublicKeyFetch(_)));
        delegate.update_input_data(fill_valid_input);
        assert!(!delegate.component_state().is_ready);
    }

    #[tokio::test]
    async fn test_initialize_again_cancels_previous_scope() {
        let delegate = initialized_delegate(test_params()).await;
        let first = delegate.core().scope().expect("bound to a scope");

        let parent = ComponentScope::new();
        delegate.initialize(&parent);
        let second = delegate.core().scope().expect("bound to a scope");

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_valid_input_without_address() {
        let delegate = initialized_delegate(test_params()).await;

        delegate.update_input_data(fill_valid_input);

        let output = delegate.output_data();
        assert!(output.is_valid());
        assert!(output.address.is_optional);

        let state = delegate.component_state();
        assert!(state.is_valid());

        let payment_method = state.data.payment_method.expect("payment method present");
        assert_eq!(payment_method.payment_method_type, types::ACH);
        assert_eq!(
            payment_method.encrypted_bank_account_number,
            "encrypted:bankAccountNumber:123456"
        );
        assert_eq!(
            payment_method.encrypted_bank_location_id,
            "encrypted:bankLocationId:123456789"
        );
        assert_eq!(payment_method.owner_name, TEST_OWNER_NAME);
        assert_eq!(state.data.billing_address, None);
    }

    #[tokio::test]
    async fn test_invalid_fields_make_state_invalid() {
        let delegate = initialized_delegate(test_params()).await;

        delegate.update_input_data(|input| {
            fill_valid_input(input);
            input.bank_location_id = "12345".to_string();
        });

        let output = delegate.output_data();
        assert_eq!(
            output.bank_location_id.validation.reason(),
            Some(reasons::BANK_LOCATION_ID_INVALID)
        );

        let state = delegate.component_state();
        assert!(!state.is_input_valid);
        assert!(state.is_ready);
        assert_eq!(state.data.payment_method, None);
    }

    #[tokio::test]
    async fn test_full_address_participates_in_validation() {
        let params = ComponentParams::builder(Environment::Test, TEST_CLIENT_KEY)
            .address_configuration(AddressConfiguration::FullAddress {
                default_country_code: Some("US".to_string()),
                supported_country_codes: vec![],
            })
            .build()
            .expect("valid params");
        let delegate = initialized_delegate(params).await;
        assert!(delegate.is_address_required());

        delegate.update_input_data(fill_valid_input);
        assert!(!delegate.component_state().is_input_valid);

        delegate.update_input_data(|input| {
            input.address = AddressInput {
                postal_code: "94107".to_string(),
                street: "Market Street".to_string(),
                state_or_province: "CA".to_string(),
                house_number_or_name: "505".to_string(),
                apartment_suite: String::new(),
                city: "San Francisco".to_string(),
                country: "US".to_string(),
            };
        });

        let state = delegate.component_state();
        assert!(state.is_valid());
        let address = state.data.billing_address.expect("billing address attached");
        assert_eq!(address.postal_code, "94107");
    }

    #[tokio::test]
    async fn test_encryption_failure() {
        let encrypter = Arc::new(TestEncrypter::failing());
        let delegate = create_delegate(
            test_params(),
            Arc::new(MockConnector::with_public_key()),
            encrypter,
        );
        delegate.initialize(&ComponentScope::new());
        assert!(wait_for(|| delegate.core().public_key().is_some()).await);
        delegate.exceptions().drain();

        delegate.update_input_data(fill_valid_input);

        let state = delegate.component_state();
        assert!(!state.is_input_valid);
        assert!(state.is_ready);

        let errors = delegate.exceptions().drain();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Error::Encryption(_)));
    }

    #[tokio::test]
    async fn test_store_payment_method_follows_switch_visibility() {
        for (visible, checked, expected) in [
            (false, false, None),
            (false, true, None),
            (true, true, Some(true)),
            (true, false, Some(false)),
        ] {
            let params = ComponentParams::builder(Environment::Test, TEST_CLIENT_KEY)
                .store_payment_field_visible(visible)
                .build()
                .expect("valid params");
            let delegate = initialized_delegate(params).await;

            delegate.update_input_data(|input| {
                fill_valid_input(input);
                input.is_storage_selected = checked;
            });

            assert_eq!(delegate.component_state().data.store_payment_method, expected);
        }
    }

    #[tokio::test]
    async fn test_amount_is_propagated() {
        for (amount, expected) in [
            (Amount::new("EUR", 100), Some(Amount::new("EUR", 100))),
            (Amount::new("USD", 0), Some(Amount::new("USD", 0))),
            (Amount::EMPTY, None),
        ] {
            let params = ComponentParams::builder(Environment::Test, TEST_CLIENT_KEY)
                .amount(amount)
                .build()
                .expect("valid params");
            let delegate = initialized_delegate(params).await;

            delegate.update_input_data(fill_valid_input);

            assert_eq!(delegate.component_state().data.amount, expected);
        }
    }

    #[tokio::test]
    async fn test_checkout_attempt_id_in_payment_method() {
        let connector = Arc::new(MockConnector::with_public_key());
        connector.set_analytics_response(Ok(AnalyticsSetupResponse {
            checkout_attempt_id: Some("attempt-id".to_string()),
        }));
        let delegate = create_delegate(test_params(), connector, Arc::new(TestEncrypter::new()));
        delegate.initialize(&ComponentScope::new());
        assert!(
            wait_for(|| delegate.core().public_key().is_some()
                && delegate.core().checkout_attempt_id().is_some())
            .await
        );

        delegate.update_input_data(fill_valid_input);

        let payment_method = delegate
            .component_state()
            .data
            .payment_method
            .expect("payment method present");
        assert_eq!(payment_method.checkout_attempt_id.as_deref(), Some("attempt-id"));
    }

    #[tokio::test]
    async fn test_submit_button_visibility() {
        let params = ComponentParams::builder(Environment::Test, TEST_CLIENT_KEY)
            .submit_button_visible(false)
            .build()
            .expect("valid params");
        let delegate = create_delegate(
            params,
            Arc::new(MockConnector::new()),
            Arc::new(TestEncrypter::new()),
        );
        assert!(!delegate.should_show_submit_button());

        let delegate = create_delegate(
            test_params(),
            Arc::new(MockConnector::new()),
            Arc::new(TestEncrypter::new()),
        );
        assert!(delegate.should_show_submit_button());
    }

    #[tokio::test]
    async fn test_submit_before_public_key_waits_for_readiness() {
        let delegate = create_delegate(
            test_params(),
            Arc::new(MockConnector::with_public_key()),
            Arc::new(TestEncrypter::new()),
        );
        delegate.update_input_data(fill_valid_input);

        assert_eq!(delegate.on_submit(), SubmitOutcome::AwaitingReady);
        assert!(delegate.submit_channel().try_recv().is_none());

        delegate.initialize(&ComponentScope::new());

        let submitted = delegate.submit_channel().recv().await.expect("state submitted");
        assert!(submitted.is_valid());
    }
}
