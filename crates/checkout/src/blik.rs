//! BLIK component

use std::sync::Arc;

use checkout_common::payment_method::{types, BlikPaymentMethod};
use checkout_common::{
    EncryptionError, Error, FieldState, PaymentComponentState, PaymentMethod, Validation,
};

use crate::component::{
    ComponentParams, ComponentReducer, DelegateCore, PaymentComponentDelegate, StateContext,
};
use crate::connector::CheckoutConnector;
use crate::encryption::Encrypter;

/// Code is not 6 digits
pub const BLIK_CODE_INVALID: &str = "blik_code_invalid";

const BLIK_CODE_LENGTH: usize = 6;

/// Shopper input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlikInputData {
    /// Code generated in the banking app
    pub blik_code: String,
}

/// Validated input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlikOutputData {
    /// Code generated in the banking app
    pub blik_code: FieldState<String>,
}

impl BlikOutputData {
    /// Code is valid
    pub fn is_valid(&self) -> bool {
        self.blik_code.is_valid()
    }
}

/// State of the BLIK component
pub type BlikComponentState = PaymentComponentState<BlikPaymentMethod>;

/// BLIK reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct BlikReducer;

impl ComponentReducer for BlikReducer {
    type Input = BlikInputData;
    type Output = BlikOutputData;
    type State = BlikComponentState;

    const PAYMENT_METHOD_TYPES: &'static [&'static str] = &[types::BLIK];

    fn create_output_data(&self, input: &BlikInputData) -> BlikOutputData {
        let blik_code = input.blik_code.trim();
        let is_valid =
            blik_code.len() == BLIK_CODE_LENGTH && blik_code.chars().all(|c| c.is_ascii_digit());

        BlikOutputData {
            blik_code: FieldState::new(
                blik_code.to_string(),
                Validation::check(is_valid, BLIK_CODE_INVALID),
            ),
        }
    }

    fn create_component_state(
        &self,
        output: &BlikOutputData,
        context: &StateContext<'_>,
    ) -> Result<BlikComponentState, EncryptionError> {
        if !output.is_valid() {
            return Ok(BlikComponentState::new(
                context.base_component_data(),
                false,
                context.is_ready,
            ));
        }

        let data = context.component_data(BlikPaymentMethod {
            payment_method_type: context.payment_method_type(),
            checkout_attempt_id: context.checkout_attempt_id.clone(),
            blik_code: output.blik_code.value.clone(),
        });

        Ok(BlikComponentState::new(data, true, context.is_ready))
    }

    fn encryption_failed_state(&self, _context: &StateContext<'_>) -> BlikComponentState {
        BlikComponentState::empty(false, true)
    }

    fn requires_public_key(&self) -> bool {
        false
    }
}

/// BLIK delegate
#[derive(Debug, Clone)]
pub struct BlikDelegate {
    core: DelegateCore<BlikReducer>,
}

impl BlikDelegate {
    /// Create new [`BlikDelegate`]
    pub fn new(
        payment_method: PaymentMethod,
        params: ComponentParams,
        connector: Arc<dyn CheckoutConnector>,
        encrypter: Arc<dyn Encrypter>,
    ) -> Result<Self, Error> {
        Ok(Self {
            core: DelegateCore::new(BlikReducer, payment_method, params, connector, encrypter)?,
        })
    }
}

impl PaymentComponentDelegate for BlikDelegate {
    type Reducer = BlikReducer;

    fn core(&self) -> &DelegateCore<BlikReducer> {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use checkout_common::ComponentState;
    use futures::StreamExt;

    use super::*;
    use crate::component::SubmitOutcome;
    use crate::observable::EmissionPolicy;
    use crate::test_utils::{test_params, MockConnector, TestEncrypter, TEST_CLIENT_KEY};

    fn create_delegate(params: ComponentParams) -> BlikDelegate {
        BlikDelegate::new(
            PaymentMethod::new(types::BLIK),
            params,
            Arc::new(MockConnector::new()),
            Arc::new(TestEncrypter::new()),
        )
        .expect("blik is supported")
    }

    #[tokio::test]
    async fn test_blik_code_validation() {
        let delegate = create_delegate(test_params());

        for (code, valid) in [("777777", true), ("77777", false), ("77777a", false), ("", false)] {
            delegate.update_input_data(|input| input.blik_code = code.to_string());
            assert_eq!(delegate.output_data().is_valid(), valid, "code {code}");
            assert_eq!(delegate.component_state().is_valid(), valid, "code {code}");
        }
    }

    #[tokio::test]
    async fn test_output_reflects_latest_input() {
        let delegate = create_delegate(test_params());

        delegate.update_input_data(|input| input.blik_code = "111111".to_string());
        delegate.update_input_data(|input| input.blik_code = "222222".to_string());

        assert_eq!(delegate.output_data().blik_code.value, "222222");
        let payment_method = delegate
            .component_state()
            .data
            .payment_method
            .expect("payment method present");
        assert_eq!(payment_method.blik_code, "222222");
    }

    #[tokio::test]
    async fn test_invalid_submit_emits_ui_event() {
        let delegate = create_delegate(test_params());

        assert_eq!(delegate.on_submit(), SubmitOutcome::InvalidInput);
        assert!(delegate.ui_events().try_recv().is_some());
    }

    #[tokio::test]
    async fn test_distinct_emission_policy() {
        let params = ComponentParams::builder(checkout_common::Environment::Test, TEST_CLIENT_KEY)
            .emission_policy(EmissionPolicy::DistinctUntilChanged)
            .build()
            .expect("valid params");
        let delegate = create_delegate(params);
        delegate.update_input_data(|input| input.blik_code = "123456".to_string());

        let mut states = delegate.component_state_stream();
        assert!(states.next().await.is_some());

        delegate.update_input_data(|input| input.blik_code = "123456".to_string());
        let next = tokio::time::timeout(std::time::Duration::from_millis(50), states.next()).await;
        assert!(next.is_err(), "identical state must not be re-emitted");
    }
}
