//! Card component
//!
//! The brand of the number is detected locally from its prefix and, once 11 digits are typed,
//! through the bin lookup endpoint. Reliable results from the lookup decide the security code and
//! expiry date policies and whether the Luhn check applies.

use std::sync::Arc;

use checkout_common::bin_lookup::{CardBrand, DetectedCardType, FieldPolicy};
use checkout_common::payment_method::{types, CardPaymentMethod};
use checkout_common::{
    EncryptionError, Error, FieldState, PaymentComponentState, PaymentMethod,
};
use time::OffsetDateTime;

use crate::bin_lookup::BinLookupRepository;
use crate::component::{
    ComponentParams, ComponentReducer, DelegateCore, InputOf, PaymentComponentDelegate,
    StateContext,
};
use crate::connector::CheckoutConnector;
use crate::encryption::{Encrypter, UnencryptedCard};

mod validation;

pub use self::validation::{reasons, ExpiryDate};
use self::validation::{
    validate_card_number, validate_expiry_date, validate_holder_name, validate_security_code,
};

const DEFAULT_SUPPORTED_BRANDS: [CardBrand; 4] = [
    CardBrand::Visa,
    CardBrand::Mastercard,
    CardBrand::Amex,
    CardBrand::Maestro,
];

/// Card specific configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardConfiguration {
    /// Holder name has to be filled in
    pub is_holder_name_required: bool,
    /// Accepted brands, empty to use the brands of the payment method
    pub supported_brands: Vec<CardBrand>,
}

/// Shopper input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardInputData {
    /// Card number, spaces allowed
    pub card_number: String,
    /// `MM/YY` or `MM/YYYY`
    pub expiry_date: String,
    /// CVC or CID
    pub security_code: String,
    /// Card holder
    pub holder_name: String,
    /// Shopper wants the card stored
    pub is_storage_selected: bool,
}

/// Validated card input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardOutputData {
    /// Card number without spaces
    pub card_number: FieldState<String>,
    /// Parsed expiry date
    pub expiry_date: FieldState<Option<ExpiryDate>>,
    /// Security code, empty when hidden
    pub security_code: FieldState<String>,
    /// Card holder
    pub holder_name: FieldState<String>,
    /// Brands matching the number, reliable ones come from the bin lookup
    pub detected_card_types: Vec<DetectedCardType>,
    /// Security code policy of the detected brand
    pub cvc_policy: FieldPolicy,
    /// Expiry date policy of the detected brand
    pub expiry_date_policy: FieldPolicy,
    /// Shopper wants the card stored
    pub is_storage_selected: bool,
}

impl CardOutputData {
    /// Every field is valid
    pub fn is_valid(&self) -> bool {
        self.card_number.is_valid()
            && self.expiry_date.is_valid()
            && self.security_code.is_valid()
            && self.holder_name.is_valid()
    }

    /// Brand the payment is made with
    pub fn selected_card_type(&self) -> Option<&DetectedCardType> {
        self.detected_card_types
            .iter()
            .find(|card_type| card_type.is_supported)
    }
}

/// State of the card component
pub type CardComponentState = PaymentComponentState<CardPaymentMethod>;

fn prefix_in(number: &str, length: usize, range: std::ops::RangeInclusive<u32>) -> bool {
    number
        .get(..length)
        .and_then(|prefix| prefix.parse::<u32>().ok())
        .is_some_and(|prefix| range.contains(&prefix))
}

fn detect_brand_locally(number: &str) -> Option<CardBrand> {
    if number.starts_with("6703") {
        Some(CardBrand::Bcmc)
    } else if number.starts_with('4') {
        Some(CardBrand::Visa)
    } else if prefix_in(number, 2, 51..=55) || prefix_in(number, 4, 2221..=2720) {
        Some(CardBrand::Mastercard)
    } else if number.starts_with("34") || number.starts_with("37") {
        Some(CardBrand::Amex)
    } else if number.starts_with("50") || prefix_in(number, 2, 56..=69) {
        Some(CardBrand::Maestro)
    } else {
        None
    }
}

/// Card reducer
#[derive(Debug)]
pub struct CardReducer {
    bin_lookup: Arc<BinLookupRepository>,
    supported_brands: Vec<CardBrand>,
    is_holder_name_required: bool,
    default_cvc_policy: FieldPolicy,
}

impl CardReducer {
    /// Create new [`CardReducer`]
    pub fn new(
        bin_lookup: Arc<BinLookupRepository>,
        configuration: CardConfiguration,
        payment_method: &PaymentMethod,
    ) -> Self {
        let supported_brands = if !configuration.supported_brands.is_empty() {
            configuration.supported_brands
        } else if !payment_method.brands.is_empty() {
            payment_method
                .brands
                .iter()
                .map(|brand| CardBrand::from_tx_variant(brand))
                .collect()
        } else if payment_method.type_or_unknown() == types::BCMC {
            vec![CardBrand::Bcmc, CardBrand::Maestro, CardBrand::Visa]
        } else {
            DEFAULT_SUPPORTED_BRANDS.to_vec()
        };

        // Bancontact cards have no security code
        let default_cvc_policy = if payment_method.type_or_unknown() == types::BCMC {
            FieldPolicy::Hidden
        } else {
            FieldPolicy::Required
        };

        Self {
            bin_lookup,
            supported_brands,
            is_holder_name_required: configuration.is_holder_name_required,
            default_cvc_policy,
        }
    }

    /// Brands accepted by the component
    pub fn supported_brands(&self) -> &[CardBrand] {
        &self.supported_brands
    }

    /// Bin lookup cache the reducer reads from
    pub fn bin_lookup(&self) -> &Arc<BinLookupRepository> {
        &self.bin_lookup
    }

    fn detect_card_types(&self, number: &str) -> Vec<DetectedCardType> {
        if let Some(detected) = self.bin_lookup.get(number) {
            if !detected.is_empty() {
                return detected;
            }
        }

        detect_brand_locally(number)
            .map(|card_brand| DetectedCardType {
                is_supported: self.supported_brands.contains(&card_brand),
                card_brand,
                is_reliable: false,
                enable_luhn_check: true,
                cvc_policy: self.default_cvc_policy,
                expiry_date_policy: FieldPolicy::Required,
            })
            .into_iter()
            .collect()
    }
}

impl ComponentReducer for CardReducer {
    type Input = CardInputData;
    type Output = CardOutputData;
    type State = CardComponentState;

    const PAYMENT_METHOD_TYPES: &'static [&'static str] = &[types::SCHEME, types::BCMC];

    fn create_output_data(&self, input: &CardInputData) -> CardOutputData {
        let number: String = input
            .card_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let detected_card_types = self.detect_card_types(&number);

        let reliable = detected_card_types
            .iter()
            .find(|card_type| card_type.is_reliable);
        let cvc_policy = reliable
            .map(|card_type| card_type.cvc_policy)
            .unwrap_or(self.default_cvc_policy);
        let expiry_date_policy = reliable
            .map(|card_type| card_type.expiry_date_policy)
            .unwrap_or_default();
        let brand = detected_card_types
            .first()
            .map(|card_type| &card_type.card_brand);

        let today = OffsetDateTime::now_utc().date();

        CardOutputData {
            card_number: validate_card_number(&number, &detected_card_types),
            expiry_date: validate_expiry_date(&input.expiry_date, expiry_date_policy, today),
            security_code: validate_security_code(&input.security_code, cvc_policy, brand),
            holder_name: validate_holder_name(&input.holder_name, self.is_holder_name_required),
            cvc_policy,
            expiry_date_policy,
            is_storage_selected: input.is_storage_selected,
            detected_card_types,
        }
    }

    fn create_component_state(
        &self,
        output: &CardOutputData,
        context: &StateContext<'_>,
    ) -> Result<CardComponentState, EncryptionError> {
        if !output.is_valid() || !context.is_ready {
            return Ok(CardComponentState::new(
                context.base_component_data(),
                output.is_valid(),
                context.is_ready,
            ));
        }

        let expiry_date = output.expiry_date.value;
        let security_code = &output.security_code.value;
        let card = UnencryptedCard {
            number: output.card_number.value.clone(),
            expiry_month: expiry_date.map(|date| date.month_string()),
            expiry_year: expiry_date.map(|date| date.year_string()),
            cvc: (!security_code.is_empty()).then(|| security_code.clone()),
        };
        let encrypted = context
            .encrypter
            .encrypt_card(&card, context.require_public_key()?)?;

        let holder_name = &output.holder_name.value;
        let mut data = context.component_data(CardPaymentMethod {
            payment_method_type: context.payment_method_type(),
            checkout_attempt_id: context.checkout_attempt_id.clone(),
            encrypted_card_number: encrypted.encrypted_card_number,
            encrypted_expiry_month: encrypted.encrypted_expiry_month,
            encrypted_expiry_year: encrypted.encrypted_expiry_year,
            encrypted_security_code: encrypted.encrypted_security_code,
            holder_name: (!holder_name.is_empty()).then(|| holder_name.clone()),
            brand: output
                .selected_card_type()
                .map(|card_type| card_type.card_brand.tx_variant().to_string()),
        });
        data.store_payment_method = context
            .params
            .is_store_payment_field_visible
            .then_some(output.is_storage_selected);

        Ok(CardComponentState::new(data, true, true))
    }

    fn encryption_failed_state(&self, _context: &StateContext<'_>) -> CardComponentState {
        CardComponentState::empty(false, true)
    }
}

/// Card delegate
#[derive(Debug, Clone)]
pub struct CardDelegate {
    core: DelegateCore<CardReducer>,
}

impl CardDelegate {
    /// Create new [`CardDelegate`]
    pub fn new(
        payment_method: PaymentMethod,
        params: ComponentParams,
        configuration: CardConfiguration,
        connector: Arc<dyn CheckoutConnector>,
        encrypter: Arc<dyn Encrypter>,
    ) -> Result<Self, Error> {
        let bin_lookup = Arc::new(BinLookupRepository::new(
            Arc::clone(&connector),
            Arc::clone(&encrypter),
            params.client_key.clone(),
        ));
        let reducer = CardReducer::new(bin_lookup, configuration, &payment_method);

        Ok(Self {
            core: DelegateCore::new(reducer, payment_method, params, connector, encrypter)?,
        })
    }

    /// Start a bin lookup for the current number unless it was looked up already
    ///
    /// Needs the public key and an initialized component, the output is refreshed once the lookup
    /// finished.
    fn lookup_bin(&self) {
        let number = self.core.output_data().card_number.value;
        let bin_lookup = Arc::clone(self.core.reducer().bin_lookup());

        if !BinLookupRepository::is_required_size(&number)
            || !number.chars().all(|c| c.is_ascii_digit())
            || bin_lookup.contains(&number)
        {
            return;
        }

        let (Some(public_key), Some(scope)) = (self.core.public_key(), self.core.scope()) else {
            return;
        };

        let core = self.core.clone();
        scope.spawn(async move {
            let supported_brands = core.reducer().supported_brands().to_vec();
            bin_lookup
                .fetch(&number, &public_key, &supported_brands)
                .await;
            core.refresh();
        });
    }
}

impl PaymentComponentDelegate for CardDelegate {
    type Reducer = CardReducer;

    fn core(&self) -> &DelegateCore<CardReducer> {
        &self.core
    }

    fn update_input_data<F>(&self, update: F)
    where
        F: FnOnce(&mut InputOf<Self>),
    {
        self.core.update_input_data(update);
        self.lookup_bin();
    }
}

#[cfg(test)]
mod tests {
    use checkout_common::bin_lookup::{BinLookupResponse, BrandResponse};
    use checkout_common::ComponentState;

    use super::*;
    use crate::scope::ComponentScope;
    use crate::test_utils::{test_params, wait_for, MockConnector, TestEncrypter};

    fn expiry_date() -> String {
        format!("12/{}", OffsetDateTime::now_utc().year() + 2)
    }

    fn create_delegate(
        payment_method_type: &str,
        configuration: CardConfiguration,
        connector: Arc<MockConnector>,
    ) -> Result<CardDelegate, Error> {
        CardDelegate::new(
            PaymentMethod::new(payment_method_type),
            test_params(),
            configuration,
            connector,
            Arc::new(TestEncrypter::new()),
        )
    }

    async fn ready_delegate(connector: Arc<MockConnector>) -> CardDelegate {
        let delegate = create_delegate(types::SCHEME, CardConfiguration::default(), connector)
            .expect("scheme is supported");
        delegate.initialize(&ComponentScope::new());
        assert!(wait_for(|| delegate.component_state().is_ready).await);
        delegate
    }

    #[test]
    fn test_supported_types() {
        let connector = Arc::new(MockConnector::new());
        assert!(create_delegate(types::SCHEME, CardConfiguration::default(), connector.clone()).is_ok());
        assert!(create_delegate(types::BCMC, CardConfiguration::default(), connector.clone()).is_ok());
        assert!(matches!(
            create_delegate(types::ACH, CardConfiguration::default(), connector),
            Err(Error::UnsupportedPaymentMethod(_))
        ));
    }

    #[test]
    fn test_local_brand_detection() {
        assert_eq!(detect_brand_locally("4111"), Some(CardBrand::Visa));
        assert_eq!(detect_brand_locally("5454"), Some(CardBrand::Mastercard));
        assert_eq!(detect_brand_locally("2221"), Some(CardBrand::Mastercard));
        assert_eq!(detect_brand_locally("3714"), Some(CardBrand::Amex));
        assert_eq!(detect_brand_locally("6703"), Some(CardBrand::Bcmc));
        assert_eq!(detect_brand_locally("9999"), None);
    }

    #[tokio::test]
    async fn test_valid_card_state() {
        let delegate = ready_delegate(Arc::new(MockConnector::with_public_key())).await;

        delegate.update_input_data(|input| {
            input.card_number = "4111 1111 1111 1111".to_string();
            input.expiry_date = expiry_date();
            input.security_code = "737".to_string();
        });

        let state = delegate.component_state();
        assert!(state.is_valid());

        let year = OffsetDateTime::now_utc().year() + 2;
        let payment_method = state.data.payment_method.expect("payment method present");
        assert_eq!(
            payment_method.encrypted_card_number,
            "encrypted:number:4111111111111111"
        );
        assert_eq!(
            payment_method.encrypted_expiry_month.as_deref(),
            Some("encrypted:expiryMonth:12")
        );
        assert_eq!(
            payment_method.encrypted_expiry_year,
            Some(format!("encrypted:expiryYear:{year}"))
        );
        assert_eq!(
            payment_method.encrypted_security_code.as_deref(),
            Some("encrypted:cvc:737")
        );
        assert_eq!(payment_method.brand.as_deref(), Some("visa"));
        assert_eq!(payment_method.holder_name, None);
    }

    #[tokio::test]
    async fn test_bin_lookup_hides_security_code() {
        let connector = Arc::new(MockConnector::with_public_key());
        connector.set_bin_lookup_response(Ok(BinLookupResponse {
            brands: Some(vec![BrandResponse {
                brand: Some("mc".to_string()),
                cvc_policy: Some("hidden".to_string()),
                enable_luhn_check: Some(true),
                supported: Some(true),
                ..Default::default()
            }]),
            request_id: None,
        }));
        let delegate = ready_delegate(connector.clone()).await;

        delegate.update_input_data(|input| {
            input.card_number = "5454545454545454".to_string();
            input.expiry_date = expiry_date();
        });

        assert!(
            wait_for(|| delegate
                .output_data()
                .detected_card_types
                .first()
                .is_some_and(|card_type| card_type.is_reliable))
            .await
        );
        assert_eq!(connector.calls("post_bin_lookup"), 1);

        let output = delegate.output_data();
        assert_eq!(output.cvc_policy, FieldPolicy::Hidden);
        assert!(output.is_valid());

        let payment_method = delegate
            .component_state()
            .data
            .payment_method
            .expect("payment method present");
        assert_eq!(payment_method.encrypted_security_code, None);
        assert_eq!(payment_method.brand.as_deref(), Some("mc"));

        delegate.update_input_data(|input| input.security_code = "1".to_string());
        tokio::task::yield_now().await;
        assert_eq!(connector.calls("post_bin_lookup"), 1);
    }

    #[tokio::test]
    async fn test_holder_name_required() {
        let delegate = create_delegate(
            types::SCHEME,
            CardConfiguration {
                is_holder_name_required: true,
                ..Default::default()
            },
            Arc::new(MockConnector::new()),
        )
        .expect("scheme is supported");

        delegate.update_input_data(|input| {
            input.card_number = "4111111111111111".to_string();
            input.expiry_date = expiry_date();
            input.security_code = "737".to_string();
        });
        assert_eq!(
            delegate.output_data().holder_name.validation.reason(),
            Some(reasons::HOLDER_NAME_INVALID)
        );

        delegate.update_input_data(|input| input.holder_name = "J. Smith".to_string());
        assert!(delegate.output_data().is_valid());
    }

    #[tokio::test]
    async fn test_unsupported_local_brand_is_not_selected() {
        let delegate = create_delegate(
            types::SCHEME,
            CardConfiguration {
                supported_brands: vec![CardBrand::Visa],
                ..Default::default()
            },
            Arc::new(MockConnector::new()),
        )
        .expect("scheme is supported");

        delegate.update_input_data(|input| input.card_number = "5454545454545454".to_string());

        let output = delegate.output_data();
        assert!(output.card_number.is_valid());
        assert!(output.selected_card_type().is_none());
    }
}
