//! Card brand detection through the bin lookup endpoint

use std::collections::HashMap;
use std::sync::Arc;

use checkout_common::bin_lookup::{
    BinLookupRequest, BinLookupResponse, CardBrand, DetectedCardType, FieldPolicy,
};
use checkout_common::parking_lot::RwLock;
use checkout_common::Error;
use sha2::{Digest, Sha256};
use tracing::instrument;
use uuid::Uuid;

use crate::connector::CheckoutConnector;
use crate::encryption::Encrypter;

/// Number of leading digits sent to the bin lookup
pub const REQUIRED_BIN_SIZE: usize = 11;

/// Cached bin lookups
///
/// Results are cached per BIN for the lifetime of the repository. Failed lookups are cached as
/// an empty list.
#[derive(Debug)]
pub struct BinLookupRepository {
    connector: Arc<dyn CheckoutConnector>,
    encrypter: Arc<dyn Encrypter>,
    client_key: String,
    cache: RwLock<HashMap<String, Vec<DetectedCardType>>>,
}

impl BinLookupRepository {
    /// Create new [`BinLookupRepository`]
    pub fn new(
        connector: Arc<dyn CheckoutConnector>,
        encrypter: Arc<dyn Encrypter>,
        client_key: impl Into<String>,
    ) -> Self {
        Self {
            connector,
            encrypter,
            client_key: client_key.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Whether `card_number` has enough digits for a lookup
    pub fn is_required_size(card_number: &str) -> bool {
        card_number.len() >= REQUIRED_BIN_SIZE
    }

    /// Whether the BIN of `card_number` was looked up already
    pub fn contains(&self, card_number: &str) -> bool {
        Self::is_required_size(card_number) && self.cache.read().contains_key(&hash_bin(card_number))
    }

    /// Cached result for the BIN of `card_number`
    pub fn get(&self, card_number: &str) -> Option<Vec<DetectedCardType>> {
        if !Self::is_required_size(card_number) {
            return None;
        }

        self.cache.read().get(&hash_bin(card_number)).cloned()
    }

    /// Look up the BIN of `card_number` and cache the result
    ///
    /// Never fails, an unusable response or a failed call yields an empty list.
    #[instrument(skip_all)]
    pub async fn fetch(
        &self,
        card_number: &str,
        public_key: &str,
        supported_brands: &[CardBrand],
    ) -> Vec<DetectedCardType> {
        let response = match self
            .make_bin_lookup(card_number, public_key, supported_brands)
            .await
        {
            Ok(response) => Some(response),
            Err(err) => {
                tracing::error!("Bin lookup failed: {}", err);
                None
            }
        };

        let detected = map_response(response);
        self.cache
            .write()
            .insert(hash_bin(card_number), detected.clone());
        detected
    }

    async fn make_bin_lookup(
        &self,
        card_number: &str,
        public_key: &str,
        supported_brands: &[CardBrand],
    ) -> Result<BinLookupResponse, Error> {
        let bin = bin_of(card_number);
        let encrypted_bin = self.encrypter.encrypt_bin(bin, public_key)?;

        let request = BinLookupRequest {
            encrypted_bin,
            request_id: Uuid::new_v4().to_string(),
            supported_card_types: supported_brands
                .iter()
                .map(|brand| brand.tx_variant().to_string())
                .collect(),
        };

        self.connector
            .post_bin_lookup(&self.client_key, request)
            .await
    }
}

fn bin_of(card_number: &str) -> &str {
    card_number.get(..REQUIRED_BIN_SIZE).unwrap_or(card_number)
}

fn hash_bin(card_number: &str) -> String {
    format!("{:x}", Sha256::digest(bin_of(card_number).as_bytes()))
}

fn map_response(response: Option<BinLookupResponse>) -> Vec<DetectedCardType> {
    tracing::debug!("Bin lookup brands: {:?}", response.as_ref().map(|r| &r.brands));

    response
        .and_then(|response| response.brands)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|brand| {
            let tx_variant = brand.brand?;
            Some(DetectedCardType {
                card_brand: CardBrand::from_tx_variant(&tx_variant),
                is_reliable: true,
                enable_luhn_check: brand.enable_luhn_check == Some(true),
                cvc_policy: brand
                    .cvc_policy
                    .as_deref()
                    .map(FieldPolicy::parse)
                    .unwrap_or_default(),
                expiry_date_policy: brand
                    .expiry_date_policy
                    .as_deref()
                    .map(FieldPolicy::parse)
                    .unwrap_or_default(),
                is_supported: brand.supported != Some(false),
            })
        })
        .collect()
}
