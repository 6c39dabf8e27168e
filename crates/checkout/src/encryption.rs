//! Client side encryption collaborator
//!
//! Components never encrypt on their own: hosts inject an [`Encrypter`] backed by their CSE
//! library and components call it with the public key fetched on `initialize`.

use std::fmt::Debug;

use checkout_common::EncryptionError;

/// Field names passed to [`Encrypter::encrypt_field`]
pub mod fields {
    /// Bank account number
    pub const BANK_ACCOUNT_NUMBER: &str = "bankAccountNumber";
    /// Bank location id / routing number
    pub const BANK_LOCATION_ID: &str = "bankLocationId";
    /// Card or gift card number
    pub const NUMBER: &str = "number";
    /// Card expiry month
    pub const EXPIRY_MONTH: &str = "expiryMonth";
    /// Card expiry year
    pub const EXPIRY_YEAR: &str = "expiryYear";
    /// Card security code or gift card PIN
    pub const CVC: &str = "cvc";
    /// Card bin
    pub const BIN_VALUE: &str = "binValue";
}

/// Card fields before encryption
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnencryptedCard {
    /// Card number
    pub number: String,
    /// Expiry month, `MM`
    pub expiry_month: Option<String>,
    /// Expiry year, `YYYY`
    pub expiry_year: Option<String>,
    /// Security code
    pub cvc: Option<String>,
}

/// Card fields after encryption
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptedCard {
    /// Encrypted card number
    pub encrypted_card_number: String,
    /// Encrypted expiry month
    pub encrypted_expiry_month: Option<String>,
    /// Encrypted expiry year
    pub encrypted_expiry_year: Option<String>,
    /// Encrypted security code
    pub encrypted_security_code: Option<String>,
}

/// Encrypts sensitive fields with the merchant public key
pub trait Encrypter: Debug + Send + Sync {
    /// Encrypt a single named field
    fn encrypt_field(
        &self,
        field: &str,
        value: &str,
        public_key: &str,
    ) -> Result<String, EncryptionError>;

    /// Encrypt every present card field
    fn encrypt_card(
        &self,
        card: &UnencryptedCard,
        public_key: &str,
    ) -> Result<EncryptedCard, EncryptionError> {
        let encrypt_optional = |field: &str, value: &Option<String>| {
            value
                .as_deref()
                .map(|value| self.encrypt_field(field, value, public_key))
                .transpose()
        };

        Ok(EncryptedCard {
            encrypted_card_number: self.encrypt_field(fields::NUMBER, &card.number, public_key)?,
            encrypted_expiry_month: encrypt_optional(fields::EXPIRY_MONTH, &card.expiry_month)?,
            encrypted_expiry_year: encrypt_optional(fields::EXPIRY_YEAR, &card.expiry_year)?,
            encrypted_security_code: encrypt_optional(fields::CVC, &card.cvc)?,
        })
    }

    /// Encrypt a card bin for bin lookup
    fn encrypt_bin(&self, bin: &str, public_key: &str) -> Result<String, EncryptionError> {
        self.encrypt_field(fields::BIN_VALUE, bin, public_key)
    }
}
