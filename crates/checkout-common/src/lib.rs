//! Checkout shared types and traits.
//!
//! This crate is the base foundation for the checkout components crates. It contains the wire
//! models exchanged with the checkout API, the validation primitives used by every payment method
//! and the error type shared across the internal crates.

pub mod action;
pub mod address;
pub mod amount;
pub mod analytics;
pub mod bin_lookup;
pub mod environment;
pub mod error;
pub mod giftcard;
pub mod kvstore;
pub mod payment;
pub mod payment_method;
pub mod session;
pub mod status;
pub mod validation;

pub use self::action::{Action, ActionComponentData};
pub use self::address::{Address, AddressConfiguration, AddressInput, AddressOutputData};
pub use self::amount::Amount;
pub use self::environment::Environment;
pub use self::error::{EncryptionError, Error, ErrorResponse, GiftCardError};
pub use self::giftcard::{BalanceResult, GiftCardAction, GiftCardBalanceStatus};
pub use self::kvstore::{KVStore, MemoryKVStore};
pub use self::payment::{
    ComponentState, OrderRequest, OrderResponse, PaymentComponentData, PaymentComponentState,
};
pub use self::payment_method::PaymentMethod;
pub use self::session::{SessionModel, SessionPaymentResult};
pub use self::status::{StatusRequest, StatusResponse};
pub use self::validation::{FieldState, Validation};

// re-exporting external crates
pub use parking_lot;
