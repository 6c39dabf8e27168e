//! Checkout payment components core
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod ach;
pub mod address;
pub mod bacs;
pub mod bin_lookup;
pub mod blik;
pub mod card;
pub mod component;
pub mod connector;
pub mod encryption;
pub mod giftcard;
pub mod observable;
pub mod payment_data;
pub mod scope;
pub mod sessions;
pub mod status;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

/// Re-export common types
#[doc(hidden)]
pub use checkout_common::{
    error::{self, Error},
    Action, ActionComponentData, Amount, Environment, OrderRequest, OrderResponse,
    PaymentComponentData, PaymentComponentState, PaymentMethod, SessionModel,
};

#[doc(hidden)]
pub use self::component::{ComponentParams, PaymentComponentDelegate};
#[doc(hidden)]
pub use self::connector::{CheckoutConnector, HttpClient};
#[doc(hidden)]
pub use self::encryption::Encrypter;
#[doc(hidden)]
pub use self::scope::ComponentScope;
#[doc(hidden)]
pub use self::status::{PollingPolicy, StatusRepository};

/// Re-export futures::Stream
pub use futures::{Stream, StreamExt};
