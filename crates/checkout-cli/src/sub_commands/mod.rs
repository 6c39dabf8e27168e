use std::sync::Arc;

use anyhow::{bail, Result};
use checkout::HttpClient;

use crate::config::Settings;

pub mod poll_status;
pub mod session_setup;
pub mod validate;

pub(crate) fn connector(settings: &Settings) -> Result<Arc<HttpClient>> {
    if settings.client_key.is_empty() {
        bail!("client key is not set, use CHECKOUT_CLIENT_KEY or the settings file");
    }

    Ok(Arc::new(HttpClient::new(settings.environment.clone())?))
}
