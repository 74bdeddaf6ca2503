//! OpenAI-compatible client configuration.

use crate::config::ApiCredentials;
use crate::error::{CandlelightError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for the given service with a custom timeout.
///
/// `api_base` lets the same client talk to any OpenAI-compatible endpoint.
pub fn create_client_with_timeout(
    credentials: &ApiCredentials,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut config = OpenAIConfig::new().with_api_key(credentials.api_key.clone());
    if let Some(base) = &credentials.api_base {
        let base = base.trim_end_matches('/');
        if base.is_empty() {
            return Err(CandlelightError::Config("api_base must not be empty".to_string()));
        }
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
