//! API credentials, resolved once at process start.

use super::Settings;
use crate::error::{CandlelightError, Result};
use std::fmt;

/// Connection details for one OpenAI-compatible service.
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_base: Option<String>,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Credentials for the embedding and generation services.
///
/// Built from the environment in `main` and passed by reference to whatever
/// needs to talk to a remote service. A missing key only fails the
/// operations that call that service.
#[derive(Debug, Clone)]
pub struct Credentials {
    embedding: ServiceKey,
    llm: ServiceKey,
}

#[derive(Debug, Clone)]
struct ServiceKey {
    env_var: String,
    credentials: Option<ApiCredentials>,
}

impl ServiceKey {
    fn get(&self) -> Result<&ApiCredentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| CandlelightError::MissingCredential(self.env_var.clone()))
    }
}

impl Credentials {
    /// Resolve credentials from the process environment.
    pub fn from_env(settings: &Settings) -> Self {
        Self::resolve(settings, |name| std::env::var(name).ok())
    }

    /// Resolve credentials with a custom variable lookup.
    pub fn resolve<F>(settings: &Settings, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = |env_var: &str, api_base: &Option<String>| ServiceKey {
            env_var: env_var.to_string(),
            credentials: lookup(env_var)
                .filter(|key| !key.trim().is_empty())
                .map(|api_key| ApiCredentials {
                    api_key,
                    api_base: api_base.clone(),
                }),
        };

        Self {
            embedding: key(&settings.embedding.api_key_env, &settings.embedding.api_base),
            llm: key(&settings.llm.api_key_env, &settings.llm.api_base),
        }
    }

    /// Credentials for the embedding service.
    pub fn embedding(&self) -> Result<&ApiCredentials> {
        self.embedding.get()
    }

    /// Credentials for the chat model.
    pub fn llm(&self) -> Result<&ApiCredentials> {
        self.llm.get()
    }
}
