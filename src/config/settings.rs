//! Provider settings snapshot.

use super::source::ConfigSource;
use crate::{Error, ErrorContext, Result};
use std::env;
use std::time::Duration;

/// Setting keys read and written by the core.
pub mod keys {
    /// Name of the active provider.
    pub const LLM_PROVIDER: &str = "LLMProvider";
    pub const SERVER_URL: &str = "providerServerURL";
    pub const AUTH_TOKEN: &str = "authToken";
    pub const PROJECT_ID: &str = "projectId";
    /// Selected model display name (written by model selection).
    pub const MODEL_NAME: &str = "modelName";
    /// Uid of the integration owning the selected model (written by model selection).
    pub const INTEGRATION_UID: &str = "integrationUid";
    /// Config name of the integration owning the selected model (written by model selection).
    pub const MODEL_GROUP_NAME: &str = "modelGroupName";
    pub const TEMPERATURE: &str = "temperature";
    pub const MAX_TOKENS: &str = "maxTokens";
    pub const API_KEY: &str = "apiKey";
    pub const API_BASE: &str = "apiBase";
    pub const DISPLAY_TYPE: &str = "displayType";
}

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Everything a provider factory may need, read once per instantiation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSettings {
    pub server_url: Option<String>,
    pub auth_token: Option<String>,
    pub project_id: Option<String>,
    pub model_name: Option<String>,
    pub integration_uid: Option<String>,
    pub model_group_name: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub display_type: Option<String>,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub async fn load(config: &dyn ConfigSource) -> Result<Self> {
        Ok(Self {
            server_url: config.get_string(keys::SERVER_URL).await?,
            auth_token: config.get_string(keys::AUTH_TOKEN).await?,
            project_id: config.get_string(keys::PROJECT_ID).await?,
            model_name: config.get_string(keys::MODEL_NAME).await?,
            integration_uid: config.get_string(keys::INTEGRATION_UID).await?,
            model_group_name: config.get_string(keys::MODEL_GROUP_NAME).await?,
            temperature: parse_number(config, keys::TEMPERATURE).await?,
            max_tokens: parse_number(config, keys::MAX_TOKENS).await?,
            api_key: config.get_string(keys::API_KEY).await?,
            api_base: config.get_string(keys::API_BASE).await?,
            display_type: config.get_string(keys::DISPLAY_TYPE).await?,
            timeout: timeout_from_env(),
        })
    }

    /// Fetch a required setting or fail with a configuration error naming the key.
    pub fn require<'a>(
        value: &'a Option<String>,
        key: &str,
        source: &str,
    ) -> Result<&'a str> {
        value.as_deref().ok_or_else(|| {
            Error::configuration_with_context(
                format!("'{}' must be set", key),
                ErrorContext::new().with_field_path(key).with_source(source),
            )
        })
    }
}

async fn parse_number<T: std::str::FromStr>(
    config: &dyn ConfigSource,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = config.get_string(key).await? else {
        return Ok(None);
    };
    raw.parse::<T>().map(Some).map_err(|_| {
        Error::configuration_with_context(
            format!("'{}' is not a valid number", key),
            ErrorContext::new().with_field_path(key).with_details(raw),
        )
    })
}

fn timeout_from_env() -> Duration {
    let secs = env::var("PROVIDER_HUB_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}
