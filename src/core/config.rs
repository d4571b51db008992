use std::env;

use async_openai::config::OpenAIConfig;

use crate::core::api_key;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_config: OpenAIConfig,
    pub model_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPENROUTER_API_KEY is not set (export it or run `prompt-booster config set-api-key`)")]
    MissingApiKey,
}

/// Where the API key was found, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    ConfigFile,
}

impl KeySource {
    pub fn label(self) -> &'static str {
        match self {
            KeySource::Environment => "from OPENROUTER_API_KEY",
            KeySource::ConfigFile => "from config file",
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the API key: environment first, then the stored key file.
pub fn resolve_api_key() -> Option<(String, KeySource)> {
    if let Some(key) = non_empty_var("OPENROUTER_API_KEY") {
        return Some((key, KeySource::Environment));
    }
    api_key::load_api_key().map(|key| (key, KeySource::ConfigFile))
}

/// Model ID from `OPENROUTER_MODEL`, or the default.
pub fn model_id() -> String {
    non_empty_var("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// Base URL from `OPENROUTER_BASE_URL`, or the default.
pub fn base_url() -> String {
    non_empty_var("OPENROUTER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Load configuration from environment. Returns an error if no API key is available.
pub fn load() -> Result<Config, ConfigError> {
    let (api_key, source) = resolve_api_key().ok_or(ConfigError::MissingApiKey)?;
    let base_url = base_url();
    log::debug!("Using API key {} against {}", source.label(), base_url);

    let openai_config = OpenAIConfig::new()
        .with_api_base(base_url)
        .with_api_key(api_key);

    Ok(Config {
        openai_config,
        model_id: model_id(),
    })
}
