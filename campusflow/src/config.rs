//! Runtime configuration with `CAMPUSFLOW_*` environment overrides.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use campusflow::CampusConfig;
//! use cprovider::ProviderId;
//!
//! let config = CampusConfig::from_lookup(|key| match key {
//!     "CAMPUSFLOW_PROVIDER" => Some("openai".to_string()),
//!     "CAMPUSFLOW_MODEL_TIMEOUT_SECS" => Some("30".to_string()),
//!     _ => None,
//! })
//! .expect("config should parse");
//!
//! assert_eq!(config.provider, ProviderId::OpenAi);
//! assert_eq!(config.model, "gpt-4o-mini");
//! assert_eq!(config.model_timeout, Duration::from_secs(30));
//! ```

use std::time::Duration;

use cflow::{DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_MODEL_TIMEOUT};
use cprovider::ProviderId;

use crate::CampusError;

pub const ENV_PROVIDER: &str = "CAMPUSFLOW_PROVIDER";
pub const ENV_API_KEY: &str = "CAMPUSFLOW_API_KEY";
pub const ENV_MODEL: &str = "CAMPUSFLOW_MODEL";
pub const ENV_BASE_URL: &str = "CAMPUSFLOW_BASE_URL";
pub const ENV_MODEL_TIMEOUT_SECS: &str = "CAMPUSFLOW_MODEL_TIMEOUT_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "CAMPUSFLOW_HTTP_TIMEOUT_SECS";
pub const ENV_MAX_TOOL_ROUNDS: &str = "CAMPUSFLOW_MAX_TOOL_ROUNDS";

#[derive(Clone, PartialEq, Eq)]
pub struct CampusConfig {
    pub provider: ProviderId,
    pub api_key: Option<String>,
    pub model: String,
    /// Overrides the provider's default endpoint.
    pub base_url: Option<String>,
    /// Upper bound on one model round trip, retries included.
    pub model_timeout: Duration,
    /// Per-request timeout on the HTTP client.
    pub http_timeout: Duration,
    pub max_tool_rounds: u32,
}

impl Default for CampusConfig {
    fn default() -> Self {
        Self {
            provider: ProviderId::Gemini,
            api_key: None,
            model: default_model(ProviderId::Gemini).to_string(),
            base_url: None,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
            http_timeout: Duration::from_secs(90),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

impl CampusConfig {
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            model: default_model(provider).to_string(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn from_env() -> Result<Self, CampusError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CampusError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = match read(ENV_PROVIDER) {
            Some(value) => {
                let provider = ProviderId::parse(&value).ok_or_else(|| {
                    CampusError::configuration(format!(
                        "{ENV_PROVIDER} must be one of openai, gemini, compatible; got '{value}'"
                    ))
                })?;
                Self::new(provider)
            }
            None => Self::default(),
        };

        if let Some(api_key) = read(ENV_API_KEY) {
            config.api_key = Some(api_key);
        }
        if let Some(model) = read(ENV_MODEL) {
            config.model = model;
        }
        if let Some(base_url) = read(ENV_BASE_URL) {
            config.base_url = Some(base_url);
        }
        if let Some(value) = read(ENV_MODEL_TIMEOUT_SECS) {
            config.model_timeout = Duration::from_secs(positive(ENV_MODEL_TIMEOUT_SECS, &value)?);
        }
        if let Some(value) = read(ENV_HTTP_TIMEOUT_SECS) {
            config.http_timeout = Duration::from_secs(positive(ENV_HTTP_TIMEOUT_SECS, &value)?);
        }
        if let Some(value) = read(ENV_MAX_TOOL_ROUNDS) {
            let rounds = positive(ENV_MAX_TOOL_ROUNDS, &value)?;
            config.max_tool_rounds = u32::try_from(rounds).map_err(|_| {
                CampusError::configuration(format!("{ENV_MAX_TOOL_ROUNDS} is too large: {rounds}"))
            })?;
        }

        Ok(config)
    }
}

impl std::fmt::Debug for CampusConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CampusConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("model_timeout", &self.model_timeout)
            .field("http_timeout", &self.http_timeout)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish()
    }
}

pub fn default_model(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::OpenAi => "gpt-4o-mini",
        ProviderId::Gemini => "gemini-2.0-flash",
        ProviderId::Compatible => "",
    }
}

fn positive(key: &str, value: &str) -> Result<u64, CampusError> {
    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(CampusError::configuration(format!(
            "{key} must be a positive integer; got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::CampusErrorKind;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| values.get(key).cloned()
    }

    #[test]
    fn defaults_target_gemini_with_flow_defaults() {
        let config = CampusConfig::from_lookup(lookup(&[])).expect("empty lookup should parse");

        assert_eq!(config, CampusConfig::default());
        assert_eq!(config.provider, ProviderId::Gemini);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.model_timeout, Duration::from_secs(60));
        assert_eq!(config.max_tool_rounds, 5);
    }

    #[test]
    fn environment_overrides_every_setting() {
        let config = CampusConfig::from_lookup(lookup(&[
            (ENV_PROVIDER, "compatible"),
            (ENV_API_KEY, " local-key "),
            (ENV_MODEL, "llama3"),
            (ENV_BASE_URL, "http://localhost:11434/v1"),
            (ENV_MODEL_TIMEOUT_SECS, "15"),
            (ENV_HTTP_TIMEOUT_SECS, "20"),
            (ENV_MAX_TOOL_ROUNDS, "3"),
        ]))
        .expect("config should parse");

        assert_eq!(config.provider, ProviderId::Compatible);
        assert_eq!(config.api_key.as_deref(), Some("local-key"));
        assert_eq!(config.model, "llama3");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(config.model_timeout, Duration::from_secs(15));
        assert_eq!(config.http_timeout, Duration::from_secs(20));
        assert_eq!(config.max_tool_rounds, 3);
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = CampusConfig::from_lookup(lookup(&[(ENV_MODEL, "  "), (ENV_API_KEY, "")]))
            .expect("blank values should be ignored");

        assert_eq!(config.model, "gemini-2.0-flash");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn rejects_unknown_provider_and_bad_numbers() {
        let provider = CampusConfig::from_lookup(lookup(&[(ENV_PROVIDER, "carrier-pigeon")]))
            .expect_err("unknown provider should fail");
        assert_eq!(provider.kind, CampusErrorKind::Configuration);
        assert!(provider.message.contains("carrier-pigeon"));

        let timeout = CampusConfig::from_lookup(lookup(&[(ENV_MODEL_TIMEOUT_SECS, "0")]))
            .expect_err("zero timeout should fail");
        assert!(timeout.message.contains(ENV_MODEL_TIMEOUT_SECS));

        let rounds = CampusConfig::from_lookup(lookup(&[(ENV_MAX_TOOL_ROUNDS, "many")]))
            .expect_err("non-numeric rounds should fail");
        assert!(rounds.message.contains(ENV_MAX_TOOL_ROUNDS));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = CampusConfig::new(ProviderId::OpenAi).with_api_key("sk-secret");
        let rendered = format!("{config:?}");

        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("sk-secret"));
    }
}
