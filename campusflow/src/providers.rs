//! Provider construction from [`CampusConfig`].

use std::sync::Arc;

use cprovider::{ModelProvider, ProviderError};

use crate::CampusConfig;

pub fn build_provider_with_config(
    config: &CampusConfig,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    let api_key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty());

    if api_key.is_none() && config.provider.requires_api_key() {
        return Err(ProviderError::authentication(format!(
            "{} requires an API key; set CAMPUSFLOW_API_KEY",
            config.provider
        )));
    }

    build_http_provider(config, api_key)
}

#[cfg(feature = "provider-openai")]
fn build_http_provider(
    config: &CampusConfig,
    api_key: Option<&str>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    use cprovider::adapters::openai::{OpenAiHttpTransport, OpenAiProvider};
    use cprovider::{ProviderId, SecureCredentialManager};

    let credentials = Arc::new(SecureCredentialManager::new());
    if let Some(api_key) = api_key {
        match config.provider {
            ProviderId::OpenAi => credentials.set_openai_api_key(api_key)?,
            provider => credentials.set_api_key(provider, api_key)?,
        }
    }

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;
    let transport =
        Arc::new(OpenAiHttpTransport::new(http).with_base_url(resolve_base_url(config)?));

    let mut provider = OpenAiProvider::new(credentials, transport).with_provider_id(config.provider);
    if !config.model.trim().is_empty() {
        provider = provider.with_fallback_model(config.model.clone());
    }

    tracing::debug!(
        phase = "provider",
        event = "built",
        provider = %config.provider,
        model = config.model.as_str()
    );
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "provider-openai"))]
fn build_http_provider(
    _config: &CampusConfig,
    _api_key: Option<&str>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-openai feature is not enabled on campusflow",
    ))
}

#[cfg(feature = "provider-openai")]
fn resolve_base_url(config: &CampusConfig) -> Result<String, ProviderError> {
    use cprovider::ProviderId;
    use cprovider::adapters::openai::{GEMINI_OPENAI_BASE_URL, OPENAI_BASE_URL};

    if let Some(base_url) = config.base_url.as_deref().map(str::trim) {
        if !base_url.is_empty() {
            return Ok(base_url.to_string());
        }
    }

    match config.provider {
        ProviderId::OpenAi => Ok(OPENAI_BASE_URL.to_string()),
        ProviderId::Gemini => Ok(GEMINI_OPENAI_BASE_URL.to_string()),
        ProviderId::Compatible => Err(ProviderError::invalid_request(
            "compatible provider requires CAMPUSFLOW_BASE_URL",
        )),
    }
}

#[cfg(test)]
mod tests {
    use cprovider::{ProviderErrorKind, ProviderId};

    use super::*;

    #[test]
    fn missing_api_key_is_an_authentication_error() {
        let error = build_provider_with_config(&CampusConfig::new(ProviderId::Gemini))
            .err()
            .expect("gemini without a key should fail");

        assert_eq!(error.kind, ProviderErrorKind::Authentication);
        assert!(error.message.contains("CAMPUSFLOW_API_KEY"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = CampusConfig::new(ProviderId::OpenAi).with_api_key("   ");
        let error = build_provider_with_config(&config)
            .err()
            .expect("blank key should fail");

        assert_eq!(error.kind, ProviderErrorKind::Authentication);
    }

    #[cfg(feature = "provider-openai")]
    #[test]
    fn openai_keys_must_have_the_openai_prefix() {
        let config = CampusConfig::new(ProviderId::OpenAi).with_api_key("AIza-not-openai");
        let error = build_provider_with_config(&config)
            .err()
            .expect("non sk- key should fail");

        assert_eq!(error.kind, ProviderErrorKind::Authentication);
    }

    #[cfg(feature = "provider-openai")]
    #[test]
    fn compatible_provider_needs_a_base_url() {
        let config = CampusConfig::new(ProviderId::Compatible);
        let error = build_provider_with_config(&config)
            .err()
            .expect("missing base url should fail");

        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    }

    #[cfg(feature = "provider-openai")]
    #[test]
    fn base_url_defaults_follow_the_provider() {
        assert_eq!(
            resolve_base_url(&CampusConfig::new(ProviderId::Gemini)).expect("gemini url"),
            "https://generativelanguage.googleapis.com/v1beta/openai"
        );
        assert_eq!(
            resolve_base_url(
                &CampusConfig::new(ProviderId::OpenAi).with_base_url("https://proxy.local/v1")
            )
            .expect("override url"),
            "https://proxy.local/v1"
        );
    }

    #[cfg(feature = "provider-openai")]
    #[test]
    fn builds_provider_reporting_configured_id() {
        let config = CampusConfig::new(ProviderId::Gemini).with_api_key("gemini-key");
        let provider = build_provider_with_config(&config).expect("gemini provider should build");

        assert_eq!(provider.id(), ProviderId::Gemini);
    }

    #[cfg(feature = "provider-openai")]
    #[test]
    fn compatible_provider_builds_without_a_key() {
        let config = CampusConfig::new(ProviderId::Compatible)
            .with_base_url("http://localhost:11434/v1")
            .with_model("llama3");
        let provider = build_provider_with_config(&config).expect("local provider should build");

        assert_eq!(provider.id(), ProviderId::Compatible);
    }
}
