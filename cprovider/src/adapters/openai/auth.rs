//! Credential resolution for chat-completions providers.

use crate::{ProviderError, ProviderId, SecureCredentialManager};

use super::types::OpenAiAuth;

impl SecureCredentialManager {
    /// Stores an OpenAI API key. OpenAI keys start with `sk-`.
    pub fn set_openai_api_key(&self, api_key: impl Into<String>) -> Result<(), ProviderError> {
        let api_key = api_key.into();
        if !api_key.starts_with("sk-") {
            return Err(ProviderError::authentication(
                "OpenAI API key must start with 'sk-'",
            ));
        }

        self.set_api_key(ProviderId::OpenAi, api_key)
    }
}

pub(crate) fn resolve_auth(
    credentials: &SecureCredentialManager,
    provider: ProviderId,
) -> Result<OpenAiAuth, ProviderError> {
    if let Some(api_key) = credentials.api_key(provider)? {
        return Ok(OpenAiAuth::ApiKey(api_key));
    }

    if provider.requires_api_key() {
        return Err(ProviderError::authentication(format!(
            "no API key configured for {provider}"
        )));
    }

    Ok(OpenAiAuth::Anonymous)
}
