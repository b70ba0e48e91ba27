//! In-memory API key storage with redacted debug output.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{ProviderError, ProviderId};

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // Zero bytes keep the buffer valid UTF-8.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

#[derive(Default)]
pub struct SecureCredentialManager {
    api_keys: Mutex<HashMap<ProviderId, SecretString>>,
}

impl SecureCredentialManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_api_key(
        &self,
        provider: ProviderId,
        api_key: impl Into<String>,
    ) -> Result<(), ProviderError> {
        let api_key = SecretString::new(api_key);
        if api_key.is_empty() {
            return Err(ProviderError::authentication("api key must not be empty"));
        }

        self.keys()?.insert(provider, api_key);
        Ok(())
    }

    pub fn has_credentials(&self, provider: ProviderId) -> Result<bool, ProviderError> {
        Ok(self.keys()?.contains_key(&provider))
    }

    pub fn api_key(&self, provider: ProviderId) -> Result<Option<SecretString>, ProviderError> {
        Ok(self.keys()?.get(&provider).cloned())
    }

    pub fn clear(&self, provider: ProviderId) -> Result<bool, ProviderError> {
        Ok(self.keys()?.remove(&provider).is_some())
    }

    fn keys(&self) -> Result<MutexGuard<'_, HashMap<ProviderId, SecretString>>, ProviderError> {
        self.api_keys
            .lock()
            .map_err(|_| ProviderError::other("credential manager lock poisoned"))
    }
}

impl std::fmt::Debug for SecureCredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureCredentialManager")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let secret = SecretString::new("sk-live-123");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-live-123");
    }

    #[test]
    fn keys_are_stored_per_provider() {
        let manager = SecureCredentialManager::new();
        manager
            .set_api_key(ProviderId::Gemini, "gem-key")
            .expect("key should set");

        assert!(manager.has_credentials(ProviderId::Gemini).expect("lookup"));
        assert!(!manager.has_credentials(ProviderId::OpenAi).expect("lookup"));
        assert_eq!(
            manager
                .api_key(ProviderId::Gemini)
                .expect("lookup")
                .map(|key| key.expose().to_string()),
            Some("gem-key".to_string())
        );

        assert!(manager.clear(ProviderId::Gemini).expect("clear"));
        assert!(!manager.has_credentials(ProviderId::Gemini).expect("lookup"));
    }

    #[test]
    fn blank_keys_are_rejected() {
        let manager = SecureCredentialManager::new();
        let error = manager
            .set_api_key(ProviderId::OpenAi, "   ")
            .expect_err("blank key should fail");
        assert_eq!(error.kind, ProviderErrorKind::Authentication);
    }
}
