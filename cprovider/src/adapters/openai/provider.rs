//! Chat-completions provider over a transport and the shared model types.

use std::sync::Arc;

use crate::{
    ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderFuture, ProviderId,
    SecureCredentialManager,
};

use super::auth::resolve_auth;
use super::transport::OpenAiTransport;
use super::types::{OpenAiMessage, OpenAiRequest, OpenAiResponseFormat, OpenAiTool};

#[derive(Clone)]
pub struct OpenAiProvider {
    id: ProviderId,
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn OpenAiTransport>,
    fallback_model: String,
}

impl OpenAiProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn OpenAiTransport>,
    ) -> Self {
        Self {
            id: ProviderId::OpenAi,
            credentials,
            transport,
            fallback_model: "gpt-4o-mini".to_string(),
        }
    }

    /// Reports this provider under another id, which also selects the
    /// credential used for requests.
    pub fn with_provider_id(mut self, id: ProviderId) -> Self {
        self.id = id;
        self
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub(crate) fn build_openai_request(&self, request: ModelRequest) -> OpenAiRequest {
        let model = if request.model.trim().is_empty() {
            self.fallback_model.clone()
        } else {
            request.model
        };

        OpenAiRequest {
            model,
            messages: request
                .messages
                .into_iter()
                .map(OpenAiMessage::from)
                .collect(),
            tools: request.tools.into_iter().map(OpenAiTool::from).collect(),
            response_format: request.output_schema.map(OpenAiResponseFormat::from),
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
        }
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("id", &self.id)
            .field("transport", &self.transport)
            .field("fallback_model", &self.fallback_model)
            .finish_non_exhaustive()
    }
}

impl ModelProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            let auth = resolve_auth(&self.credentials, self.id)?;
            let openai_request = self.build_openai_request(request);
            let response = self.transport.complete(openai_request, auth).await?;
            Ok(response.into_model_response(self.id))
        })
    }
}
