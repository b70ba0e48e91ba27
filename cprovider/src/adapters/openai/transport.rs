//! Transport trait and reqwest-based HTTP implementation.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};

use crate::{ProviderError, ProviderFuture};

use super::serde_api::{OpenAiApiResponse, build_api_request, extract_error_message};
use super::types::{OpenAiAuth, OpenAiRequest, OpenAiResponse};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn apply_auth(
        &self,
        builder: reqwest::RequestBuilder,
        auth: &OpenAiAuth,
    ) -> reqwest::RequestBuilder {
        match auth {
            OpenAiAuth::ApiKey(key) => builder.bearer_auth(key.expose()),
            OpenAiAuth::Anonymous => builder,
        }
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("chat completion failed with status {status}"));

        let error = error_for_status(status, message);
        match retry_after {
            Some(delay) => error.with_retry_after(delay),
            None => error,
        }
    }
}

pub(crate) fn error_for_status(status: StatusCode, message: String) -> ProviderError {
    ProviderError::from_status(status.as_u16(), message)
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            let api_request = build_api_request(request)?;
            let url = self.endpoint("chat/completions");
            let builder = self.client.post(url).json(&api_request);
            let response = self.apply_auth(builder, &auth).send().await.map_err(|err| {
                if err.is_timeout() {
                    ProviderError::timeout(err.to_string())
                } else {
                    ProviderError::transport(err.to_string())
                }
            })?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let parsed: OpenAiApiResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::malformed_response(err.to_string()))?;

            OpenAiResponse::try_from(parsed)
        })
    }
}
