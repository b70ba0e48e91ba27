//! Chat-completions HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProviderError;

use super::types::{
    OpenAiAssistantMessage, OpenAiFinishReason, OpenAiMessage, OpenAiRequest, OpenAiResponse,
    OpenAiResponseFormat, OpenAiRole, OpenAiTool, OpenAiToolCall, OpenAiUsage,
};

pub(crate) fn build_api_request(request: OpenAiRequest) -> Result<OpenAiApiRequest, ProviderError> {
    let messages = request
        .messages
        .into_iter()
        .map(OpenAiApiMessage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    if messages.is_empty() {
        return Err(ProviderError::invalid_request(
            "chat completion request requires at least one message",
        ));
    }

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(
            request
                .tools
                .into_iter()
                .map(OpenAiApiTool::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    Ok(OpenAiApiRequest {
        model: request.model,
        messages,
        tools,
        response_format: request.response_format.map(OpenAiApiResponseFormat::from),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        stream: false,
    })
}

/// Pulls `error.message` out of an error body. Gemini wraps errors in a
/// one-element array.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<OpenAiApiErrorEnvelope>(body) {
        return Some(parsed.error.message);
    }

    serde_json::from_str::<Vec<OpenAiApiErrorEnvelope>>(body)
        .ok()?
        .into_iter()
        .next()
        .map(|envelope| envelope.error.message)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiErrorEnvelope {
    pub error: OpenAiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAiApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<OpenAiApiResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiMessage {
    pub role: String,
    pub content: Option<OpenAiApiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<OpenAiApiToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum OpenAiApiContent {
    Text(String),
    Parts(Vec<OpenAiApiContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum OpenAiApiContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAiApiImageUrl },
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiImageUrl {
    pub url: String,
}

impl TryFrom<OpenAiMessage> for OpenAiApiMessage {
    type Error = ProviderError;

    fn try_from(value: OpenAiMessage) -> Result<Self, Self::Error> {
        let has_tool_calls = !value.tool_calls.is_empty();
        if value.content.trim().is_empty()
            && value.images.is_empty()
            && !(value.role == OpenAiRole::Assistant && has_tool_calls)
        {
            return Err(ProviderError::invalid_request(format!(
                "{} message content must not be empty",
                value.role.as_str()
            )));
        }

        if value.role == OpenAiRole::Tool && value.tool_call_id.is_none() {
            return Err(ProviderError::invalid_request(
                "tool message requires a tool_call_id",
            ));
        }

        let content = if !value.images.is_empty() {
            let mut parts = Vec::with_capacity(value.images.len() + 1);
            if !value.content.is_empty() {
                parts.push(OpenAiApiContentPart::Text {
                    text: value.content,
                });
            }
            parts.extend(value.images.into_iter().map(|url| OpenAiApiContentPart::ImageUrl {
                image_url: OpenAiApiImageUrl { url },
            }));
            Some(OpenAiApiContent::Parts(parts))
        } else if value.content.is_empty() {
            None
        } else {
            Some(OpenAiApiContent::Text(value.content))
        };

        Ok(Self {
            role: value.role.as_str().to_string(),
            content,
            tool_calls: value
                .tool_calls
                .into_iter()
                .map(OpenAiApiToolCall::from)
                .collect(),
            tool_call_id: value.tool_call_id,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiTool {
    pub r#type: String,
    pub function: OpenAiApiFunction,
}

impl TryFrom<OpenAiTool> for OpenAiApiTool {
    type Error = ProviderError;

    fn try_from(value: OpenAiTool) -> Result<Self, Self::Error> {
        if !value.parameters.is_object() {
            return Err(ProviderError::invalid_request(format!(
                "tool '{}' parameters must be a JSON Schema object",
                value.name
            )));
        }

        Ok(Self {
            r#type: "function".to_string(),
            function: OpenAiApiFunction {
                name: value.name,
                description: value.description,
                parameters: value.parameters,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiResponseFormat {
    pub r#type: String,
    pub json_schema: OpenAiApiJsonSchema,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiJsonSchema {
    pub name: String,
    pub schema: Value,
}

impl From<OpenAiResponseFormat> for OpenAiApiResponseFormat {
    fn from(value: OpenAiResponseFormat) -> Self {
        Self {
            r#type: "json_schema".to_string(),
            json_schema: OpenAiApiJsonSchema {
                name: value.name,
                schema: value.schema,
            },
        }
    }
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OpenAiApiToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(default = "function_type")]
    pub r#type: String,
    pub function: OpenAiApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OpenAiApiToolFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl From<OpenAiToolCall> for OpenAiApiToolCall {
    fn from(value: OpenAiToolCall) -> Self {
        Self {
            id: value.id,
            r#type: function_type(),
            function: OpenAiApiToolFunction {
                name: value.name,
                arguments: value.arguments,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiResponse {
    #[serde(default)]
    pub model: String,
    pub choices: Vec<OpenAiApiChoice>,
    pub usage: Option<OpenAiApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiChoice {
    pub message: OpenAiApiAssistantMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiAssistantMessage {
    pub content: Option<String>,
    pub refusal: Option<String>,
    pub tool_calls: Option<Vec<OpenAiApiToolCall>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OpenAiApiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl TryFrom<OpenAiApiResponse> for OpenAiResponse {
    type Error = ProviderError;

    fn try_from(value: OpenAiApiResponse) -> Result<Self, Self::Error> {
        let choice = value.choices.into_iter().next().ok_or_else(|| {
            ProviderError::malformed_response("chat completion did not include choices")
        })?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, call)| OpenAiToolCall {
                id: if call.id.is_empty() {
                    format!("call_{index}")
                } else {
                    call.id
                },
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect::<Vec<_>>();

        let usage = value.usage.unwrap_or_default();

        Ok(Self {
            model: value.model,
            message: OpenAiAssistantMessage {
                content: choice.message.content.unwrap_or_default(),
                refusal: choice.message.refusal,
                tool_calls,
            },
            finish_reason: OpenAiFinishReason::from_wire(choice.finish_reason.as_deref()),
            usage: OpenAiUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
        })
    }
}
