//! Adapter-side request and response shapes.
//!
//! These sit between the provider-neutral model types and the serde payloads
//! in `serde_api`. A structured-output refusal arrives as a separate field on
//! the assistant message; it is surfaced as assistant text with a
//! `ContentFilter` stop reason so callers see why no JSON came back.

use std::fmt::Formatter;

use serde_json::Value;

use crate::{
    Message, ModelResponse, OutputItem, ProviderId, Role, SecretString, StopReason,
    StructuredOutput, TokenUsage, ToolCall, ToolDefinition,
};

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    pub tools: Vec<OpenAiTool>,
    pub response_format: Option<OpenAiResponseFormat>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl OpenAiRequest {
    pub fn declares_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|tool| tool.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiMessage {
    pub role: OpenAiRole,
    pub content: String,
    /// Image URLs or data URIs sent as `image_url` parts.
    pub images: Vec<String>,
    pub tool_calls: Vec<OpenAiToolCall>,
    pub tool_call_id: Option<String>,
}

impl From<Message> for OpenAiMessage {
    fn from(message: Message) -> Self {
        let role = match message.role {
            Role::System => OpenAiRole::System,
            Role::User => OpenAiRole::User,
            Role::Assistant => OpenAiRole::Assistant,
            Role::Tool => OpenAiRole::Tool,
        };

        Self {
            role,
            content: message.content,
            images: message.media.into_iter().map(|part| part.url).collect(),
            tool_calls: message.tool_calls.into_iter().map(Into::into).collect(),
            tool_call_id: message.tool_call_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiRole {
    System,
    User,
    Assistant,
    Tool,
}

impl OpenAiRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// A `function` tool; `parameters` is the exported JSON Schema of the tool input.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiTool {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl From<ToolDefinition> for OpenAiTool {
    fn from(definition: ToolDefinition) -> Self {
        Self {
            name: definition.name,
            description: definition.description,
            parameters: definition.input_schema,
        }
    }
}

/// Sent as `response_format: {type: "json_schema", ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiResponseFormat {
    pub name: String,
    pub schema: Value,
}

impl From<StructuredOutput> for OpenAiResponseFormat {
    fn from(output: StructuredOutput) -> Self {
        Self {
            name: output.name,
            schema: output.schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiResponse {
    pub model: String,
    pub message: OpenAiAssistantMessage,
    pub finish_reason: OpenAiFinishReason,
    pub usage: OpenAiUsage,
}

impl OpenAiResponse {
    pub(crate) fn into_model_response(self, provider: ProviderId) -> ModelResponse {
        let OpenAiAssistantMessage {
            content,
            refusal,
            tool_calls,
        } = self.message;

        let mut stop_reason = StopReason::from(self.finish_reason);
        let text = match refusal.filter(|refusal| !refusal.trim().is_empty()) {
            Some(refusal) if content.trim().is_empty() => {
                stop_reason = StopReason::ContentFilter;
                refusal
            }
            _ => content,
        };

        let mut output = Vec::with_capacity(tool_calls.len() + 1);
        if !text.trim().is_empty() {
            output.push(OutputItem::Message(Message::assistant(text)));
        }
        output.extend(
            tool_calls
                .into_iter()
                .map(|call| OutputItem::ToolCall(call.into())),
        );

        ModelResponse {
            provider,
            model: self.model,
            output,
            stop_reason,
            usage: self.usage.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpenAiAssistantMessage {
    pub content: String,
    /// Set when the model declined to produce the requested JSON schema.
    pub refusal: Option<String>,
    pub tool_calls: Vec<OpenAiToolCall>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiToolCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded arguments exactly as the model produced them.
    pub arguments: String,
}

impl From<OpenAiToolCall> for ToolCall {
    fn from(call: OpenAiToolCall) -> Self {
        let OpenAiToolCall {
            id,
            name,
            arguments,
        } = call;
        Self {
            id,
            name,
            arguments,
        }
    }
}

impl From<ToolCall> for OpenAiToolCall {
    fn from(call: ToolCall) -> Self {
        let ToolCall {
            id,
            name,
            arguments,
        } = call;
        Self {
            id,
            name,
            arguments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiFinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Other,
}

impl OpenAiFinishReason {
    /// `function_call` is the legacy spelling some compatible servers still send.
    pub(crate) fn from_wire(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("stop") => Self::Stop,
            Some("length") => Self::Length,
            Some("tool_calls" | "function_call") => Self::ToolCalls,
            Some("content_filter") => Self::ContentFilter,
            _ => Self::Other,
        }
    }
}

impl From<OpenAiFinishReason> for StopReason {
    fn from(reason: OpenAiFinishReason) -> Self {
        match reason {
            OpenAiFinishReason::Stop => Self::EndTurn,
            OpenAiFinishReason::Length => Self::MaxTokens,
            OpenAiFinishReason::ToolCalls => Self::ToolUse,
            OpenAiFinishReason::ContentFilter => Self::ContentFilter,
            OpenAiFinishReason::Other => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenAiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<OpenAiUsage> for TokenUsage {
    fn from(usage: OpenAiUsage) -> Self {
        // Some compatible servers omit the total.
        let total_tokens = if usage.total_tokens == 0 {
            usage.prompt_tokens.saturating_add(usage.completion_tokens)
        } else {
            usage.total_tokens
        };
        Self {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum OpenAiAuth {
    ApiKey(SecretString),
    /// Local servers that accept unauthenticated requests.
    Anonymous,
}

impl std::fmt::Debug for OpenAiAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("OpenAiAuth::ApiKey([REDACTED])"),
            Self::Anonymous => f.write_str("OpenAiAuth::Anonymous"),
        }
    }
}
