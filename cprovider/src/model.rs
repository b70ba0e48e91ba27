//! Provider-agnostic request, response, and message model types.
//!
//! ```rust
//! use cprovider::{Message, ModelRequest, ProviderErrorKind, StructuredOutput};
//! use serde_json::json;
//!
//! let ok = ModelRequest::builder("gemini-2.0-flash")
//!     .message(Message::system("You are a study assistant."))
//!     .message(Message::user("Explain photosynthesis"))
//!     .output_schema(StructuredOutput::new("studyBuddy", json!({"type": "object"})))
//!     .build();
//! assert!(ok.is_ok());
//!
//! let err = ModelRequest::builder("").message(Message::user("hi")).build();
//! assert_eq!(
//!     err.err().map(|error| error.kind),
//!     Some(ProviderErrorKind::InvalidRequest)
//! );
//! ```

use std::fmt::{Display, Formatter};

use ccommon::{GenerationOptions, MetadataMap};
use serde_json::Value;

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenAi,
    Gemini,
    /// Any other server speaking the chat-completions wire format.
    Compatible,
}

impl ProviderId {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "gemini" | "googleai" => Some(Self::Gemini),
            "compatible" | "local" => Some(Self::Compatible),
            _ => None,
        }
    }

    pub fn requires_api_key(self) -> bool {
        !matches!(self, Self::Compatible)
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Compatible => "compatible",
        };

        f.write_str(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Image or document passed to the model next to a message's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    pub url: String,
    pub content_type: Option<String>,
}

impl MediaPart {
    pub fn new(url: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            url: url.into(),
            content_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub media: Vec<MediaPart>,
    /// Set on assistant turns that requested tools.
    pub tool_calls: Vec<ToolCall>,
    /// Set on tool turns; names the call being answered.
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            media: Vec::new(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn assistant_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    pub fn tool_result(result: ToolResult) -> Self {
        Self {
            tool_call_id: Some(result.tool_call_id),
            ..Self::new(Role::Tool, result.output)
        }
    }

    pub fn with_media(mut self, media: impl IntoIterator<Item = MediaPart>) -> Self {
        self.media.extend(media);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool arguments.
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON text as produced by the model.
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub output: String,
}

/// Requested JSON shape for the final answer.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredOutput {
    pub name: String,
    pub schema: Value,
}

impl StructuredOutput {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    Message(Message),
    ToolCall(ToolCall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    ContentFilter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub provider: ProviderId,
    pub model: String,
    pub output: Vec<OutputItem>,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl ModelResponse {
    /// Concatenated assistant text across all message items.
    pub fn text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message(message) => Some(message.content.as_str()),
                OutputItem::ToolCall(_) => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::ToolCall(call) => Some(call.clone()),
                OutputItem::Message(_) => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: GenerationOptions,
    pub tools: Vec<ToolDefinition>,
    pub output_schema: Option<StructuredOutput>,
    pub metadata: MetadataMap,
}

impl ModelRequest {
    pub fn builder(model: impl Into<String>) -> ModelRequestBuilder {
        ModelRequestBuilder::new(model)
    }

    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: GenerationOptions::default(),
            tools: Vec::new(),
            output_schema: None,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_output_schema(mut self, output_schema: StructuredOutput) -> Self {
        self.output_schema = Some(output_schema);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(max_tokens) = self.options.max_tokens
            && max_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        if let Some(duplicate) = self
            .tools
            .iter()
            .enumerate()
            .find(|(index, tool)| self.tools[..*index].iter().any(|other| other.name == tool.name))
            .map(|(_, tool)| tool.name.as_str())
        {
            return Err(ProviderError::invalid_request(format!(
                "tool '{duplicate}' is declared more than once"
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequestBuilder {
    model: String,
    messages: Vec<Message>,
    options: GenerationOptions,
    tools: Vec<ToolDefinition>,
    output_schema: Option<StructuredOutput>,
    metadata: MetadataMap,
}

impl ModelRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            options: GenerationOptions::default(),
            tools: Vec::new(),
            output_schema: None,
            metadata: MetadataMap::new(),
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn output_schema(mut self, output_schema: StructuredOutput) -> Self {
        self.output_schema = Some(output_schema);
        self
    }

    pub fn maybe_output_schema(mut self, output_schema: Option<StructuredOutput>) -> Self {
        self.output_schema = output_schema;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<ModelRequest, ProviderError> {
        let request = ModelRequest {
            model: self.model,
            messages: self.messages,
            options: self.options,
            tools: self.tools,
            output_schema: self.output_schema,
            metadata: self.metadata,
        };

        request.validate()?;
        Ok(request)
    }
}
