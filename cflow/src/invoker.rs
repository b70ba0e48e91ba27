//! Single model round trip under a timeout and a caller cancellation token.
//!
//! The reply is classified into final output, tool requests, both, or plain
//! text. When an output shape is declared and the model answered without tool
//! requests, its text must parse and validate or the call fails.

use std::sync::Arc;
use std::time::Duration;

use ccommon::{GenerationOptions, MetadataMap};
use cprovider::{
    Message, ModelProvider, ModelRequest, ModelResponse, NoopOperationHooks,
    ProviderOperationHooks, RetryPolicy, StopReason, StructuredOutput, TokenUsage, ToolCall,
    ToolDefinition, execute_with_retry,
};
use cschema::{ObjectSchema, Validation};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::FlowError;

pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    FinalOutput(Value),
    ToolRequests(Vec<ToolCall>),
    Both {
        output: Value,
        tool_calls: Vec<ToolCall>,
    },
    /// Free text, possibly empty.
    TextOnly(String),
}

impl ModelReply {
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::ToolRequests(tool_calls) | Self::Both { tool_calls, .. } => tool_calls,
            Self::FinalOutput(_) | Self::TextOnly(_) => &[],
        }
    }

    pub fn output(&self) -> Option<&Value> {
        match self {
            Self::FinalOutput(output) | Self::Both { output, .. } => Some(output),
            Self::ToolRequests(_) | Self::TextOnly(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelTurn {
    pub reply: ModelReply,
    /// Assistant text as received, before any parsing.
    pub raw_text: String,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

/// Everything sent to the model for one round.
#[derive(Debug, Clone, Default)]
pub struct ModelCall {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub output: Option<(String, ObjectSchema)>,
    pub options: GenerationOptions,
    pub metadata: MetadataMap,
    /// Overrides the invoker's timeout for this call.
    pub timeout: Option<Duration>,
}

impl ModelCall {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, schema: ObjectSchema) -> Self {
        self.output = Some((name.into(), schema));
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn to_request(&self, model: &str) -> Result<ModelRequest, FlowError> {
        let mut builder = ModelRequest::builder(model)
            .messages(self.messages.clone())
            .options(self.options)
            .tools(self.tools.clone())
            .maybe_output_schema(
                self.output
                    .as_ref()
                    .map(|(name, schema)| StructuredOutput::new(name, schema.to_json_schema())),
            );

        for (key, value) in &self.metadata {
            builder = builder.metadata(key, value);
        }

        Ok(builder.build()?)
    }
}

#[derive(Clone)]
pub struct ModelInvoker {
    provider: Arc<dyn ModelProvider>,
    model: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl ModelInvoker {
    pub fn new(provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout: DEFAULT_MODEL_TIMEOUT,
            retry_policy: RetryPolicy::default(),
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn invoke(
        &self,
        call: &ModelCall,
        cancellation: Option<&CancellationToken>,
    ) -> Result<ModelTurn, FlowError> {
        let request = call.to_request(&self.model)?;
        let limit = call.timeout.unwrap_or(self.timeout);
        let provider = self.provider.as_ref();

        let attempts = execute_with_retry(
            provider.id(),
            "complete",
            &self.retry_policy,
            self.hooks.as_ref(),
            |_attempt| provider.complete(request.clone()),
            tokio::time::sleep,
        );

        let response = tokio::select! {
            biased;
            _ = cancelled(cancellation) => {
                return Err(FlowError::cancelled("model call cancelled by caller"));
            }
            outcome = tokio::time::timeout(limit, attempts) => match outcome {
                Ok(result) => result?,
                Err(_) => {
                    return Err(FlowError::model_timeout(format!(
                        "model did not respond within {}ms",
                        limit.as_millis()
                    )));
                }
            },
        };

        let schema = call.output.as_ref().map(|(_, schema)| schema);
        interpret(response, schema)
    }
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

fn interpret(response: ModelResponse, schema: Option<&ObjectSchema>) -> Result<ModelTurn, FlowError> {
    let raw_text = response.text();
    let tool_calls = response.tool_calls();

    let reply = match schema.filter(|_| !raw_text.trim().is_empty()) {
        Some(schema) => match (parse_structured(&raw_text, schema), tool_calls.is_empty()) {
            (Ok(output), true) => ModelReply::FinalOutput(output),
            (Ok(output), false) => ModelReply::Both { output, tool_calls },
            (Err(error), true) => return Err(error),
            (Err(_), false) => ModelReply::ToolRequests(tool_calls),
        },
        None if !tool_calls.is_empty() => ModelReply::ToolRequests(tool_calls),
        None => ModelReply::TextOnly(raw_text.clone()),
    };

    Ok(ModelTurn {
        reply,
        raw_text,
        stop_reason: response.stop_reason,
        usage: response.usage,
    })
}

fn parse_structured(text: &str, schema: &ObjectSchema) -> Result<Value, FlowError> {
    let value: Value = serde_json::from_str(strip_code_fence(text)).map_err(|error| {
        FlowError::malformed_output(format!("model output is not valid JSON: {error}"))
    })?;

    match schema.validate(&value) {
        Validation::Valid(coerced) => Ok(coerced),
        Validation::Invalid(errors) => Err(FlowError::malformed_output(format!(
            "model output does not match the declared shape: {errors}"
        ))
        .with_field_errors(errors)),
    }
}

/// Removes a surrounding markdown code fence such as ```` ```json ````.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // The language tag ends where the body starts, on the same line or the next.
    let body_start = rest
        .find(|c: char| c.is_whitespace() || c == '{' || c == '[')
        .unwrap_or(rest.len());
    let body = &rest[body_start..];
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use cprovider::{OutputItem, ProviderId, Role};
    use cschema::Field;
    use serde_json::json;

    use super::*;
    use crate::FlowErrorKind;

    fn response(text: &str, tool_calls: Vec<ToolCall>) -> ModelResponse {
        let mut output = Vec::new();
        if !text.is_empty() {
            output.push(OutputItem::Message(Message::new(Role::Assistant, text)));
        }
        output.extend(tool_calls.into_iter().map(OutputItem::ToolCall));

        ModelResponse {
            provider: ProviderId::OpenAi,
            model: "test-model".to_string(),
            output,
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn sms_call() -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: "sendSms".to_string(),
            arguments: r#"{"to":"+1"}"#.to_string(),
        }
    }

    fn summary_schema() -> ObjectSchema {
        ObjectSchema::builder()
            .field(Field::string("summary").min_length(1))
            .build()
    }

    #[test]
    fn fenced_json_is_accepted_as_final_output() {
        let turn = interpret(
            response("```json\n{\"summary\": \"Two pages\"}\n```", Vec::new()),
            Some(&summary_schema()),
        )
        .expect("fenced output should parse");

        assert_eq!(turn.reply, ModelReply::FinalOutput(json!({"summary": "Two pages"})));
    }

    #[test]
    fn unparseable_output_without_tools_is_fatal() {
        let error = interpret(response("Sure! Here it is.", Vec::new()), Some(&summary_schema()))
            .expect_err("prose should not pass as output");
        assert_eq!(error.kind, FlowErrorKind::MalformedOutput);

        let error = interpret(response(r#"{"summary": ""}"#, Vec::new()), Some(&summary_schema()))
            .expect_err("empty summary should not validate");
        assert!(
            error
                .field_errors
                .as_ref()
                .is_some_and(|errors| errors.contains("summary"))
        );
    }

    #[test]
    fn unparseable_text_next_to_tool_calls_stays_raw() {
        let turn = interpret(
            response("Sending now.", vec![sms_call()]),
            Some(&summary_schema()),
        )
        .expect("tool calls should win");

        assert_eq!(turn.reply, ModelReply::ToolRequests(vec![sms_call()]));
        assert_eq!(turn.raw_text, "Sending now.");
    }

    #[test]
    fn valid_output_next_to_tool_calls_is_both() {
        let turn = interpret(
            response(r#"{"summary": "done"}"#, vec![sms_call()]),
            Some(&summary_schema()),
        )
        .expect("both should parse");

        assert_eq!(turn.reply.output(), Some(&json!({"summary": "done"})));
        assert_eq!(turn.reply.tool_calls().len(), 1);
    }

    #[test]
    fn empty_text_is_text_only() {
        let turn = interpret(response("", Vec::new()), Some(&summary_schema()))
            .expect("empty reply is not malformed");
        assert_eq!(turn.reply, ModelReply::TextOnly(String::new()));

        let turn = interpret(response("Navigating.", Vec::new()), None).expect("text reply");
        assert_eq!(turn.reply, ModelReply::TextOnly("Navigating.".to_string()));
    }

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn single_line_fences_keep_their_body() {
        assert_eq!(strip_code_fence("```json {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json[1, 2]```"), "[1, 2]");
        assert_eq!(strip_code_fence("```json\r\n{}\r\n```"), "{}");

        let turn = interpret(
            response("```json {\"summary\": \"One page\"}```", Vec::new()),
            Some(&summary_schema()),
        )
        .expect("single-line fence should parse");
        assert_eq!(turn.reply, ModelReply::FinalOutput(json!({"summary": "One page"})));
    }
}
