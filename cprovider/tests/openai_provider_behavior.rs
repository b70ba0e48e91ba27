#![cfg(feature = "provider-openai")]

use std::sync::{Arc, Mutex};

use cprovider::adapters::openai::{
    OpenAiAssistantMessage, OpenAiAuth, OpenAiFinishReason, OpenAiProvider, OpenAiRequest,
    OpenAiResponse, OpenAiToolCall, OpenAiTransport, OpenAiUsage,
};
use cprovider::{
    Message, ModelProvider, ModelRequest, OutputItem, ProviderError, ProviderErrorKind,
    ProviderFuture, ProviderId, SecureCredentialManager, StopReason, StructuredOutput,
    ToolDefinition,
};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
enum CapturedAuth {
    ApiKey(String),
    Anonymous,
}

#[derive(Debug, Default)]
struct FakeTransport {
    captured_auth: Mutex<Option<CapturedAuth>>,
    captured_request: Mutex<Option<OpenAiRequest>>,
}

impl OpenAiTransport for FakeTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            *self.captured_request.lock().expect("request lock") = Some(request);
            *self.captured_auth.lock().expect("auth lock") = Some(match auth {
                OpenAiAuth::ApiKey(value) => CapturedAuth::ApiKey(value.expose().to_string()),
                OpenAiAuth::Anonymous => CapturedAuth::Anonymous,
            });

            Ok(OpenAiResponse {
                model: "gemini-2.0-flash".to_string(),
                message: OpenAiAssistantMessage {
                    content: "Sending now".to_string(),
                    refusal: None,
                    tool_calls: vec![OpenAiToolCall {
                        id: "call_1".to_string(),
                        name: "sendSms".to_string(),
                        arguments: "{\"to\":\"+15550001\",\"message\":\"hi\"}".to_string(),
                    }],
                },
                finish_reason: OpenAiFinishReason::ToolCalls,
                usage: OpenAiUsage {
                    prompt_tokens: 7,
                    completion_tokens: 3,
                    total_tokens: 10,
                },
            })
        })
    }
}

fn sms_tool() -> ToolDefinition {
    ToolDefinition {
        name: "sendSms".to_string(),
        description: "Send an SMS".to_string(),
        input_schema: json!({"type": "object"}),
    }
}

#[tokio::test]
async fn complete_maps_response_and_uses_provider_credentials() {
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_api_key(ProviderId::Gemini, "gem-key-123")
        .expect("key should set");

    let transport = Arc::new(FakeTransport::default());
    let provider =
        OpenAiProvider::new(credentials, transport.clone()).with_provider_id(ProviderId::Gemini);
    let request = ModelRequest::new(
        "gemini-2.0-flash",
        vec![Message::system("You notify principals."), Message::user("Bill Oak")],
    )
    .with_tools(vec![sms_tool()])
    .with_output_schema(StructuredOutput::new("billing", json!({"type": "object"})));

    let response = provider
        .complete(request)
        .await
        .expect("completion should succeed");
    assert_eq!(response.provider, ProviderId::Gemini);
    assert_eq!(response.stop_reason, StopReason::ToolUse);
    assert_eq!(response.usage.total_tokens, 10);
    assert_eq!(response.output.len(), 2);
    assert!(matches!(&response.output[1], OutputItem::ToolCall(call) if call.name == "sendSms"));

    let auth = transport
        .captured_auth
        .lock()
        .expect("auth lock")
        .clone()
        .expect("auth should be captured");
    assert_eq!(auth, CapturedAuth::ApiKey("gem-key-123".to_string()));

    let captured = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request should be captured");
    assert_eq!(captured.model, "gemini-2.0-flash");
    assert_eq!(captured.messages.len(), 2);
    assert_eq!(captured.tools.len(), 1);
    assert_eq!(
        captured.response_format.map(|format| format.name),
        Some("billing".to_string())
    );
}

#[tokio::test]
async fn compatible_servers_accept_anonymous_requests() {
    let transport = Arc::new(FakeTransport::default());
    let provider = OpenAiProvider::new(Arc::new(SecureCredentialManager::new()), transport.clone())
        .with_provider_id(ProviderId::Compatible);

    provider
        .complete(ModelRequest::new("llama3", vec![Message::user("hi")]))
        .await
        .expect("anonymous completion should succeed");

    let auth = transport.captured_auth.lock().expect("auth lock").clone();
    assert_eq!(auth, Some(CapturedAuth::Anonymous));
}

#[tokio::test]
async fn missing_credentials_return_auth_error_without_calling_transport() {
    let transport = Arc::new(FakeTransport::default());
    let provider = OpenAiProvider::new(Arc::new(SecureCredentialManager::new()), transport.clone());

    let error = provider
        .complete(ModelRequest::new("gpt-4o-mini", vec![Message::user("hi")]))
        .await
        .expect_err("missing creds should fail");

    assert_eq!(error.kind, ProviderErrorKind::Authentication);
    assert_eq!(error.message, "no API key configured for openai");
    assert!(transport.captured_request.lock().expect("request lock").is_none());
}

#[test]
fn openai_keys_must_use_the_sk_prefix() {
    let credentials = SecureCredentialManager::new();
    assert!(credentials.set_openai_api_key("abc").is_err());
    assert!(credentials.set_openai_api_key("sk-live-1").is_ok());
    assert!(
        credentials
            .has_credentials(ProviderId::OpenAi)
            .expect("lookup")
    );
}
