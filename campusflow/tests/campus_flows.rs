use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use campusflow::flows::{
    ADDITIONAL_STUDENT_BILLING, FEES_NOT_CHECKED_STATUS, GENERATE_QUIZ, SEND_FEE_REMINDERS,
    SUMMARIZE_DOCUMENT, VOICE_COMMAND,
};
use campusflow::notify::{SEND_EMAIL, SEND_SMS, SEND_WHATSAPP};
use campusflow::{
    CampusConfig, CampusRuntime, CampusServices, InMemoryFeeLedger, RecordingGateway,
    build_campus_runtime_with,
};
use cflow::{FlowErrorKind, FlowState, InvocationRequest, NOTIFICATIONS_MISSING_STATUS};
use cprovider::{
    Message, ModelProvider, ModelRequest, ModelResponse, OutputItem, ProviderError,
    ProviderFuture, ProviderId, Role, StopReason, TokenUsage, ToolCall,
};
use ctooling::{NotificationChannel, ToolErrorKind};
use serde_json::{Value, json};

#[derive(Default)]
struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ModelResponse, ProviderError>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ModelResponse>) -> Arc<Self> {
        Self::scripted(responses.into_iter().map(Ok).collect())
    }

    fn scripted(responses: Vec<Result<ModelResponse, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        })
    }

    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            self.requests
                .lock()
                .expect("requests lock")
                .push(request);

            self.responses
                .lock()
                .expect("responses lock")
                .pop_front()
                .unwrap_or_else(|| Ok(reply("", Vec::new())))
        })
    }
}

fn reply(text: &str, tool_calls: Vec<ToolCall>) -> ModelResponse {
    let mut output = Vec::new();
    if !text.is_empty() {
        output.push(OutputItem::Message(Message::new(Role::Assistant, text)));
    }
    let stop_reason = if tool_calls.is_empty() {
        StopReason::EndTurn
    } else {
        StopReason::ToolUse
    };
    output.extend(tool_calls.into_iter().map(OutputItem::ToolCall));

    ModelResponse {
        provider: ProviderId::Gemini,
        model: "gemini-2.0-flash".to_string(),
        output,
        stop_reason,
        usage: TokenUsage {
            input_tokens: 20,
            output_tokens: 10,
            total_tokens: 30,
        },
    }
}

fn tools(calls: Vec<ToolCall>) -> ModelResponse {
    reply("", calls)
}

fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

fn sms(id: &str, to: &str) -> ToolCall {
    call(id, SEND_SMS, json!({"to": to, "message": "Fee update from CampusConnect"}))
}

fn whatsapp(id: &str, to: &str) -> ToolCall {
    call(id, SEND_WHATSAPP, json!({"to": to, "message": "Fee update from CampusConnect"}))
}

fn email(id: &str, to: &str) -> ToolCall {
    call(
        id,
        SEND_EMAIL,
        json!({"to": to, "subject": "Pending school fees", "body": "Please settle the balance."}),
    )
}

fn runtime(
    provider: Arc<ScriptedProvider>,
    gateway: Arc<RecordingGateway>,
    ledger: InMemoryFeeLedger,
) -> CampusRuntime {
    build_campus_runtime_with(
        provider,
        &CampusConfig::default(),
        CampusServices::new(gateway, Arc::new(ledger)),
    )
    .expect("runtime should build")
}

fn billing_input() -> Value {
    json!({
        "schoolName": "Oak",
        "additionalStudentCount": 5,
        "amountPerStudent": 100,
        "principalContact": "+15550001111",
        "adminPhoneNumber": "+15550002222",
    })
}

#[tokio::test]
async fn billing_notifies_principal_and_admin() {
    let provider = ScriptedProvider::new(vec![
        tools(vec![
            sms("call_1", "+15550001111"),
            whatsapp("call_2", "+15550001111"),
            sms("call_3", "+15550002222"),
        ]),
        reply("All three messages are on their way.", Vec::new()),
    ]);
    let gateway = Arc::new(RecordingGateway::new());
    let runtime = runtime(Arc::clone(&provider), Arc::clone(&gateway), InMemoryFeeLedger::new());

    let result = runtime
        .run(ADDITIONAL_STUDENT_BILLING, billing_input())
        .await
        .expect("billing should complete");

    assert!(result.satisfied);
    assert_eq!(result.status, "Billing notifications initiated for Oak.");
    assert_eq!(result.state, FlowState::Completed);
    assert_eq!(result.tool_calls.len(), 3);
    assert_eq!(result.tool_rounds, 1);
    assert_eq!(gateway.sent_to("+15550001111").len(), 2);
    assert_eq!(gateway.sent_to("+15550002222").len(), 1);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let prompt = requests[0]
        .messages
        .iter()
        .find(|message| message.role == Role::User)
        .expect("user prompt");
    assert!(prompt.content.contains("The total amount due is 500."));
    let offered = requests[0]
        .tools
        .iter()
        .map(|tool| tool.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(offered, vec![SEND_SMS, SEND_WHATSAPP]);
}

#[tokio::test]
async fn billing_survives_a_failed_follow_up_call() {
    let provider = ScriptedProvider::scripted(vec![
        Ok(tools(vec![
            sms("call_1", "+15550001111"),
            whatsapp("call_2", "+15550001111"),
            sms("call_3", "+15550002222"),
        ])),
        Err(ProviderError::unavailable("model overloaded")),
    ]);
    let gateway = Arc::new(RecordingGateway::new());
    let runtime = runtime(Arc::clone(&provider), Arc::clone(&gateway), InMemoryFeeLedger::new());

    let result = runtime
        .run(ADDITIONAL_STUDENT_BILLING, billing_input())
        .await
        .expect("messages already went out");

    assert!(result.satisfied);
    assert_eq!(result.status, "Billing notifications initiated for Oak.");
    assert_eq!(result.state, FlowState::Completed);
    assert_eq!(result.tool_calls.len(), 3);
    assert_eq!(
        result.follow_up_error.map(|error| error.kind),
        Some(FlowErrorKind::Model)
    );
    assert_eq!(gateway.sent().len(), 3);
    assert_eq!(provider.requests().len(), 2);
}

#[tokio::test]
async fn billing_without_tool_calls_reports_missing_notifications() {
    let provider = ScriptedProvider::new(vec![reply(
        "I would message the principal about the extra students.",
        Vec::new(),
    )]);
    let gateway = Arc::new(RecordingGateway::new());
    let runtime = runtime(provider, Arc::clone(&gateway), InMemoryFeeLedger::new());

    let result = runtime
        .run(ADDITIONAL_STUDENT_BILLING, billing_input())
        .await
        .expect("prose answer is not an error");

    assert!(!result.satisfied);
    assert_eq!(result.status, NOTIFICATIONS_MISSING_STATUS);
    assert!(result.tool_calls.is_empty());
    assert!(gateway.sent().is_empty());
}

#[tokio::test]
async fn malformed_phone_fails_one_call_and_later_calls_still_run() {
    let provider = ScriptedProvider::new(vec![
        tools(vec![
            sms("call_bad", "call the principal"),
            sms("call_principal", "+15550001111"),
            sms("call_admin", "+15550002222"),
        ]),
        reply("Done.", Vec::new()),
    ]);
    let gateway = Arc::new(RecordingGateway::new());
    let runtime = runtime(provider, Arc::clone(&gateway), InMemoryFeeLedger::new());

    let result = runtime
        .run(ADDITIONAL_STUDENT_BILLING, billing_input())
        .await
        .expect("billing should complete");

    let first = &result.tool_calls[0];
    assert_eq!(
        first.error().map(|error| error.kind),
        Some(ToolErrorKind::InputInvalid)
    );
    assert!(first.delivery.is_none());
    assert!(result.tool_calls[1].is_success());
    assert!(result.tool_calls[2].is_success());
    assert!(result.satisfied);
    assert_eq!(gateway.sent().len(), 2);
}

#[tokio::test]
async fn fee_reminders_count_deliveries_not_the_model_claim() {
    let provider = ScriptedProvider::new(vec![
        tools(vec![call("call_fees", "getPendingFees", json!({"schoolName": "Oak"}))]),
        tools(vec![
            email("call_e1", "anne.lovelace@example.com"),
            sms("call_s1", "+15550100001"),
            whatsapp("call_w1", "+15550100001"),
            email("call_e2", "rosa.carter@example.com"),
            sms("call_s2", "+15550100002"),
            whatsapp("call_w2", "+15550100002"),
        ]),
        reply(r#"{"remindersSent": 6, "summary": "Reminded every parent."}"#, Vec::new()),
    ]);
    let gateway = Arc::new(
        RecordingGateway::new().failing_for(NotificationChannel::WhatsApp, "+15550100002"),
    );
    let runtime = runtime(
        Arc::clone(&provider),
        Arc::clone(&gateway),
        InMemoryFeeLedger::sample(),
    );

    let result = runtime
        .run(SEND_FEE_REMINDERS, json!({"schoolName": "Oak"}))
        .await
        .expect("reminders should complete");

    assert!(result.satisfied);
    assert_eq!(result.status, "Sent 5 fee reminders for 2 students at Oak.");
    assert_eq!(result.tool_rounds, 2);
    assert_eq!(result.failed_calls().count(), 1);

    let output = result.structured_output.expect("policy output");
    assert_eq!(output["remindersSent"], 5);
    assert_eq!(output["studentsReached"], 2);
    assert_eq!(output["students"][0]["studentName"], "Ada Lovelace");
    assert_eq!(output["students"][0]["channels"], json!(["sms", "whatsapp", "email"]));
    assert_eq!(output["students"][1]["channels"], json!(["sms", "email"]));

    assert_eq!(gateway.sent().len(), 5);
    assert_eq!(provider.requests().len(), 3);
}

#[tokio::test]
async fn fee_reminders_closing_in_prose_keep_the_ledger_count() {
    let provider = ScriptedProvider::new(vec![
        tools(vec![call("call_fees", "getPendingFees", json!({"schoolName": "Oak"}))]),
        tools(vec![
            email("call_e1", "anne.lovelace@example.com"),
            sms("call_s1", "+15550100001"),
            whatsapp("call_w1", "+15550100001"),
            email("call_e2", "rosa.carter@example.com"),
            sms("call_s2", "+15550100002"),
            whatsapp("call_w2", "+15550100002"),
        ]),
        reply("All parents have been reminded.", Vec::new()),
    ]);
    let gateway = Arc::new(RecordingGateway::new());
    let runtime = runtime(provider, Arc::clone(&gateway), InMemoryFeeLedger::sample());

    let result = runtime
        .run(SEND_FEE_REMINDERS, json!({"schoolName": "Oak"}))
        .await
        .expect("reminders were sent, so prose is not an error");

    assert!(result.satisfied);
    assert_eq!(result.status, "Sent 6 fee reminders for 2 students at Oak.");
    assert_eq!(result.state, FlowState::Completed);
    assert_eq!(
        result.follow_up_error.as_ref().map(|error| error.kind),
        Some(FlowErrorKind::MalformedOutput)
    );
    let output = result.structured_output.expect("policy output");
    assert_eq!(output["remindersSent"], 6);
    assert_eq!(output["studentsReached"], 2);
    assert_eq!(gateway.sent().len(), 6);
}

#[tokio::test]
async fn fee_reminders_without_lookup_are_unsatisfied() {
    let provider = ScriptedProvider::new(vec![reply(r#"{"remindersSent": 3}"#, Vec::new())]);
    let gateway = Arc::new(RecordingGateway::new());
    let runtime = runtime(provider, gateway, InMemoryFeeLedger::sample());

    let result = runtime
        .run(SEND_FEE_REMINDERS, json!({"schoolName": "Oak"}))
        .await
        .expect("reminders should complete");

    assert!(!result.satisfied);
    assert_eq!(result.status, FEES_NOT_CHECKED_STATUS);
    assert_eq!(result.structured_output, Some(json!({"remindersSent": 3})));
}

#[tokio::test]
async fn school_without_pending_fees_sends_nothing() {
    let provider = ScriptedProvider::new(vec![
        tools(vec![call("call_fees", "getPendingFees", json!({"schoolName": "Maple"}))]),
        reply(r#"{"remindersSent": 0}"#, Vec::new()),
    ]);
    let gateway = Arc::new(RecordingGateway::new());
    let runtime = runtime(provider, Arc::clone(&gateway), InMemoryFeeLedger::sample());

    let result = runtime
        .run(SEND_FEE_REMINDERS, json!({"schoolName": "Maple"}))
        .await
        .expect("reminders should complete");

    assert!(result.satisfied);
    assert_eq!(result.status, "No pending fees for Maple.");
    assert_eq!(result.structured_output.expect("output")["students"], json!([]));
    assert!(gateway.sent().is_empty());
}

#[tokio::test]
async fn voice_command_navigates() {
    let provider = ScriptedProvider::new(vec![
        tools(vec![call("call_nav", "navigate", json!({"page": "fees"}))]),
        reply("Opening the fees page.", Vec::new()),
    ]);
    let runtime = runtime(
        provider,
        Arc::new(RecordingGateway::new()),
        InMemoryFeeLedger::new(),
    );

    let result = runtime
        .run(VOICE_COMMAND, json!({"command": "show me unpaid fees"}))
        .await
        .expect("voice command should complete");

    assert!(result.satisfied);
    assert_eq!(result.status, "Navigating to Fees.");
    assert_eq!(
        result.structured_output,
        Some(json!({"page": "fees", "label": "Fees", "path": "/dashboard/fees"}))
    );
}

#[tokio::test]
async fn quiz_with_requested_question_count_is_satisfied() {
    let quiz = json!({
        "title": "Fractions",
        "questions": [
            {"question": "1/2 + 1/2?", "options": ["1", "2"], "correctAnswer": "1"},
            {"question": "1/4 of 8?", "options": ["2", "4"], "correctAnswer": "2"}
        ]
    });
    let provider = ScriptedProvider::new(vec![reply(
        &format!("```json\n{quiz}\n```"),
        Vec::new(),
    )]);
    let runtime = runtime(
        Arc::clone(&provider),
        Arc::new(RecordingGateway::new()),
        InMemoryFeeLedger::new(),
    );

    let result = runtime
        .run(
            GENERATE_QUIZ,
            json!({"topic": "Fractions", "numberOfQuestions": 2, "difficulty": "easy"}),
        )
        .await
        .expect("quiz should complete");

    assert!(result.satisfied);
    assert_eq!(result.status, "Quiz with 2 questions ready.");
    assert_eq!(result.structured_output, Some(quiz));
    let requests = provider.requests();
    assert!(requests[0].tools.is_empty());
    assert!(requests[0].output_schema.is_some());
}

#[tokio::test]
async fn unparseable_quiz_is_a_malformed_output_error() {
    let provider = ScriptedProvider::new(vec![reply("Here are some questions!", Vec::new())]);
    let runtime = runtime(
        provider,
        Arc::new(RecordingGateway::new()),
        InMemoryFeeLedger::new(),
    );

    let error = runtime
        .orchestrator
        .run(InvocationRequest::new(
            GENERATE_QUIZ,
            json!({"topic": "Fractions", "numberOfQuestions": 2, "difficulty": "easy"}),
        ))
        .await
        .expect_err("prose is not a quiz");

    assert_eq!(error.kind, FlowErrorKind::MalformedOutput);
}

#[tokio::test]
async fn summarize_rejects_remote_urls_before_calling_the_model() {
    let provider = ScriptedProvider::new(Vec::new());
    let runtime = runtime(
        Arc::clone(&provider),
        Arc::new(RecordingGateway::new()),
        InMemoryFeeLedger::new(),
    );

    let error = runtime
        .orchestrator
        .run(InvocationRequest::new(
            SUMMARIZE_DOCUMENT,
            json!({"documentDataUri": "https://example.com/scan.png"}),
        ))
        .await
        .expect_err("remote url should be rejected");

    assert_eq!(error.kind, FlowErrorKind::InputInvalid);
    assert!(
        error
            .field_errors
            .as_ref()
            .is_some_and(|errors| errors.contains("documentDataUri"))
    );
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn summarize_sends_document_as_media() {
    let provider = ScriptedProvider::new(vec![reply(
        r#"{"extractedText": "Term starts Monday.", "summary": "Term start notice.", "keyPoints": ["Monday"]}"#,
        Vec::new(),
    )]);
    let runtime = runtime(
        Arc::clone(&provider),
        Arc::new(RecordingGateway::new()),
        InMemoryFeeLedger::new(),
    );
    let document = "data:image/png;base64,iVBORw0KGgo=";

    let result = runtime
        .run(SUMMARIZE_DOCUMENT, json!({"documentDataUri": document}))
        .await
        .expect("summary should complete");

    assert!(result.satisfied);
    assert_eq!(result.status, "Document summarized.");

    let requests = provider.requests();
    let prompt = requests[0]
        .messages
        .iter()
        .find(|message| message.role == Role::User)
        .expect("user prompt");
    assert_eq!(prompt.media.len(), 1);
    assert_eq!(prompt.media[0].url, document);
    assert!(!prompt.content.contains("base64"));
}
