use std::sync::{Arc, Mutex};

use cprovider::ToolCall;
use cschema::{Field, ObjectSchema, StringFormat};
use ctooling::{
    DefaultToolRuntime, NotificationChannel, ToolErrorKind, ToolExecutionContext, ToolRegistry,
    ToolRuntime, ToolSpec, from_input, to_output,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct SmsArgs {
    to: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmsReceipt {
    status: &'static str,
    to: String,
}

fn sms_registry(outbox: Arc<Mutex<Vec<String>>>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register_sync_fn(
        ToolSpec::new("sendSms", "Send an SMS to a phone number")
            .with_input(
                ObjectSchema::builder()
                    .field(Field::string("to").format(StringFormat::Phone))
                    .field(Field::string("message").min_length(1))
                    .build(),
            )
            .with_output(
                ObjectSchema::builder()
                    .field(Field::string("status"))
                    .field(Field::string("to"))
                    .build(),
            )
            .with_delivery(NotificationChannel::Sms, "to"),
        move |input, _ctx| {
            let args: SmsArgs = from_input(input)?;
            outbox
                .lock()
                .expect("outbox lock")
                .push(format!("{}:{}", args.to, args.message));
            to_output(&SmsReceipt {
                status: "queued",
                to: args.to,
            })
        },
    );
    registry
}

fn call(id: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: "sendSms".to_string(),
        arguments: arguments.to_string(),
    }
}

#[tokio::test]
async fn malformed_recipient_fails_one_call_and_later_calls_still_run() {
    let outbox = Arc::new(Mutex::new(Vec::new()));
    let runtime = DefaultToolRuntime::new(Arc::new(sms_registry(outbox.clone())));
    let context = ToolExecutionContext::new("inv-scenario-d").with_trace_id("trace-1");

    let calls = [
        call("call_1", r#"{"to":"not-a-phone","message":"Fees due"}"#),
        call("call_2", r#"{"to":"+15550002","message":"Fees due"}"#),
    ];

    let mut outcomes = Vec::new();
    for tool_call in calls {
        outcomes.push(runtime.execute(tool_call, context.clone()).await);
    }

    let first = outcomes[0].as_ref().expect_err("bad phone should fail");
    assert_eq!(first.kind, ToolErrorKind::InputInvalid);
    assert_eq!(first.tool_call_id.as_deref(), Some("call_1"));

    let second = outcomes[1].as_ref().expect("valid phone should succeed");
    assert_eq!(second.output["status"], "queued");
    assert_eq!(
        outbox.lock().expect("outbox lock").clone(),
        vec!["+15550002:Fees due".to_string()]
    );
}

#[tokio::test]
async fn runtime_exposes_delivery_descriptors_through_its_registry() {
    let runtime = DefaultToolRuntime::new(Arc::new(sms_registry(Arc::default())));

    let spec = runtime
        .registry()
        .spec("sendSms")
        .expect("sendSms should be registered");
    let delivery = spec.delivery.expect("sendSms is a notification tool");

    assert_eq!(delivery.channel, NotificationChannel::Sms);
    assert_eq!(delivery.recipient_field, "to");
}
