//! Notification gateway and the `sendSms` / `sendWhatsApp` / `sendEmail` tools.
//!
//! Tools validate the address format before the gateway is reached. A
//! gateway failure fails only the tool call that hit it.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use campusflow::notify::{RecordingGateway, register_notification_tools};
//! use ctooling::{NotificationChannel, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! register_notification_tools(&mut registry, Arc::new(RecordingGateway::new()));
//!
//! let sms = registry.spec("sendSms").expect("sendSms should be registered");
//! assert_eq!(sms.delivery.expect("delivery").channel, NotificationChannel::Sms);
//! ```

use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use ccommon::BoxFuture;
use cschema::{Field, ObjectSchema, StringFormat};
use ctooling::{
    NotificationChannel, ToolError, ToolErrorKind, ToolExecutionContext, ToolRegistry, ToolSpec,
    from_input, to_output,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SEND_SMS: &str = "sendSms";
pub const SEND_WHATSAPP: &str = "sendWhatsApp";
pub const SEND_EMAIL: &str = "sendEmail";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: NotificationChannel,
    pub recipient: String,
    /// Email only.
    pub subject: Option<String>,
    pub body: String,
}

impl Notification {
    pub fn new(
        channel: NotificationChannel,
        recipient: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
            subject: None,
            body: body.into(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub message_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// The recipient or content was refused.
    Rejected,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Rejected,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Unavailable,
            message: message.into(),
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for ToolError {
    fn from(value: GatewayError) -> Self {
        let retryable = value.kind == GatewayErrorKind::Unavailable;
        ToolError::new(
            ToolErrorKind::Execution,
            format!("notification was not sent: {}", value.message),
            retryable,
        )
    }
}

pub trait NotificationGateway: Send + Sync + Debug {
    fn send<'a>(&'a self, notification: Notification)
    -> BoxFuture<'a, Result<Receipt, GatewayError>>;
}

/// Accepts every notification and logs it.
#[derive(Debug, Default)]
pub struct LoggingGateway {
    sequence: AtomicU64,
}

impl LoggingGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationGateway for LoggingGateway {
    fn send<'a>(
        &'a self,
        notification: Notification,
    ) -> BoxFuture<'a, Result<Receipt, GatewayError>> {
        Box::pin(async move {
            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
            let message_id = format!("{}-{sequence}", notification.channel);

            tracing::info!(
                phase = "notify",
                event = "sent",
                channel = notification.channel.as_str(),
                recipient = notification.recipient.as_str(),
                subject = notification.subject.as_deref(),
                body_chars = notification.body.chars().count() as u64,
                message_id = message_id.as_str()
            );

            Ok(Receipt { message_id })
        })
    }
}

/// Keeps every accepted notification in memory. Selected channel and
/// recipient pairs can be made to fail.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<Notification>>,
    failures: Vec<(NotificationChannel, String)>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(
        mut self,
        channel: NotificationChannel,
        recipient: impl Into<String>,
    ) -> Self {
        self.failures.push((channel, recipient.into()));
        self
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|notification| notification.recipient == recipient)
            .collect()
    }

    fn should_fail(&self, notification: &Notification) -> bool {
        self.failures.iter().any(|(channel, recipient)| {
            *channel == notification.channel && *recipient == notification.recipient
        })
    }
}

impl NotificationGateway for RecordingGateway {
    fn send<'a>(
        &'a self,
        notification: Notification,
    ) -> BoxFuture<'a, Result<Receipt, GatewayError>> {
        Box::pin(async move {
            if self.should_fail(&notification) {
                return Err(GatewayError::rejected(format!(
                    "{} delivery to {} was refused",
                    notification.channel, notification.recipient
                )));
            }

            let mut sent = self
                .sent
                .lock()
                .map_err(|_| GatewayError::unavailable("recording gateway lock poisoned"))?;
            sent.push(notification);
            Ok(Receipt {
                message_id: format!("recorded-{}", sent.len()),
            })
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessageArgs {
    to: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct EmailArgs {
    to: String,
    subject: String,
    body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendOutput {
    status: &'static str,
    message_id: String,
}

fn send_output() -> ObjectSchema {
    ObjectSchema::builder()
        .field(Field::enumeration("status", ["sent"]))
        .field(Field::string("messageId").min_length(1))
        .build()
}

fn message_spec(
    name: &str,
    description: &str,
    channel: NotificationChannel,
    max_length: usize,
) -> ToolSpec {
    ToolSpec::new(name, description)
        .with_input(
            ObjectSchema::builder()
                .field(
                    Field::string("to")
                        .format(StringFormat::Phone)
                        .describe("Recipient phone number in international format"),
                )
                .field(
                    Field::string("message")
                        .min_length(1)
                        .max_length(max_length)
                        .describe("Message text"),
                )
                .build(),
        )
        .with_output(send_output())
        .with_delivery(channel, "to")
}

pub fn sms_spec() -> ToolSpec {
    message_spec(
        SEND_SMS,
        "Send an SMS text message to a phone number.",
        NotificationChannel::Sms,
        1600,
    )
}

pub fn whatsapp_spec() -> ToolSpec {
    message_spec(
        SEND_WHATSAPP,
        "Send a WhatsApp message to a phone number.",
        NotificationChannel::WhatsApp,
        4096,
    )
}

pub fn email_spec() -> ToolSpec {
    ToolSpec::new(SEND_EMAIL, "Send an email to an address.")
        .with_input(
            ObjectSchema::builder()
                .field(
                    Field::string("to")
                        .format(StringFormat::Email)
                        .describe("Recipient email address"),
                )
                .field(Field::string("subject").min_length(1).max_length(200))
                .field(Field::string("body").min_length(1))
                .build(),
        )
        .with_output(send_output())
        .with_delivery(NotificationChannel::Email, "to")
}

pub fn register_notification_tools(
    registry: &mut ToolRegistry,
    gateway: Arc<dyn NotificationGateway>,
) {
    for (spec, channel) in [
        (sms_spec(), NotificationChannel::Sms),
        (whatsapp_spec(), NotificationChannel::WhatsApp),
    ] {
        let gateway = Arc::clone(&gateway);
        registry.register_fn(spec, move |input, context| {
            let gateway = Arc::clone(&gateway);
            async move {
                let args: MessageArgs = from_input(input)?;
                deliver(
                    gateway.as_ref(),
                    Notification::new(channel, args.to, args.message),
                    &context,
                )
                .await
            }
        });
    }

    registry.register_fn(email_spec(), move |input, context| {
        let gateway = Arc::clone(&gateway);
        async move {
            let args: EmailArgs = from_input(input)?;
            let notification = Notification::new(NotificationChannel::Email, args.to, args.body)
                .with_subject(args.subject);
            deliver(gateway.as_ref(), notification, &context).await
        }
    });
}

async fn deliver(
    gateway: &dyn NotificationGateway,
    notification: Notification,
    context: &ToolExecutionContext,
) -> Result<Value, ToolError> {
    let channel = notification.channel;
    let receipt = gateway.send(notification).await.map_err(|error| {
        tracing::warn!(
            phase = "notify",
            event = "rejected",
            channel = channel.as_str(),
            invocation_id = %context.invocation_id,
            error = %error
        );
        ToolError::from(error)
    })?;

    to_output(&SendOutput {
        status: "sent",
        message_id: receipt.message_id,
    })
}
