//! Tool declarations: name, description, input and output shapes, and an
//! optional delivery descriptor for notification tools.
//!
//! ```rust
//! use ctooling::{NotificationChannel, ToolSpec};
//! use cschema::{Field, ObjectSchema, StringFormat};
//!
//! let spec = ToolSpec::new("sendSms", "Send an SMS to a phone number")
//!     .with_input(
//!         ObjectSchema::builder()
//!             .field(Field::string("to").format(StringFormat::Phone))
//!             .field(Field::string("message").min_length(1))
//!             .build(),
//!     )
//!     .with_delivery(NotificationChannel::Sms, "to");
//!
//! let declared = spec.to_model_definition();
//! assert_eq!(declared.name, "sendSms");
//! assert_eq!(declared.input_schema["required"][0], "to");
//! ```

use std::fmt::{Display, Formatter};

use cprovider::ToolDefinition;
use cschema::ObjectSchema;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NotificationChannel {
    Sms,
    WhatsApp,
    Email,
}

impl NotificationChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::WhatsApp => "whatsapp",
            Self::Email => "email",
        }
    }
}

impl Display for NotificationChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marks a tool as a notification sender. `recipient_field` names the input
/// field holding the destination address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTarget {
    pub channel: NotificationChannel,
    pub recipient_field: String,
}

impl DeliveryTarget {
    pub fn recipient_in<'v>(&self, input: &'v Value) -> Option<&'v str> {
        input.get(self.recipient_field.as_str()).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input: ObjectSchema,
    pub output: ObjectSchema,
    pub delivery: Option<DeliveryTarget>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input: ObjectSchema::empty(),
            output: ObjectSchema::empty(),
            delivery: None,
        }
    }

    pub fn with_input(mut self, input: ObjectSchema) -> Self {
        self.input = input;
        self
    }

    pub fn with_output(mut self, output: ObjectSchema) -> Self {
        self.output = output;
        self
    }

    pub fn with_delivery(
        mut self,
        channel: NotificationChannel,
        recipient_field: impl Into<String>,
    ) -> Self {
        self.delivery = Some(DeliveryTarget {
            channel,
            recipient_field: recipient_field.into(),
        });
        self
    }

    /// Declaration sent to the model; the output shape stays local.
    pub fn to_model_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input.to_json_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn delivery_target_reads_recipient_from_input() {
        let spec = ToolSpec::new("sendEmail", "Send an email").with_delivery(
            NotificationChannel::Email,
            "to",
        );
        let target = spec.delivery.expect("delivery should be set");

        assert_eq!(
            target.recipient_in(&json!({"to": "p@oak.edu", "subject": "Fees"})),
            Some("p@oak.edu")
        );
        assert_eq!(target.recipient_in(&json!({"subject": "Fees"})), None);
        assert_eq!(target.channel.to_string(), "email");
    }

    #[test]
    fn tools_without_shapes_declare_empty_objects() {
        let declared = ToolSpec::new("getPendingFees", "List unpaid fees").to_model_definition();
        assert_eq!(declared.input_schema["type"], "object");
        assert_eq!(declared.input_schema["required"], json!([]));
    }
}
