//! Fee reminders: look up pending balances, then remind every parent on
//! email, SMS and WhatsApp.
//!
//! `remindersSent` is recomputed from the delivery ledger. The model's own
//! count is never trusted.

use std::collections::BTreeSet;

use cflow::{
    FlowDefinition, FlowError, NOTIFICATIONS_MISSING_STATUS, Outcome, OutcomeContext,
    OutcomePolicy,
};
use cschema::{Field, ObjectSchema};
use ctooling::NotificationChannel;
use serde_json::{Value, json};

use crate::fees::GET_PENDING_FEES;
use crate::notify::{SEND_EMAIL, SEND_SMS, SEND_WHATSAPP};

pub const SEND_FEE_REMINDERS: &str = "sendFeeReminders";

pub const FEES_NOT_CHECKED_STATUS: &str = "AI did not look up pending fees. Please try again.";

const SYSTEM: &str = "\
You are the accounts assistant of CampusConnect. You remind parents about unpaid school fees \
in a warm, respectful tone. Use the provided tools for every lookup and every message.";

const PROMPT: &str = "\
Send fee reminders for {{schoolName}}.

1. Call getPendingFees with schoolName \"{{schoolName}}\".
2. For every student returned, remind the parent on all three channels:
   sendEmail to parentEmail, then sendSms and sendWhatsApp to parentPhone.
   Mention the student's name, the amount due and the due date.
{{#if customNote}}3. Add this note from the school to every message: {{customNote}}
{{/if}}
When every reminder has been attempted, reply with the result object.";

pub fn input_shape() -> ObjectSchema {
    ObjectSchema::builder()
        .field(Field::string("schoolName").min_length(1).max_length(200))
        .field(
            Field::string("customNote")
                .max_length(500)
                .optional()
                .describe("Extra text appended to each reminder"),
        )
        .build()
}

pub fn output_shape() -> ObjectSchema {
    ObjectSchema::builder()
        .field(
            Field::integer("remindersSent")
                .min(0.0)
                .optional()
                .describe("Number of reminders delivered"),
        )
        .field(Field::string("summary").optional())
        .build()
}

pub fn flow() -> Result<FlowDefinition, FlowError> {
    FlowDefinition::builder(SEND_FEE_REMINDERS)
        .description("Remind parents of students with unpaid fees on every channel.")
        .input(input_shape())
        .output(output_shape())
        .system(SYSTEM)
        .prompt(PROMPT)
        .tools([GET_PENDING_FEES, SEND_EMAIL, SEND_SMS, SEND_WHATSAPP])
        .outcome(FeeReminderPolicy)
        .build()
}

/// Reports reminders per student from the latest successful fee lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeeReminderPolicy;

impl OutcomePolicy for FeeReminderPolicy {
    fn evaluate(&self, context: &OutcomeContext<'_>) -> Outcome {
        let Some(lookup) = context.last_output_of(GET_PENDING_FEES) else {
            return Outcome::unsatisfied(FEES_NOT_CHECKED_STATUS);
        };

        let school = context.variable_str("schoolName").unwrap_or_default();
        let students = lookup
            .get("students")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        if students.is_empty() {
            return Outcome::satisfied(format!("No pending fees for {school}."))
                .with_output(json!({ "remindersSent": 0, "studentsReached": 0, "students": [] }));
        }

        let reminders_sent = context.ledger.len();
        let summaries = students
            .iter()
            .map(|student| student_summary(context, student))
            .collect::<Vec<_>>();
        let reached = summaries
            .iter()
            .filter(|summary| !summary.channels.is_empty())
            .count();

        let output = json!({
            "remindersSent": reminders_sent,
            "studentsReached": reached,
            "students": summaries.iter().map(StudentSummary::to_json).collect::<Vec<_>>(),
        });

        let outcome = if reached == students.len() {
            Outcome::satisfied(format!(
                "Sent {reminders_sent} fee reminders for {} students at {school}.",
                students.len()
            ))
        } else if reminders_sent > 0 {
            Outcome::unsatisfied(format!(
                "Sent {reminders_sent} fee reminders; {} of {} students were not reached.",
                students.len() - reached,
                students.len()
            ))
        } else {
            Outcome::unsatisfied(NOTIFICATIONS_MISSING_STATUS)
        };

        outcome.with_output(output)
    }
}

struct StudentSummary {
    name: String,
    channels: BTreeSet<NotificationChannel>,
}

impl StudentSummary {
    fn to_json(&self) -> Value {
        json!({
            "studentName": self.name,
            "channels": self.channels.iter().map(|channel| channel.as_str()).collect::<Vec<_>>(),
        })
    }
}

fn student_summary(context: &OutcomeContext<'_>, student: &Value) -> StudentSummary {
    let mut channels = BTreeSet::new();
    for field in ["parentEmail", "parentPhone"] {
        if let Some(address) = student.get(field).and_then(Value::as_str) {
            channels.extend(context.ledger.channels_for(address));
        }
    }

    StudentSummary {
        name: student["studentName"].as_str().unwrap_or_default().to_string(),
        channels,
    }
}
