//! Outcome policies turn a finished tool-call trace into caller-facing status.
//!
//! A model that answers in prose without acting is a normal outcome here:
//! policies report it as an unsatisfied status, never as an error.

use cprompt::{PromptTemplate, TemplateError};
use serde_json::Value;

use crate::{DeliveryLedger, ToolCallRecord};

pub const NOTIFICATIONS_MISSING_STATUS: &str =
    "AI did not generate the required notifications. Please check the logs.";
pub const ACTION_MISSING_STATUS: &str = "AI did not perform the required action.";
pub const OUTPUT_MISSING_STATUS: &str = "AI did not return a result. Please try again.";

/// Everything a policy may inspect once the tool loop has ended.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeContext<'a> {
    pub flow: &'a str,
    /// Validated input merged with derived variables.
    pub variables: &'a Value,
    pub structured_output: Option<&'a Value>,
    pub raw_text: Option<&'a str>,
    pub records: &'a [ToolCallRecord],
    pub ledger: &'a DeliveryLedger,
}

impl OutcomeContext<'_> {
    pub fn successful_calls_to(&self, tool_name: &str) -> usize {
        self.records
            .iter()
            .filter(|record| record.tool_name == tool_name && record.is_success())
            .count()
    }

    /// Latest successful output of `tool_name`, if any.
    pub fn last_output_of(&self, tool_name: &str) -> Option<&Value> {
        self.records
            .iter()
            .rev()
            .filter(|record| record.tool_name == tool_name)
            .find_map(ToolCallRecord::output)
    }

    pub fn variable_str(&self, name: &str) -> Option<&str> {
        self.variables.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: String,
    pub satisfied: bool,
    /// Replaces the model's structured output when set.
    pub output: Option<Value>,
}

impl Outcome {
    pub fn satisfied(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            satisfied: true,
            output: None,
        }
    }

    pub fn unsatisfied(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            satisfied: false,
            output: None,
        }
    }

    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }
}

pub trait OutcomePolicy: Send + Sync {
    fn evaluate(&self, context: &OutcomeContext<'_>) -> Outcome;
}

/// Satisfied when the model returned structured output or any tool succeeded.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultOutcomePolicy;

impl OutcomePolicy for DefaultOutcomePolicy {
    fn evaluate(&self, context: &OutcomeContext<'_>) -> Outcome {
        if context.structured_output.is_some() || context.records.iter().any(|r| r.is_success()) {
            return Outcome::satisfied("Completed.");
        }

        match context.raw_text.filter(|text| !text.trim().is_empty()) {
            Some(text) => Outcome::satisfied(text.trim()),
            None => Outcome::unsatisfied(ACTION_MISSING_STATUS),
        }
    }
}

/// Satisfied only when the model returned structured output.
#[derive(Debug, Clone)]
pub struct StructuredOutputPolicy {
    success_status: String,
    failure_status: String,
}

impl Default for StructuredOutputPolicy {
    fn default() -> Self {
        Self {
            success_status: "Completed.".to_string(),
            failure_status: OUTPUT_MISSING_STATUS.to_string(),
        }
    }
}

impl StructuredOutputPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_success_status(mut self, status: impl Into<String>) -> Self {
        self.success_status = status.into();
        self
    }

    pub fn with_failure_status(mut self, status: impl Into<String>) -> Self {
        self.failure_status = status.into();
        self
    }
}

impl OutcomePolicy for StructuredOutputPolicy {
    fn evaluate(&self, context: &OutcomeContext<'_>) -> Outcome {
        match context.structured_output {
            Some(_) => Outcome::satisfied(self.success_status.clone()),
            None => Outcome::unsatisfied(self.failure_status.clone()),
        }
    }
}

/// Requires at least one successful delivery to every recipient named by the
/// listed input variables. The success status is a template over the flow
/// variables.
#[derive(Debug, Clone)]
pub struct RequiredDeliveriesPolicy {
    recipient_fields: Vec<String>,
    success: PromptTemplate,
    failure_status: String,
}

impl RequiredDeliveriesPolicy {
    pub fn new(success_template: impl Into<String>) -> Result<Self, TemplateError> {
        Ok(Self {
            recipient_fields: Vec::new(),
            success: PromptTemplate::parse(success_template)?,
            failure_status: NOTIFICATIONS_MISSING_STATUS.to_string(),
        })
    }

    pub fn require_recipient(mut self, field: impl Into<String>) -> Self {
        self.recipient_fields.push(field.into());
        self
    }

    pub fn with_failure_status(mut self, status: impl Into<String>) -> Self {
        self.failure_status = status.into();
        self
    }

    pub fn recipient_fields(&self) -> &[String] {
        &self.recipient_fields
    }
}

impl OutcomePolicy for RequiredDeliveriesPolicy {
    fn evaluate(&self, context: &OutcomeContext<'_>) -> Outcome {
        let all_reached = !self.recipient_fields.is_empty()
            && self.recipient_fields.iter().all(|field| {
                context
                    .variable_str(field)
                    .is_some_and(|recipient| context.ledger.delivered_to(recipient))
            });

        if all_reached {
            // Only a helper misuse in the status template fails here.
            let status = self
                .success
                .render(context.variables)
                .map(|rendered| rendered.text)
                .unwrap_or_else(|_| self.success.source().to_string());
            Outcome::satisfied(status)
        } else {
            Outcome::unsatisfied(self.failure_status.clone())
        }
    }
}

/// Adapts a closure into a policy.
pub struct FnOutcomePolicy<F> {
    evaluate: F,
}

impl<F> FnOutcomePolicy<F>
where
    F: Fn(&OutcomeContext<'_>) -> Outcome + Send + Sync,
{
    pub fn new(evaluate: F) -> Self {
        Self { evaluate }
    }
}

impl<F> OutcomePolicy for FnOutcomePolicy<F>
where
    F: Fn(&OutcomeContext<'_>) -> Outcome + Send + Sync,
{
    fn evaluate(&self, context: &OutcomeContext<'_>) -> Outcome {
        (self.evaluate)(context)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ctooling::{NotificationChannel, ToolError};
    use serde_json::json;

    use super::*;
    use crate::Delivery;

    fn sms(recipient: &str, ok: bool) -> ToolCallRecord {
        ToolCallRecord {
            call_id: format!("call_{recipient}"),
            tool_name: "sendSms".to_string(),
            round: 1,
            input: json!({"to": recipient}),
            result: if ok {
                Ok(json!({"status": "queued"}))
            } else {
                Err(ToolError::execution("gateway down"))
            },
            elapsed: Duration::ZERO,
            delivery: Some(Delivery::new(NotificationChannel::Sms, recipient)),
        }
    }

    fn context<'a>(
        variables: &'a Value,
        records: &'a [ToolCallRecord],
        ledger: &'a DeliveryLedger,
    ) -> OutcomeContext<'a> {
        OutcomeContext {
            flow: "billing",
            variables,
            structured_output: None,
            raw_text: None,
            records,
            ledger,
        }
    }

    fn billing_policy() -> RequiredDeliveriesPolicy {
        RequiredDeliveriesPolicy::new("Billing notifications initiated for {{schoolName}}.")
            .expect("status template should parse")
            .require_recipient("principalContact")
            .require_recipient("adminPhoneNumber")
    }

    #[test]
    fn required_deliveries_need_every_recipient() {
        let variables = json!({
            "schoolName": "Oak",
            "principalContact": "+1",
            "adminPhoneNumber": "+2"
        });

        let records = vec![sms("+1", true), sms("+2", true)];
        let ledger = DeliveryLedger::from_records(&records);
        let outcome = billing_policy().evaluate(&context(&variables, &records, &ledger));
        assert!(outcome.satisfied);
        assert_eq!(outcome.status, "Billing notifications initiated for Oak.");

        let records = vec![sms("+1", true), sms("+2", false)];
        let ledger = DeliveryLedger::from_records(&records);
        let outcome = billing_policy().evaluate(&context(&variables, &records, &ledger));
        assert!(!outcome.satisfied);
        assert_eq!(outcome.status, NOTIFICATIONS_MISSING_STATUS);
    }

    #[test]
    fn default_policy_reports_models_that_only_talk() {
        let variables = json!({});
        let ledger = DeliveryLedger::default();

        let silent = DefaultOutcomePolicy.evaluate(&context(&variables, &[], &ledger));
        assert!(!silent.satisfied);
        assert_eq!(silent.status, ACTION_MISSING_STATUS);

        let talking = OutcomeContext {
            raw_text: Some("  Navigating to fees.  "),
            ..context(&variables, &[], &ledger)
        };
        assert_eq!(
            DefaultOutcomePolicy.evaluate(&talking).status,
            "Navigating to fees."
        );
    }

    #[test]
    fn structured_output_policy_requires_output() {
        let variables = json!({});
        let ledger = DeliveryLedger::default();
        let output = json!({"summary": "ok"});
        let policy = StructuredOutputPolicy::new().with_success_status("Summary ready.");

        let missing = policy.evaluate(&context(&variables, &[], &ledger));
        assert!(!missing.satisfied);
        assert_eq!(missing.status, OUTPUT_MISSING_STATUS);

        let present = OutcomeContext {
            structured_output: Some(&output),
            ..context(&variables, &[], &ledger)
        };
        assert_eq!(policy.evaluate(&present), Outcome::satisfied("Summary ready."));
    }

    #[test]
    fn closures_can_build_outputs() {
        let variables = json!({});
        let records = vec![sms("+1", true), sms("+2", false)];
        let ledger = DeliveryLedger::from_records(&records);
        let policy = FnOutcomePolicy::new(|context| {
            Outcome::satisfied("counted")
                .with_output(json!({"sent": context.successful_calls_to("sendSms")}))
        });

        let outcome = policy.evaluate(&context(&variables, &records, &ledger));
        assert_eq!(outcome.output, Some(json!({"sent": 1})));
    }
}
