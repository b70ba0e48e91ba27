//! Additional-student billing notifications.
//!
//! The principal and the administrator must each receive at least one
//! message before the flow reports success.

use cflow::{FlowDefinition, FlowError, RequiredDeliveriesPolicy};
use cschema::{Field, ObjectSchema, StringFormat};
use serde_json::{Map, Value, json};

use crate::notify::{SEND_SMS, SEND_WHATSAPP};

pub const ADDITIONAL_STUDENT_BILLING: &str = "additionalStudentBilling";

const SYSTEM: &str = "\
You are the billing assistant of CampusConnect, a school management platform. \
You inform school leadership about charges for students enrolled beyond their plan. \
Always deliver messages with the provided tools. Never answer with prose instead of sending.";

const PROMPT: &str = "\
{{schoolName}} enrolled {{additionalStudentCount}} additional students at \
{{amountPerStudent}} per student. The total amount due is {{totalAmountDue}}.

Send the principal at {{principalContact}} one SMS and one WhatsApp message.
Send the administrator at {{adminPhoneNumber}} one SMS.

Every message names the school, the number of additional students and the total amount due.";

pub fn input_shape() -> ObjectSchema {
    ObjectSchema::builder()
        .field(Field::string("schoolName").min_length(1).max_length(200))
        .field(
            Field::integer("additionalStudentCount")
                .min(1.0)
                .describe("Students enrolled beyond the plan"),
        )
        .field(Field::number("amountPerStudent").positive())
        .field(
            Field::string("principalContact")
                .format(StringFormat::Phone)
                .describe("Principal's phone number"),
        )
        .field(
            Field::string("adminPhoneNumber")
                .format(StringFormat::Phone)
                .describe("School administrator's phone number"),
        )
        .build()
}

pub fn flow() -> Result<FlowDefinition, FlowError> {
    let outcome = RequiredDeliveriesPolicy::new("Billing notifications initiated for {{schoolName}}.")?
        .require_recipient("principalContact")
        .require_recipient("adminPhoneNumber");

    FlowDefinition::builder(ADDITIONAL_STUDENT_BILLING)
        .description("Notify the principal and administrator about additional-student charges.")
        .input(input_shape())
        .system(SYSTEM)
        .prompt(PROMPT)
        .tools([SEND_SMS, SEND_WHATSAPP])
        .derive(total_amount_due)
        .outcome(outcome)
        .build()
}

/// `additionalStudentCount * amountPerStudent`, rendered without a fraction
/// when the total is whole.
fn total_amount_due(input: &Value) -> Map<String, Value> {
    let count = input["additionalStudentCount"].as_f64().unwrap_or_default();
    let per_student = input["amountPerStudent"].as_f64().unwrap_or_default();
    let total = count * per_student;

    let mut derived = Map::new();
    derived.insert("totalAmountDue".to_string(), whole_or_fraction(total));
    derived
}

fn whole_or_fraction(amount: f64) -> Value {
    if amount.fract() == 0.0 && amount.abs() < i64::MAX as f64 {
        json!(amount as i64)
    } else {
        json!((amount * 100.0).round() / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_rendered_as_a_whole_number() {
        let flow = flow().expect("billing flow should build");
        let variables = flow.variables(&json!({
            "schoolName": "Oak",
            "additionalStudentCount": 5,
            "amountPerStudent": 100,
        }));

        assert_eq!(variables["totalAmountDue"], json!(500));
        let rendered = flow.prompt().render(&variables).expect("prompt should render");
        assert!(rendered.text.contains("The total amount due is 500."));
    }

    #[test]
    fn fractional_totals_keep_cents() {
        let derived = total_amount_due(&json!({
            "additionalStudentCount": 3,
            "amountPerStudent": 12.25,
        }));

        assert_eq!(derived["totalAmountDue"], json!(36.75));
    }

    #[test]
    fn rejects_missing_contacts_and_zero_students() {
        let errors = match input_shape().validate(&json!({
            "schoolName": "Oak",
            "additionalStudentCount": 0,
            "amountPerStudent": 100,
            "principalContact": "",
        })) {
            cschema::Validation::Invalid(errors) => errors,
            cschema::Validation::Valid(_) => panic!("input should be rejected"),
        };

        assert!(errors.contains("additionalStudentCount"));
        assert!(errors.contains("principalContact"));
        assert!(errors.contains("adminPhoneNumber"));
    }

    #[test]
    fn declares_only_sms_and_whatsapp() {
        let flow = flow().expect("billing flow should build");
        assert_eq!(flow.tool_names(), &[SEND_SMS.to_string(), SEND_WHATSAPP.to_string()]);
    }
}
