//! Pending-fee lookup and the `getPendingFees` tool.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use ccommon::BoxFuture;
use cschema::{Field, FieldType, ObjectSchema, StringFormat};
use ctooling::{ToolError, ToolRegistry, ToolSpec, from_input, to_output};
use serde::{Deserialize, Serialize};

pub const GET_PENDING_FEES: &str = "getPendingFees";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFee {
    pub student_name: String,
    pub class_name: String,
    pub parent_name: String,
    pub parent_email: String,
    pub parent_phone: String,
    pub amount_due: f64,
    /// ISO date, `YYYY-MM-DD`.
    pub due_date: String,
}

pub trait PendingFeeSource: Send + Sync + Debug {
    fn pending_fees<'a>(
        &'a self,
        school: &'a str,
    ) -> BoxFuture<'a, Result<Vec<PendingFee>, ToolError>>;
}

/// Fee records keyed by school name, compared case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFeeLedger {
    schools: HashMap<String, Vec<PendingFee>>,
}

impl InMemoryFeeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_school(mut self, school: &str, fees: Vec<PendingFee>) -> Self {
        self.schools.insert(school_key(school), fees);
        self
    }

    /// Two outstanding balances at "Oak".
    pub fn sample() -> Self {
        Self::new().with_school(
            "Oak",
            vec![
                PendingFee {
                    student_name: "Ada Lovelace".to_string(),
                    class_name: "Grade 5".to_string(),
                    parent_name: "Anne Lovelace".to_string(),
                    parent_email: "anne.lovelace@example.com".to_string(),
                    parent_phone: "+15550100001".to_string(),
                    amount_due: 250.0,
                    due_date: "2026-11-01".to_string(),
                },
                PendingFee {
                    student_name: "Ben Carter".to_string(),
                    class_name: "Grade 7".to_string(),
                    parent_name: "Rosa Carter".to_string(),
                    parent_email: "rosa.carter@example.com".to_string(),
                    parent_phone: "+15550100002".to_string(),
                    amount_due: 120.5,
                    due_date: "2026-11-15".to_string(),
                },
            ],
        )
    }
}

impl PendingFeeSource for InMemoryFeeLedger {
    fn pending_fees<'a>(
        &'a self,
        school: &'a str,
    ) -> BoxFuture<'a, Result<Vec<PendingFee>, ToolError>> {
        Box::pin(async move {
            Ok(self
                .schools
                .get(&school_key(school))
                .cloned()
                .unwrap_or_default())
        })
    }
}

fn school_key(school: &str) -> String {
    school.trim().to_lowercase()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupArgs {
    school_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupOutput {
    school_name: String,
    students: Vec<PendingFee>,
    total_outstanding: f64,
}

fn pending_fee_shape() -> ObjectSchema {
    ObjectSchema::builder()
        .field(Field::string("studentName").min_length(1))
        .field(Field::string("className"))
        .field(Field::string("parentName"))
        .field(Field::string("parentEmail").format(StringFormat::Email))
        .field(Field::string("parentPhone").format(StringFormat::Phone))
        .field(Field::number("amountDue").min(0.0))
        .field(Field::string("dueDate"))
        .build()
}

pub fn pending_fees_spec() -> ToolSpec {
    ToolSpec::new(
        GET_PENDING_FEES,
        "List students at a school with outstanding fees, including parent contact details.",
    )
    .with_input(
        ObjectSchema::builder()
            .field(Field::string("schoolName").min_length(1))
            .build(),
    )
    .with_output(
        ObjectSchema::builder()
            .field(Field::string("schoolName"))
            .field(Field::array(
                "students",
                FieldType::object(pending_fee_shape()),
            ))
            .field(Field::number("totalOutstanding").min(0.0))
            .build(),
    )
}

pub fn register_fee_tools(registry: &mut ToolRegistry, source: Arc<dyn PendingFeeSource>) {
    registry.register_fn(pending_fees_spec(), move |input, _context| {
        let source = Arc::clone(&source);
        async move {
            let args: LookupArgs = from_input(input)?;
            let students = source.pending_fees(&args.school_name).await?;
            let total_outstanding: f64 = students.iter().map(|fee| fee.amount_due).sum();

            tracing::debug!(
                phase = "fees",
                event = "lookup",
                school = args.school_name.as_str(),
                students = students.len() as u64
            );

            to_output(&LookupOutput {
                school_name: args.school_name,
                students,
                total_outstanding,
            })
        }
    });
}

#[cfg(test)]
mod tests {
    use ctooling::ToolExecutionContext;
    use serde_json::json;

    use super::*;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register_fee_tools(&mut registry, Arc::new(InMemoryFeeLedger::sample()));
        registry
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive_and_totals_balances() {
        let output = registry()
            .invoke(
                GET_PENDING_FEES,
                &json!({"schoolName": "  oak "}),
                &ToolExecutionContext::new("inv-fees"),
            )
            .await
            .expect("lookup should succeed");

        let students = output["students"].as_array().expect("students array");
        assert_eq!(students.len(), 2);
        assert_eq!(students[0]["studentName"], "Ada Lovelace");
        assert_eq!(students[1]["parentPhone"], "+15550100002");
        assert_eq!(output["totalOutstanding"], json!(370.5));
    }

    #[tokio::test]
    async fn unknown_school_has_no_pending_fees() {
        let output = registry()
            .invoke(
                GET_PENDING_FEES,
                &json!({"schoolName": "Maple"}),
                &ToolExecutionContext::new("inv-fees"),
            )
            .await
            .expect("lookup should succeed");

        assert_eq!(output["students"], json!([]));
        assert_eq!(output["totalOutstanding"], json!(0.0));
    }

    #[tokio::test]
    async fn blank_school_name_is_rejected() {
        let error = registry()
            .invoke(
                GET_PENDING_FEES,
                &json!({"schoolName": ""}),
                &ToolExecutionContext::new("inv-fees"),
            )
            .await
            .expect_err("empty school should fail");

        assert_eq!(error.kind, ctooling::ToolErrorKind::InputInvalid);
    }
}
