//! Tool-call trace records and the terminal flow result.

use std::time::Duration;

use ccommon::InvocationId;
use cprovider::TokenUsage;
use ctooling::ToolError;
use serde_json::Value;

use crate::{Delivery, DeliveryLedger, FlowError, FlowState};

/// One executed tool request, in the order the model asked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
    pub call_id: String,
    pub tool_name: String,
    /// 1-based model round that requested the call.
    pub round: u32,
    /// Coerced input on success, otherwise the arguments as received.
    pub input: Value,
    pub result: Result<Value, ToolError>,
    pub elapsed: Duration,
    /// Set for successful calls of notification tools.
    pub delivery: Option<Delivery>,
}

impl ToolCallRecord {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn output(&self) -> Option<&Value> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.result.as_ref().err()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowResult {
    pub invocation_id: InvocationId,
    pub flow: String,
    pub status: String,
    /// Whether the outcome met the flow's policy.
    pub satisfied: bool,
    pub structured_output: Option<Value>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub raw_text: Option<String>,
    pub state: FlowState,
    pub usage: TokenUsage,
    pub tool_rounds: u32,
    pub tool_round_limit_reached: bool,
    /// Model failure on a follow-up call after tools had already run.
    pub follow_up_error: Option<FlowError>,
}

impl FlowResult {
    pub fn deliveries(&self) -> DeliveryLedger {
        DeliveryLedger::from_records(&self.tool_calls)
    }

    pub fn calls_to<'a>(&'a self, tool_name: &'a str) -> impl Iterator<Item = &'a ToolCallRecord> {
        self.tool_calls
            .iter()
            .filter(move |record| record.tool_name == tool_name)
    }

    pub fn successful_calls(&self) -> impl Iterator<Item = &ToolCallRecord> {
        self.tool_calls.iter().filter(|record| record.is_success())
    }

    pub fn failed_calls(&self) -> impl Iterator<Item = &ToolCallRecord> {
        self.tool_calls.iter().filter(|record| !record.is_success())
    }
}
