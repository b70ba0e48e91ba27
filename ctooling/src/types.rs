//! Tool runtime context and execution result types.

use ccommon::{InvocationId, MetadataMap, TraceId};
use cprovider::ToolCall;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionContext {
    pub invocation_id: InvocationId,
    pub trace_id: Option<TraceId>,
    pub metadata: MetadataMap,
}

impl ToolExecutionContext {
    pub fn new(invocation_id: impl Into<InvocationId>) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            trace_id: None,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecutionResult {
    pub tool_call_id: String,
    pub tool_name: String,
    /// Validated input the handler ran with.
    pub input: Value,
    /// Output already checked against the tool's output shape.
    pub output: Value,
}

impl ToolExecutionResult {
    pub fn from_call(call: &ToolCall, input: Value, output: Value) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            input,
            output,
        }
    }
}
