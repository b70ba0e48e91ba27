//! `metrics` counters and histograms for provider attempts, tool executions, and flows.
//!
//! ```rust
//! use cobserve::MetricsObservabilityHooks;
//! use cprovider::ProviderOperationHooks;
//!
//! fn accepts_provider_hooks(_hooks: &dyn ProviderOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_provider_hooks(&hooks);
//! ```

use std::time::Duration;

use ccommon::InvocationId;
use cflow::{FlowError, FlowResult, FlowRuntimeHooks, ToolCallRecord};
use cprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use cschema::FieldErrors;
use ctooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ProviderOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, _attempt: u32) {
        metrics::counter!(
            "campusflow_provider_attempt_start_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "campusflow_provider_retry_scheduled_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "campusflow_provider_retry_delay_seconds",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        metrics::counter!(
            "campusflow_provider_success_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "campusflow_provider_attempts_per_success",
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        _attempts: u32,
        error: &ProviderError,
    ) {
        metrics::counter!(
            "campusflow_provider_failure_total",
            "provider" => provider.to_string(),
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
        metrics::counter!(
            "campusflow_tool_execution_start_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_input_rejected(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        field_errors: &FieldErrors,
    ) {
        metrics::counter!(
            "campusflow_tool_input_rejected_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "campusflow_tool_input_rejected_fields",
            "tool_name" => tool_call.name.clone()
        )
        .record(field_errors.len() as f64);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        metrics::histogram!(
            "campusflow_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "campusflow_tool_execution_failure_total",
            "tool_name" => tool_call.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "campusflow_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl FlowRuntimeHooks for MetricsObservabilityHooks {
    fn on_tool_call_recorded(
        &self,
        flow: &str,
        _invocation_id: &InvocationId,
        record: &ToolCallRecord,
    ) {
        if let Some(delivery) = &record.delivery {
            metrics::counter!(
                "campusflow_flow_deliveries_total",
                "flow" => flow.to_string(),
                "channel" => delivery.channel.as_str()
            )
            .increment(1);
        }
    }

    fn on_flow_complete(
        &self,
        flow: &str,
        _invocation_id: &InvocationId,
        result: &FlowResult,
        elapsed: Duration,
    ) {
        let satisfied = if result.satisfied { "true" } else { "false" };
        metrics::counter!(
            "campusflow_flow_complete_total",
            "flow" => flow.to_string(),
            "satisfied" => satisfied
        )
        .increment(1);
        metrics::histogram!(
            "campusflow_flow_tool_rounds",
            "flow" => flow.to_string()
        )
        .record(f64::from(result.tool_rounds));
        metrics::histogram!(
            "campusflow_flow_duration_seconds",
            "flow" => flow.to_string(),
            "status" => "complete"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_flow_failure(
        &self,
        flow: &str,
        _invocation_id: &InvocationId,
        error: &FlowError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "campusflow_flow_failure_total",
            "flow" => flow.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "campusflow_flow_duration_seconds",
            "flow" => flow.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_follow_up_failure(
        &self,
        flow: &str,
        _invocation_id: &InvocationId,
        error: &FlowError,
        _rounds: u32,
    ) {
        metrics::counter!(
            "campusflow_flow_follow_up_failure_total",
            "flow" => flow.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}
