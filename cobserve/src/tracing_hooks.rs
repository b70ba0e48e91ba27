//! Structured `tracing` events for provider attempts, tool executions, and flows.
//!
//! ```rust
//! use cflow::FlowRuntimeHooks;
//! use cobserve::TracingObservabilityHooks;
//!
//! fn accepts_flow_hooks(_hooks: &dyn FlowRuntimeHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_flow_hooks(&hooks);
//! ```

use std::time::Duration;

use ccommon::InvocationId;
use cflow::{FlowError, FlowResult, FlowRuntimeHooks, FlowState, ToolCallRecord};
use cprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use cschema::FieldErrors;
use ctooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        tracing::info!(
            phase = "provider",
            event = "attempt_start",
            provider = %provider,
            operation,
            attempt
        );
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "provider",
            event = "retry_scheduled",
            provider = %provider,
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        tracing::info!(
            phase = "provider",
            event = "success",
            provider = %provider,
            operation,
            attempts
        );
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        tracing::error!(
            phase = "provider",
            event = "failure",
            provider = %provider,
            operation,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            invocation_id = %context.invocation_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_input_rejected(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        field_errors: &FieldErrors,
    ) {
        tracing::warn!(
            phase = "tool",
            event = "input_rejected",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            invocation_id = %context.invocation_id,
            fields = %field_errors
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            invocation_id = %context.invocation_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "tool",
            event = "execution_failure",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            invocation_id = %context.invocation_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl FlowRuntimeHooks for TracingObservabilityHooks {
    fn on_state_change(
        &self,
        flow: &str,
        invocation_id: &InvocationId,
        from: FlowState,
        to: FlowState,
    ) {
        tracing::debug!(
            phase = "flow",
            event = "state_change",
            flow,
            invocation_id = %invocation_id,
            from = from.name(),
            to = to.name()
        );
    }

    fn on_tool_call_recorded(
        &self,
        flow: &str,
        invocation_id: &InvocationId,
        record: &ToolCallRecord,
    ) {
        tracing::info!(
            phase = "flow",
            event = "tool_call_recorded",
            flow,
            invocation_id = %invocation_id,
            tool_name = record.tool_name,
            tool_call_id = record.call_id,
            round = record.round,
            success = record.is_success(),
            channel = record.delivery.as_ref().map(|delivery| delivery.channel.as_str()),
            error_kind = record.error().map(|error| format!("{:?}", error.kind))
        );
    }

    fn on_flow_complete(
        &self,
        flow: &str,
        invocation_id: &InvocationId,
        result: &FlowResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "flow",
            event = "complete",
            flow,
            invocation_id = %invocation_id,
            status = result.status,
            satisfied = result.satisfied,
            tool_calls = result.tool_calls.len() as u64,
            deliveries = result.deliveries().len() as u64,
            tool_rounds = result.tool_rounds,
            round_limit_reached = result.tool_round_limit_reached,
            follow_up_failed = result.follow_up_error.is_some(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_flow_failure(
        &self,
        flow: &str,
        invocation_id: &InvocationId,
        error: &FlowError,
        elapsed: Duration,
    ) {
        if error.is_user_error() {
            tracing::warn!(
                phase = "flow",
                event = "rejected",
                flow,
                invocation_id = %invocation_id,
                elapsed_ms = elapsed.as_millis() as u64,
                error_kind = ?error.kind,
                error = %error
            );
        } else {
            tracing::error!(
                phase = "flow",
                event = "failure",
                flow,
                invocation_id = %invocation_id,
                elapsed_ms = elapsed.as_millis() as u64,
                error_kind = ?error.kind,
                error = %error
            );
        }
    }

    fn on_follow_up_failure(
        &self,
        flow: &str,
        invocation_id: &InvocationId,
        error: &FlowError,
        rounds: u32,
    ) {
        tracing::warn!(
            phase = "flow",
            event = "follow_up_failure",
            flow,
            invocation_id = %invocation_id,
            tool_rounds = rounds,
            error_kind = ?error.kind,
            error = %error
        );
    }
}
