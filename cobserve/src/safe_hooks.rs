//! Wrappers that contain panics raised by an observer.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use ccommon::InvocationId;
use cflow::{FlowError, FlowResult, FlowRuntimeHooks, FlowState, ToolCallRecord};
use cprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use cschema::FieldErrors;
use ctooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(provider, operation, attempt)
        }));
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_retry_scheduled(provider, operation, attempt, delay, error)
        }));
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(provider, operation, attempts)
        }));
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(provider, operation, attempts, error)
        }));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(tool_call, context)
        }));
    }

    fn on_input_rejected(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        field_errors: &FieldErrors,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_input_rejected(tool_call, context, field_errors)
        }));
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(tool_call, context, result, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(tool_call, context, error, elapsed)
        }));
    }
}

pub struct SafeFlowHooks<H> {
    inner: H,
}

impl<H> SafeFlowHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> FlowRuntimeHooks for SafeFlowHooks<H>
where
    H: FlowRuntimeHooks,
{
    fn on_state_change(
        &self,
        flow: &str,
        invocation_id: &InvocationId,
        from: FlowState,
        to: FlowState,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_state_change(flow, invocation_id, from, to)
        }));
    }

    fn on_tool_call_recorded(
        &self,
        flow: &str,
        invocation_id: &InvocationId,
        record: &ToolCallRecord,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_tool_call_recorded(flow, invocation_id, record)
        }));
    }

    fn on_flow_complete(
        &self,
        flow: &str,
        invocation_id: &InvocationId,
        result: &FlowResult,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_flow_complete(flow, invocation_id, result, elapsed)
        }));
    }

    fn on_flow_failure(
        &self,
        flow: &str,
        invocation_id: &InvocationId,
        error: &FlowError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_flow_failure(flow, invocation_id, error, elapsed)
        }));
    }

    fn on_follow_up_failure(
        &self,
        flow: &str,
        invocation_id: &InvocationId,
        error: &FlowError,
        rounds: u32,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_follow_up_failure(flow, invocation_id, error, rounds)
        }));
    }
}
