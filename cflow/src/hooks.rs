//! Runtime hook contracts for observing flow invocations.
//!
//! ```rust
//! use cflow::{FlowRuntimeHooks, NoopFlowRuntimeHooks};
//!
//! fn accepts_hooks(_hooks: &dyn FlowRuntimeHooks) {}
//!
//! let hooks = NoopFlowRuntimeHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use ccommon::InvocationId;

use crate::{FlowError, FlowResult, FlowState, ToolCallRecord};

pub trait FlowRuntimeHooks: Send + Sync {
    fn on_state_change(
        &self,
        _flow: &str,
        _invocation_id: &InvocationId,
        _from: FlowState,
        _to: FlowState,
    ) {
    }

    fn on_tool_call_recorded(
        &self,
        _flow: &str,
        _invocation_id: &InvocationId,
        _record: &ToolCallRecord,
    ) {
    }

    fn on_flow_complete(
        &self,
        _flow: &str,
        _invocation_id: &InvocationId,
        _result: &FlowResult,
        _elapsed: Duration,
    ) {
    }

    fn on_flow_failure(
        &self,
        _flow: &str,
        _invocation_id: &InvocationId,
        _error: &FlowError,
        _elapsed: Duration,
    ) {
    }

    /// A model call after `rounds` tool rounds failed; the flow still completes.
    fn on_follow_up_failure(
        &self,
        _flow: &str,
        _invocation_id: &InvocationId,
        _error: &FlowError,
        _rounds: u32,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFlowRuntimeHooks;

impl FlowRuntimeHooks for NoopFlowRuntimeHooks {}
