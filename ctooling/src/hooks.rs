//! Observer callbacks around each tool execution.
//!
//! A call whose arguments fail the input schema reports
//! `on_input_rejected` before `on_execution_failure`; the handler never runs.
//!
//! ```rust
//! use ctooling::{NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn observe(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! observe(&NoopToolRuntimeHooks);
//! ```

use std::time::Duration;

use cprovider::ToolCall;
use cschema::FieldErrors;

use crate::{ToolError, ToolExecutionContext, ToolExecutionResult};

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_execution_start(&self, _call: &ToolCall, _context: &ToolExecutionContext) {}

    fn on_input_rejected(
        &self,
        _call: &ToolCall,
        _context: &ToolExecutionContext,
        _field_errors: &FieldErrors,
    ) {
    }

    fn on_execution_success(
        &self,
        _call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _call: &ToolCall,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
