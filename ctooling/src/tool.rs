//! Tool trait contract for registry-managed capabilities.
//!
//! ```rust
//! use ctooling::{FunctionTool, Tool, ToolSpec};
//!
//! let tool = FunctionTool::new(
//!     ToolSpec::new("echo", "Echoes input"),
//!     |input, _ctx| async move { Ok(input) },
//! );
//!
//! assert_eq!(tool.spec().name, "echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use ccommon::BoxFuture;
use serde_json::Value;

use crate::{ToolError, ToolExecutionContext, ToolSpec};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;

    /// Runs the tool on input that already matches `spec().input`.
    fn invoke<'a>(
        &'a self,
        input: Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>>;
}

type ToolHandler =
    dyn Fn(Value, ToolExecutionContext) -> ToolFuture<'static, Result<Value, ToolError>>
        + Send
        + Sync;

pub struct FunctionTool {
    spec: ToolSpec,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(spec: ToolSpec, handler: F) -> Self
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> =
            Arc::new(move |input, context| Box::pin(handler(input, context)));

        Self { spec, handler }
    }
}

impl Tool for FunctionTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn invoke<'a>(
        &'a self,
        input: Value,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        (self.handler)(input, context.clone())
    }
}
