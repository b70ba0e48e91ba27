//! Capability layer for declaring, validating, and executing tools.

mod args;
mod error;
mod hooks;
mod registry;
mod runtime;
mod spec;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, NotificationChannel, Tool, ToolError, ToolErrorKind,
        ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry, ToolRuntime,
        ToolRuntimeHooks, ToolSpec,
    };
}

pub use args::{from_input, optional_string, parse_json_value, required_string, to_output};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use spec::{DeliveryTarget, NotificationChannel, ToolSpec};
pub use tool::{FunctionTool, Tool, ToolFuture};
pub use types::{ToolExecutionContext, ToolExecutionResult};
