//! Observability hooks for provider attempts, tool executions, and flow runs.
//!
//! ```rust
//! use cobserve::{
//!     MetricsObservabilityHooks, SafeFlowHooks, SafeProviderHooks, TracingObservabilityHooks,
//! };
//!
//! let _provider_hooks = SafeProviderHooks::new(TracingObservabilityHooks);
//! let _flow_hooks = SafeFlowHooks::new(MetricsObservabilityHooks);
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeFlowHooks, SafeProviderHooks, SafeToolHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeFlowHooks, SafeProviderHooks, SafeToolHooks,
        TracingObservabilityHooks,
    };
}
