//! Unified facade over the CampusFlow workspace crates.
//!
//! This crate is the single dependency for CampusConnect services. It
//! re-exports the core crates and provides the concrete flows, their tools,
//! and runtime wiring from environment configuration.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use campusflow::flows::{ADDITIONAL_STUDENT_BILLING, campus_catalog};
//! use campusflow::notify::RecordingGateway;
//! use campusflow::{InMemoryFeeLedger, campus_tool_registry};
//!
//! let catalog = campus_catalog().expect("catalog should build");
//! let registry = campus_tool_registry(
//!     Arc::new(RecordingGateway::new()),
//!     Arc::new(InMemoryFeeLedger::sample()),
//! );
//!
//! let billing = catalog.get(ADDITIONAL_STUDENT_BILLING).expect("billing flow");
//! assert!(billing.tool_names().iter().all(|tool| registry.contains(tool)));
//! ```

mod config;
mod error;
mod providers;

pub mod fees;
pub mod flows;
pub mod navigate;
pub mod notify;
pub mod prelude;
pub mod runtime;

pub use ccommon;
pub use cflow;
pub use cobserve;
pub use cprompt;
pub use cprovider;
pub use cschema;
pub use ctooling;

pub use ccommon::{BoxFuture, GenerationOptions, InvocationId, MetadataMap, TraceId};
pub use cflow::{
    FlowCatalog, FlowDefinition, FlowDefinitionBuilder, FlowError, FlowErrorKind,
    FlowOrchestrator, FlowOrchestratorBuilder, FlowResult, FlowRuntimeHooks, FlowState,
    InvocationRequest, Outcome, OutcomeContext, OutcomePolicy, ToolCallRecord,
};
pub use cobserve::{
    MetricsObservabilityHooks, SafeFlowHooks, SafeProviderHooks, SafeToolHooks,
    TracingObservabilityHooks,
};
pub use cprompt::{PromptTemplate, RenderedPrompt, TemplateError};
pub use cprovider::{
    ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderErrorKind, ProviderId,
    ProviderOperationHooks, RetryPolicy,
};
pub use cschema::{Field, FieldErrors, FieldType, ObjectSchema, StringFormat, Validation};
pub use ctooling::{
    DefaultToolRuntime, NotificationChannel, ToolError, ToolErrorKind, ToolRegistry,
    ToolRuntimeHooks, ToolSpec,
};

pub use config::{
    CampusConfig, ENV_API_KEY, ENV_BASE_URL, ENV_HTTP_TIMEOUT_SECS, ENV_MAX_TOOL_ROUNDS,
    ENV_MODEL, ENV_MODEL_TIMEOUT_SECS, ENV_PROVIDER, default_model,
};
pub use error::{CampusError, CampusErrorKind};
pub use fees::{InMemoryFeeLedger, PendingFee, PendingFeeSource};
pub use navigate::DashboardPage;
pub use notify::{
    GatewayError, GatewayErrorKind, LoggingGateway, Notification, NotificationGateway, Receipt,
    RecordingGateway,
};
pub use providers::build_provider_with_config;
pub use runtime::{
    CampusRuntime, CampusServices, build_campus_runtime, build_campus_runtime_with,
    campus_tool_registry,
};
