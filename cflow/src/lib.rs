//! Flow definitions and orchestration for structured model invocations.
//!
//! A flow validates its input, renders its prompts, asks the model, runs the
//! tools the model requested and maps the trace to a caller-facing status.
//!
//! ```rust
//! use cflow::{FlowDefinition, RequiredDeliveriesPolicy};
//! use cschema::{Field, ObjectSchema, StringFormat};
//!
//! let flow = FlowDefinition::builder("notifyPrincipal")
//!     .input(
//!         ObjectSchema::builder()
//!             .field(Field::string("schoolName").min_length(1))
//!             .field(Field::string("principalContact").format(StringFormat::Phone))
//!             .build(),
//!     )
//!     .system("You send school notifications.")
//!     .prompt("Notify {{principalContact}} about {{schoolName}}.")
//!     .tools(["sendSms"])
//!     .outcome(
//!         RequiredDeliveriesPolicy::new("Principal notified for {{schoolName}}.")
//!             .expect("status template should parse")
//!             .require_recipient("principalContact"),
//!     )
//!     .build()
//!     .expect("flow should build");
//!
//! assert_eq!(flow.tool_names(), &["sendSms".to_string()]);
//! ```

mod catalog;
mod definition;
mod delivery;
mod error;
mod hooks;
mod invoker;
mod orchestrator;
mod outcome;
mod request;
mod result;
mod state;

pub mod prelude {
    pub use crate::{
        FlowCatalog, FlowDefinition, FlowError, FlowErrorKind, FlowOrchestrator, FlowResult,
        FlowRuntimeHooks, FlowState, InvocationRequest, Outcome, OutcomeContext, OutcomePolicy,
        ToolCallRecord,
    };
}

pub use catalog::FlowCatalog;
pub use definition::{DeriveFn, FlowDefinition, FlowDefinitionBuilder};
pub use delivery::{Delivery, DeliveryLedger};
pub use error::{FlowError, FlowErrorKind, MODEL_FAILURE_MESSAGE};
pub use hooks::{FlowRuntimeHooks, NoopFlowRuntimeHooks};
pub use invoker::{DEFAULT_MODEL_TIMEOUT, ModelCall, ModelInvoker, ModelReply, ModelTurn};
pub use orchestrator::{DEFAULT_MAX_TOOL_ROUNDS, FlowOrchestrator, FlowOrchestratorBuilder};
pub use outcome::{
    ACTION_MISSING_STATUS, DefaultOutcomePolicy, FnOutcomePolicy, NOTIFICATIONS_MISSING_STATUS,
    OUTPUT_MISSING_STATUS, Outcome, OutcomeContext, OutcomePolicy, RequiredDeliveriesPolicy,
    StructuredOutputPolicy,
};
pub use request::InvocationRequest;
pub use result::{FlowResult, ToolCallRecord};
pub use state::FlowState;
