//! Common imports for CampusConnect services.

pub use crate::flows::{
    ADDITIONAL_STUDENT_BILLING, GENERATE_QUIZ, PLAN_LESSON, SEND_FEE_REMINDERS, STUDY_BUDDY,
    SUMMARIZE_DOCUMENT, VOICE_COMMAND, campus_catalog, campus_flows,
};
pub use crate::{
    CampusConfig, CampusError, CampusErrorKind, CampusRuntime, CampusServices,
    build_campus_runtime, build_campus_runtime_with, build_provider_with_config,
    campus_tool_registry,
};
pub use crate::{
    FlowError, FlowErrorKind, FlowResult, FlowState, InMemoryFeeLedger, InvocationRequest,
    LoggingGateway, ModelProvider, NotificationChannel, NotificationGateway, PendingFeeSource,
    ProviderId, RecordingGateway, ToolError, ToolErrorKind,
};
