//! Common `cprovider` imports for downstream crates.

pub use crate::{
    MediaPart, Message, ModelProvider, ModelRequest, ModelRequestBuilder, ModelResponse,
    NoopOperationHooks, OutputItem, ProviderError, ProviderErrorKind, ProviderFuture, ProviderId,
    ProviderOperationHooks, RetryPolicy, Role, StopReason, StructuredOutput, TokenUsage, ToolCall,
    ToolDefinition, ToolResult, execute_with_retry,
};
pub use ccommon::MetadataMap;
