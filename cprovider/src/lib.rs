//! Provider abstraction for chat-completion models.
//!
//! ```rust
//! use cprovider::{Message, ModelRequest, RetryPolicy, ToolDefinition};
//! use serde_json::json;
//!
//! let request = ModelRequest::new("gpt-4o-mini", vec![Message::user("Send the reminder")])
//!     .with_tools(vec![ToolDefinition {
//!         name: "sendSms".to_string(),
//!         description: "Send an SMS".to_string(),
//!         input_schema: json!({"type": "object"}),
//!     }]);
//!
//! assert!(request.validate().is_ok());
//! assert_eq!(RetryPolicy::default().max_attempts, 1);
//! ```

pub mod adapters;
mod credentials;
mod error;
mod model;
mod provider;
mod resilience;

pub mod prelude;

pub use credentials::{SecretString, SecureCredentialManager};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    MediaPart, Message, ModelRequest, ModelRequestBuilder, ModelResponse, OutputItem, ProviderId,
    Role, StopReason, StructuredOutput, TokenUsage, ToolCall, ToolDefinition, ToolResult,
};
pub use provider::{ModelProvider, ProviderFuture};
pub use resilience::{
    NoopOperationHooks, ProviderOperationHooks, RetryPolicy, execute_with_retry,
};
