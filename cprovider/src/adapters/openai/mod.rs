//! Chat-completions adapter shared by OpenAI, Gemini's OpenAI-compatible
//! endpoint, and local servers.

mod auth;
mod provider;
mod serde_api;
mod transport;
mod types;

pub use provider::OpenAiProvider;
pub use transport::{
    GEMINI_OPENAI_BASE_URL, OPENAI_BASE_URL, OpenAiHttpTransport, OpenAiTransport,
};
pub use types::{
    OpenAiAssistantMessage, OpenAiAuth, OpenAiFinishReason, OpenAiMessage, OpenAiRequest,
    OpenAiResponse, OpenAiResponseFormat, OpenAiRole, OpenAiTool, OpenAiToolCall, OpenAiUsage,
};
