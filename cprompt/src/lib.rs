//! Prompt templates compiled once at startup and rendered per invocation.
//!
//! Templates use handlebars syntax with HTML escaping turned off, plus a
//! `{{media url=var}}` helper that attaches a URL or data URI instead of
//! inlining it.
//!
//! ```rust
//! use cprompt::PromptTemplate;
//! use serde_json::json;
//!
//! let template = PromptTemplate::parse(
//!     "Help with {{subject}}.{{#if photo}} See the photo.{{media url=photo}}{{/if}}",
//! )
//! .expect("template should parse");
//!
//! let rendered = template.render(&json!({
//!     "subject": "algebra",
//!     "photo": "data:image/png;base64,AAAA"
//! }))
//! .expect("template should render");
//!
//! assert_eq!(rendered.text, "Help with algebra. See the photo.");
//! assert_eq!(rendered.media.len(), 1);
//! assert_eq!(rendered.media[0].content_type.as_deref(), Some("image/png"));
//! ```

mod error;
mod template;

pub use error::{TemplateError, TemplateErrorKind};
pub use template::{MediaAttachment, PromptTemplate, RenderedPrompt};
