//! Template compilation and rendering errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateErrorKind {
    /// Unbalanced blocks, unclosed tags and other parse failures.
    Syntax,
    InvalidDirective,
    /// A helper failed while rendering, such as `{{#if}}` without a variable.
    Render,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    pub kind: TemplateErrorKind,
    pub message: String,
}

impl TemplateError {
    pub fn new(kind: TemplateErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::Syntax, message)
    }

    pub fn invalid_directive(message: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::InvalidDirective, message)
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::Render, message)
    }
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for TemplateError {}

impl From<handlebars::TemplateError> for TemplateError {
    fn from(value: handlebars::TemplateError) -> Self {
        Self::syntax(value.to_string())
    }
}

impl From<handlebars::RenderError> for TemplateError {
    fn from(value: handlebars::RenderError) -> Self {
        Self::render(value.to_string())
    }
}
