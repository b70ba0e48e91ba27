//! Tool execution errors and classifications.

use std::error::Error;
use std::fmt::{Display, Formatter};

use cschema::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    NotFound,
    InputInvalid,
    OutputInvalid,
    Execution,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub retryable: bool,
    pub field_errors: Option<FieldErrors>,
    pub tool_name: Option<String>,
    pub tool_call_id: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            field_errors: None,
            tool_name: None,
            tool_call_id: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message, false)
    }

    pub fn input_invalid(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InputInvalid, message, false)
    }

    /// Input rejected by the tool's input schema.
    pub fn invalid_input_fields(field_errors: FieldErrors) -> Self {
        Self {
            field_errors: Some(field_errors.clone()),
            ..Self::input_invalid(format!("input does not match schema: {field_errors}"))
        }
    }

    /// Handler output rejected by the tool's output schema.
    pub fn invalid_output_fields(field_errors: FieldErrors) -> Self {
        Self {
            field_errors: Some(field_errors.clone()),
            ..Self::new(
                ToolErrorKind::OutputInvalid,
                format!("output does not match schema: {field_errors}"),
                false,
            )
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, message, true)
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// True when the caller (usually the model) supplied something wrong.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            ToolErrorKind::InputInvalid | ToolErrorKind::NotFound
        )
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.tool_name, &self.tool_call_id) {
            (Some(tool_name), Some(tool_call_id)) => write!(
                f,
                "{:?} [tool={}, call_id={}]: {}",
                self.kind, tool_name, tool_call_id, self.message
            ),
            (Some(tool_name), None) => {
                write!(f, "{:?} [tool={}]: {}", self.kind, tool_name, self.message)
            }
            _ => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ToolError {}
