//! Flow-layer errors and classification.
//!
//! Only input rejection, template render failures and model failures before
//! any tool ran end an invocation with an error. Tool failures, and model
//! failures after a tool round, are recorded on the result instead.

use std::error::Error;
use std::fmt::{Display, Formatter};

use cprompt::TemplateError;
use cprovider::{ProviderError, ProviderErrorKind};
use cschema::FieldErrors;

/// Generic text shown to end users for any model-side failure.
pub const MODEL_FAILURE_MESSAGE: &str = "AI Error, please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowErrorKind {
    /// Request input did not match the flow's input shape.
    InputInvalid,
    UnknownFlow,
    /// Flow or orchestrator wiring is inconsistent.
    Configuration,
    Model,
    MalformedOutput,
    ModelTimeout,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowError {
    pub kind: FlowErrorKind,
    pub message: String,
    pub field_errors: Option<FieldErrors>,
    pub provider_error: Option<ProviderErrorKind>,
}

impl FlowError {
    pub fn new(kind: FlowErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field_errors: None,
            provider_error: None,
        }
    }

    pub fn input_invalid(field_errors: FieldErrors) -> Self {
        Self {
            field_errors: Some(field_errors.clone()),
            ..Self::new(
                FlowErrorKind::InputInvalid,
                format!("input does not match schema: {field_errors}"),
            )
        }
    }

    pub fn unknown_flow(name: &str) -> Self {
        Self::new(
            FlowErrorKind::UnknownFlow,
            format!("flow '{name}' is not registered"),
        )
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(FlowErrorKind::Configuration, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(FlowErrorKind::Model, message)
    }

    pub fn malformed_output(message: impl Into<String>) -> Self {
        Self::new(FlowErrorKind::MalformedOutput, message)
    }

    pub fn model_timeout(message: impl Into<String>) -> Self {
        Self::new(FlowErrorKind::ModelTimeout, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(FlowErrorKind::Cancelled, message)
    }

    pub fn with_field_errors(mut self, field_errors: FieldErrors) -> Self {
        self.field_errors = Some(field_errors);
        self
    }

    /// True for every failure on the model side of the boundary.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self.kind,
            FlowErrorKind::Model
                | FlowErrorKind::MalformedOutput
                | FlowErrorKind::ModelTimeout
                | FlowErrorKind::Cancelled
        )
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            FlowErrorKind::InputInvalid | FlowErrorKind::UnknownFlow
        )
    }

    /// Caller-facing text. Model failures collapse to one generic message.
    pub fn user_message(&self) -> String {
        if self.is_model_failure() {
            return MODEL_FAILURE_MESSAGE.to_string();
        }

        match (&self.kind, &self.field_errors) {
            (FlowErrorKind::InputInvalid, Some(errors)) => format!("Invalid input: {errors}"),
            _ => self.message.clone(),
        }
    }
}

impl Display for FlowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for FlowError {}

impl From<ProviderError> for FlowError {
    fn from(value: ProviderError) -> Self {
        let kind = match value.kind {
            ProviderErrorKind::Timeout => FlowErrorKind::ModelTimeout,
            _ => FlowErrorKind::Model,
        };

        Self {
            provider_error: Some(value.kind),
            ..Self::new(kind, value.to_string())
        }
    }
}

impl From<TemplateError> for FlowError {
    fn from(value: TemplateError) -> Self {
        Self::configuration(format!("prompt template is invalid: {value}"))
    }
}
