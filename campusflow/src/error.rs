//! Facade errors raised while assembling a runtime.

use std::error::Error;
use std::fmt::{Display, Formatter};

use cflow::FlowError;
use cprovider::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampusErrorKind {
    /// A `CAMPUSFLOW_*` setting is missing or unparseable.
    Configuration,
    Provider,
    Flow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampusError {
    pub kind: CampusErrorKind,
    pub message: String,
}

impl CampusError {
    pub fn new(kind: CampusErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(CampusErrorKind::Configuration, message)
    }
}

impl Display for CampusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for CampusError {}

impl From<ProviderError> for CampusError {
    fn from(value: ProviderError) -> Self {
        Self::new(CampusErrorKind::Provider, value.to_string())
    }
}

impl From<FlowError> for CampusError {
    fn from(value: FlowError) -> Self {
        Self::new(CampusErrorKind::Flow, value.to_string())
    }
}
