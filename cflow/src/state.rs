//! Per-invocation lifecycle states.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowState {
    Pending,
    Validating,
    Rejected,
    Invoking,
    ToolExecuting,
    DirectOutput,
    ModelError,
    Completed,
    Failed,
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Failed)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validating => "validating",
            Self::Rejected => "rejected",
            Self::Invoking => "invoking",
            Self::ToolExecuting => "tool_executing",
            Self::DirectOutput => "direct_output",
            Self::ModelError => "model_error",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: FlowState) -> bool {
        use FlowState::*;

        matches!(
            (self, next),
            (Pending, Validating)
                | (Validating, Rejected)
                | (Validating, Invoking)
                | (Validating, Failed)
                | (Invoking, ToolExecuting)
                | (Invoking, DirectOutput)
                | (Invoking, ModelError)
                | (ToolExecuting, Invoking)
                | (ToolExecuting, Completed)
                | (DirectOutput, Completed)
                | (ModelError, Failed)
        )
    }
}

impl Display for FlowState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
