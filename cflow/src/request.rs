//! Inbound invocation request.

use ccommon::{InvocationId, MetadataMap, TraceId};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub flow: String,
    pub input: Value,
    pub invocation_id: InvocationId,
    pub trace_id: Option<TraceId>,
    pub metadata: MetadataMap,
    /// Cancels the in-flight model call when triggered.
    pub cancellation: Option<CancellationToken>,
}

impl InvocationRequest {
    pub fn new(flow: impl Into<String>, input: Value) -> Self {
        Self {
            flow: flow.into(),
            input,
            invocation_id: InvocationId::generate(),
            trace_id: None,
            metadata: MetadataMap::new(),
            cancellation: None,
        }
    }

    pub fn with_invocation_id(mut self, invocation_id: impl Into<InvocationId>) -> Self {
        self.invocation_id = invocation_id.into();
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}
