//! Read-only set of flows registered at startup.

use std::sync::Arc;

use ccommon::Registry;

use crate::{FlowDefinition, FlowError};

#[derive(Debug, Default)]
pub struct FlowCatalog {
    flows: Registry<String, Arc<FlowDefinition>>,
}

impl FlowCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names are unique; a second registration under the same name fails.
    pub fn register(&mut self, flow: FlowDefinition) -> Result<(), FlowError> {
        if self.flows.contains_key(flow.name()) {
            return Err(FlowError::configuration(format!(
                "flow '{}' is already registered",
                flow.name()
            )));
        }

        self.flows.insert(flow.name().to_string(), Arc::new(flow));
        Ok(())
    }

    pub fn with_flow(mut self, flow: FlowDefinition) -> Result<Self, FlowError> {
        self.register(flow)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<FlowDefinition>> {
        self.flows.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flows.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.flows.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FlowDefinition>> {
        self.flows.values()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
