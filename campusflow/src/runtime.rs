//! Runtime wiring: provider, tools, catalog and observability in one place.

use std::sync::Arc;

use cflow::{FlowOrchestrator, FlowResult, FlowRuntimeHooks, InvocationRequest};
use cobserve::{SafeFlowHooks, SafeProviderHooks, SafeToolHooks, TracingObservabilityHooks};
use cprovider::{ModelProvider, ProviderOperationHooks};
use ctooling::{DefaultToolRuntime, ToolRegistry, ToolRuntimeHooks};
use serde_json::Value;

use crate::fees::{InMemoryFeeLedger, PendingFeeSource, register_fee_tools};
use crate::flows::campus_catalog;
use crate::navigate::register_navigation_tool;
use crate::notify::{LoggingGateway, NotificationGateway, register_notification_tools};
use crate::{CampusConfig, CampusError, build_provider_with_config};

/// External collaborators of the CampusConnect flows.
///
/// Hooks left unset default to panic-safe tracing observers.
#[derive(Clone)]
pub struct CampusServices {
    pub gateway: Arc<dyn NotificationGateway>,
    pub fee_source: Arc<dyn PendingFeeSource>,
    pub flow_hooks: Option<Arc<dyn FlowRuntimeHooks>>,
    pub provider_hooks: Option<Arc<dyn ProviderOperationHooks>>,
    pub tool_hooks: Option<Arc<dyn ToolRuntimeHooks>>,
}

impl CampusServices {
    pub fn new(
        gateway: Arc<dyn NotificationGateway>,
        fee_source: Arc<dyn PendingFeeSource>,
    ) -> Self {
        Self {
            gateway,
            fee_source,
            flow_hooks: None,
            provider_hooks: None,
            tool_hooks: None,
        }
    }

    pub fn with_flow_hooks(mut self, hooks: Arc<dyn FlowRuntimeHooks>) -> Self {
        self.flow_hooks = Some(hooks);
        self
    }

    pub fn with_provider_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.provider_hooks = Some(hooks);
        self
    }

    pub fn with_tool_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = Some(hooks);
        self
    }
}

impl Default for CampusServices {
    /// Log-only gateway and the sample fee ledger.
    fn default() -> Self {
        Self::new(
            Arc::new(LoggingGateway::new()),
            Arc::new(InMemoryFeeLedger::sample()),
        )
    }
}

/// Registry with every tool the CampusConnect flows reference.
pub fn campus_tool_registry(
    gateway: Arc<dyn NotificationGateway>,
    fee_source: Arc<dyn PendingFeeSource>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_notification_tools(&mut registry, gateway);
    register_fee_tools(&mut registry, fee_source);
    register_navigation_tool(&mut registry);
    registry
}

#[derive(Clone)]
pub struct CampusRuntime {
    pub orchestrator: Arc<FlowOrchestrator>,
    pub gateway: Arc<dyn NotificationGateway>,
    pub fee_source: Arc<dyn PendingFeeSource>,
}

impl CampusRuntime {
    pub async fn run(&self, flow: &str, input: Value) -> Result<FlowResult, CampusError> {
        self.run_request(InvocationRequest::new(flow, input)).await
    }

    pub async fn run_request(&self, request: InvocationRequest) -> Result<FlowResult, CampusError> {
        Ok(self.orchestrator.run(request).await?)
    }
}

/// Builds the HTTP provider from `config` and wires the default services.
pub fn build_campus_runtime(config: &CampusConfig) -> Result<CampusRuntime, CampusError> {
    let provider = build_provider_with_config(config)?;
    build_campus_runtime_with(provider, config, CampusServices::default())
}

pub fn build_campus_runtime_with(
    provider: Arc<dyn ModelProvider>,
    config: &CampusConfig,
    services: CampusServices,
) -> Result<CampusRuntime, CampusError> {
    let CampusServices {
        gateway,
        fee_source,
        flow_hooks,
        provider_hooks,
        tool_hooks,
    } = services;

    let tool_hooks = tool_hooks
        .unwrap_or_else(|| Arc::new(SafeToolHooks::new(TracingObservabilityHooks)));
    let flow_hooks =
        flow_hooks.unwrap_or_else(|| Arc::new(SafeFlowHooks::new(TracingObservabilityHooks)));
    let provider_hooks = provider_hooks
        .unwrap_or_else(|| Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)));

    let registry = campus_tool_registry(Arc::clone(&gateway), Arc::clone(&fee_source));
    let tool_runtime = DefaultToolRuntime::new(Arc::new(registry)).with_hooks(tool_hooks);

    let orchestrator = FlowOrchestrator::builder()
        .provider(provider)
        .model(config.model.clone())
        .catalog(campus_catalog()?)
        .tool_runtime(Arc::new(tool_runtime))
        .hooks(flow_hooks)
        .provider_hooks(provider_hooks)
        .model_timeout(config.model_timeout)
        .max_tool_rounds(config.max_tool_rounds)
        .build()?;

    tracing::debug!(
        phase = "runtime",
        event = "ready",
        provider = %config.provider,
        model = config.model.as_str(),
        flows = orchestrator.catalog().len() as u64
    );

    Ok(CampusRuntime {
        orchestrator: Arc::new(orchestrator),
        gateway,
        fee_source,
    })
}
