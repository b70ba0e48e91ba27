//! Tool runtime trait and default registry-backed executor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cprovider::ToolCall;

use crate::{
    NoopToolRuntimeHooks, ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult,
    ToolFuture, ToolRegistry, ToolRuntimeHooks, parse_json_value,
};

pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;

    fn registry(&self) -> Arc<ToolRegistry>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Bounds each handler run; an expired run fails with `Timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn run(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let input = parse_json_value(&tool_call.arguments)
            .map_err(|error| error.with_tool_name(&tool_call.name))?;

        let invocation = self.registry.invoke(&tool_call.name, &input, context);
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, invocation)
                .await
                .map_err(|_| {
                    ToolError::timeout(format!(
                        "tool did not finish within {}ms",
                        limit.as_millis()
                    ))
                    .with_tool_name(&tool_call.name)
                })??,
            None => invocation.await?,
        };

        Ok(ToolExecutionResult::from_call(tool_call, input, output))
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        Box::pin(async move {
            self.hooks.on_execution_start(&tool_call, &context);
            let started = Instant::now();

            match self.run(&tool_call, &context).await {
                Ok(result) => {
                    self.hooks
                        .on_execution_success(&tool_call, &context, &result, started.elapsed());
                    Ok(result)
                }
                Err(error) => {
                    let error = error.with_tool_call_id(tool_call.id.clone());
                    if let (ToolErrorKind::InputInvalid, Some(field_errors)) =
                        (error.kind, error.field_errors.as_ref())
                    {
                        self.hooks
                            .on_input_rejected(&tool_call, &context, field_errors);
                    }
                    self.hooks
                        .on_execution_failure(&tool_call, &context, &error, started.elapsed());
                    Err(error)
                }
            }
        })
    }

    fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }
}
