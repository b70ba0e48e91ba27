//! Tool registry: lookup by name plus schema-checked invocation.
//!
//! ```rust
//! use ctooling::{ToolRegistry, ToolSpec};
//! use serde_json::json;
//!
//! let mut registry = ToolRegistry::new();
//! registry.register_sync_fn(ToolSpec::new("ping", "Health check"), |_input, _ctx| {
//!     Ok(json!({}))
//! });
//!
//! assert!(registry.contains("ping"));
//! assert_eq!(registry.definitions()[0].input_schema["type"], "object");
//! ```

use std::future::Future;
use std::sync::Arc;

use ccommon::Registry;
use cprovider::ToolDefinition;
use cschema::Validation;
use serde_json::Value;

use crate::{FunctionTool, Tool, ToolError, ToolExecutionContext, ToolSpec};

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        let name = tool.spec().name.clone();
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn register_fn<F, Fut>(&mut self, spec: ToolSpec, handler: F)
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(spec, handler));
    }

    pub fn register_sync_fn<F>(&mut self, spec: ToolSpec, handler: F)
    where
        F: Fn(Value, ToolExecutionContext) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.register_fn(spec, move |input, context| {
            let output = handler(input, context);
            async move { output }
        });
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn spec(&self, name: &str) -> Option<ToolSpec> {
        self.tools.get(name).map(|tool| tool.spec().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Model-facing declarations in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| tool.spec().to_model_definition())
            .collect()
    }

    /// Validates `input`, runs the handler, then validates its output.
    /// Returns the coerced output. Never retries.
    pub async fn invoke(
        &self,
        name: &str,
        input: &Value,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::not_found(format!("tool '{name}' is not registered")))?;

        let spec = tool.spec();
        let input = match spec.input.validate(input) {
            Validation::Valid(coerced) => coerced,
            Validation::Invalid(errors) => {
                return Err(ToolError::invalid_input_fields(errors).with_tool_name(name));
            }
        };

        let output = tool
            .invoke(input, context)
            .await
            .map_err(|error| match error.tool_name {
                Some(_) => error,
                None => error.with_tool_name(name),
            })?;

        match spec.output.validate(&output) {
            Validation::Valid(coerced) => Ok(coerced),
            Validation::Invalid(errors) => {
                Err(ToolError::invalid_output_fields(errors).with_tool_name(name))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use cschema::{Field, ObjectSchema, StringFormat};
    use serde_json::json;

    use super::*;
    use crate::ToolErrorKind;

    fn sms_spec() -> ToolSpec {
        ToolSpec::new("sendSms", "Send an SMS")
            .with_input(
                ObjectSchema::builder()
                    .field(Field::string("to").format(StringFormat::Phone))
                    .field(Field::string("message"))
                    .build(),
            )
            .with_output(
                ObjectSchema::builder()
                    .field(Field::enumeration("status", ["queued", "failed"]))
                    .build(),
            )
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(sms_spec(), {
            let calls = Arc::clone(&calls);
            move |_input, _ctx| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"status": "queued"}))
            }
        });

        let error = registry
            .invoke(
                "sendSms",
                &json!({"to": "call me", "message": "hi"}),
                &ToolExecutionContext::new("inv-1"),
            )
            .await
            .expect_err("bad phone should fail");

        assert_eq!(error.kind, ToolErrorKind::InputInvalid);
        assert_eq!(error.tool_name.as_deref(), Some("sendSms"));
        assert!(
            error
                .field_errors
                .as_ref()
                .is_some_and(|errors| errors.contains("to"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_receives_coerced_input_and_output_is_checked() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(sms_spec(), |input, _ctx| {
            assert!(input.get("extra").is_none());
            Ok(json!({"status": "queued", "debug": true}))
        });

        let output = registry
            .invoke(
                "sendSms",
                &json!({"to": "+1 555 0100", "message": "hi", "extra": 1}),
                &ToolExecutionContext::new("inv-2"),
            )
            .await
            .expect("valid call should succeed");

        assert_eq!(output, json!({"status": "queued"}));
    }

    #[tokio::test]
    async fn non_conforming_output_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(sms_spec(), |_input, _ctx| Ok(json!({"status": "sent"})));

        let error = registry
            .invoke(
                "sendSms",
                &json!({"to": "+15550100", "message": "hi"}),
                &ToolExecutionContext::new("inv-3"),
            )
            .await
            .expect_err("unknown status should fail");

        assert_eq!(error.kind, ToolErrorKind::OutputInvalid);
    }

    #[tokio::test]
    async fn handler_errors_keep_their_kind() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(sms_spec(), |_input, _ctx| {
            Err(ToolError::execution("gateway down"))
        });

        let error = registry
            .invoke(
                "sendSms",
                &json!({"to": "+15550100", "message": "hi"}),
                &ToolExecutionContext::new("inv-4"),
            )
            .await
            .expect_err("handler failure should surface");

        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert_eq!(error.message, "gateway down");
        assert_eq!(error.tool_name.as_deref(), Some("sendSms"));
    }

    #[test]
    fn registry_tracks_registered_tools_in_order() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register_sync_fn(sms_spec(), |_input, _ctx| Ok(json!({"status": "queued"})));
        registry.register_sync_fn(ToolSpec::new("navigate", "Go to page"), |input, _ctx| {
            Ok(input)
        });

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["sendSms".to_string(), "navigate".to_string()]);
        assert_eq!(registry.definitions()[0].name, "sendSms");
        assert!(registry.spec("navigate").is_some());

        assert!(registry.remove("sendSms").is_some());
        assert!(!registry.contains("sendSms"));
    }
}
