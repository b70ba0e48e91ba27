//! Immutable flow definitions built once at startup.
//!
//! ```rust
//! use cflow::FlowDefinition;
//! use cschema::{Field, ObjectSchema};
//! use serde_json::{Map, json};
//!
//! let flow = FlowDefinition::builder("additionalStudentBilling")
//!     .input(
//!         ObjectSchema::builder()
//!             .field(Field::integer("additionalStudentCount"))
//!             .field(Field::number("amountPerStudent"))
//!             .build(),
//!     )
//!     .prompt("Bill {{additionalStudentCount}} students, {{totalAmountDue}} in total.")
//!     .derive(|input| {
//!         let count = input["additionalStudentCount"].as_f64().unwrap_or_default();
//!         let amount = input["amountPerStudent"].as_f64().unwrap_or_default();
//!         let mut derived = Map::new();
//!         derived.insert("totalAmountDue".to_string(), json!(count * amount));
//!         derived
//!     })
//!     .build()
//!     .expect("flow should build");
//!
//! let variables = flow.variables(&json!({"additionalStudentCount": 5, "amountPerStudent": 100}));
//! assert_eq!(variables["totalAmountDue"], json!(500.0));
//! ```

use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use ccommon::GenerationOptions;
use cprompt::PromptTemplate;
use cschema::ObjectSchema;
use serde_json::{Map, Value};

use crate::{DefaultOutcomePolicy, FlowError, OutcomePolicy, StructuredOutputPolicy};

/// Computes extra template variables from validated input.
pub type DeriveFn = Arc<dyn Fn(&Value) -> Map<String, Value> + Send + Sync>;

pub struct FlowDefinition {
    name: String,
    description: String,
    input: ObjectSchema,
    output: Option<ObjectSchema>,
    system: Option<PromptTemplate>,
    prompt: PromptTemplate,
    tool_names: Vec<String>,
    derive: Option<DeriveFn>,
    max_tool_rounds: Option<u32>,
    model_timeout: Option<Duration>,
    options: GenerationOptions,
    outcome: Arc<dyn OutcomePolicy>,
}

impl FlowDefinition {
    pub fn builder(name: impl Into<String>) -> FlowDefinitionBuilder {
        FlowDefinitionBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input(&self) -> &ObjectSchema {
        &self.input
    }

    pub fn output(&self) -> Option<&ObjectSchema> {
        self.output.as_ref()
    }

    /// Name under which the output shape is declared to the model.
    pub fn output_name(&self) -> String {
        format!("{}Output", self.name)
    }

    pub fn system(&self) -> Option<&PromptTemplate> {
        self.system.as_ref()
    }

    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    pub fn tool_names(&self) -> &[String] {
        &self.tool_names
    }

    pub fn declares_tool(&self, name: &str) -> bool {
        self.tool_names.iter().any(|tool| tool == name)
    }

    /// Per-flow override of the orchestrator's tool round limit.
    pub fn max_tool_rounds(&self) -> Option<u32> {
        self.max_tool_rounds
    }

    pub fn model_timeout(&self) -> Option<Duration> {
        self.model_timeout
    }

    pub fn options(&self) -> GenerationOptions {
        self.options
    }

    pub fn outcome(&self) -> &dyn OutcomePolicy {
        self.outcome.as_ref()
    }

    /// Validated input merged with derived variables. Derived values win on
    /// key collisions.
    pub fn variables(&self, validated_input: &Value) -> Value {
        let mut variables = match validated_input {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        if let Some(derive) = &self.derive {
            variables.extend(derive(validated_input));
        }

        Value::Object(variables)
    }
}

impl Debug for FlowDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowDefinition")
            .field("name", &self.name)
            .field("tool_names", &self.tool_names)
            .field("has_output", &self.output.is_some())
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("model_timeout", &self.model_timeout)
            .finish_non_exhaustive()
    }
}

pub struct FlowDefinitionBuilder {
    name: String,
    description: String,
    input: ObjectSchema,
    output: Option<ObjectSchema>,
    system: Option<String>,
    prompt: Option<String>,
    tool_names: Vec<String>,
    derive: Option<DeriveFn>,
    max_tool_rounds: Option<u32>,
    model_timeout: Option<Duration>,
    options: GenerationOptions,
    outcome: Option<Arc<dyn OutcomePolicy>>,
}

impl FlowDefinitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input: ObjectSchema::empty(),
            output: None,
            system: None,
            prompt: None,
            tool_names: Vec::new(),
            derive: None,
            max_tool_rounds: None,
            model_timeout: None,
            options: GenerationOptions::default(),
            outcome: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn input(mut self, input: ObjectSchema) -> Self {
        self.input = input;
        self
    }

    pub fn output(mut self, output: ObjectSchema) -> Self {
        self.output = Some(output);
        self
    }

    pub fn system(mut self, template: impl Into<String>) -> Self {
        self.system = Some(template.into());
        self
    }

    pub fn prompt(mut self, template: impl Into<String>) -> Self {
        self.prompt = Some(template.into());
        self
    }

    pub fn tool(mut self, name: impl Into<String>) -> Self {
        self.tool_names.push(name.into());
        self
    }

    pub fn tools<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn derive<F>(mut self, derive: F) -> Self
    where
        F: Fn(&Value) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.derive = Some(Arc::new(derive));
        self
    }

    pub fn max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = Some(rounds);
        self
    }

    pub fn model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = Some(timeout);
        self
    }

    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn outcome<P>(mut self, policy: P) -> Self
    where
        P: OutcomePolicy + 'static,
    {
        self.outcome = Some(Arc::new(policy));
        self
    }

    /// Compiles both templates. Without an explicit policy, flows with an
    /// output shape require structured output; others use the default policy.
    pub fn build(self) -> Result<FlowDefinition, FlowError> {
        if self.name.trim().is_empty() {
            return Err(FlowError::configuration("flow name must not be empty"));
        }

        let prompt = self.prompt.ok_or_else(|| {
            FlowError::configuration(format!("flow '{}' has no prompt template", self.name))
        })?;

        if self.max_tool_rounds == Some(0) {
            return Err(FlowError::configuration(format!(
                "flow '{}' must allow at least one tool round",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.tool_names.iter().find(|name| !seen.insert(*name)) {
            return Err(FlowError::configuration(format!(
                "flow '{}' declares tool '{duplicate}' twice",
                self.name
            )));
        }

        let outcome = self.outcome.unwrap_or_else(|| match self.output {
            Some(_) => Arc::new(StructuredOutputPolicy::new()) as Arc<dyn OutcomePolicy>,
            None => Arc::new(DefaultOutcomePolicy),
        });

        Ok(FlowDefinition {
            system: self.system.map(PromptTemplate::parse).transpose()?,
            prompt: PromptTemplate::parse(prompt)?,
            name: self.name,
            description: self.description,
            input: self.input,
            output: self.output,
            tool_names: self.tool_names,
            derive: self.derive,
            max_tool_rounds: self.max_tool_rounds,
            model_timeout: self.model_timeout,
            options: self.options,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use cschema::Field;
    use serde_json::json;

    use super::*;
    use crate::FlowErrorKind;

    #[test]
    fn flows_without_a_prompt_are_rejected() {
        let error = FlowDefinition::builder("empty")
            .build()
            .expect_err("missing prompt should fail");
        assert_eq!(error.kind, FlowErrorKind::Configuration);
    }

    #[test]
    fn template_errors_surface_as_configuration_errors() {
        let error = FlowDefinition::builder("broken")
            .prompt("{{#if photo}}unclosed")
            .build()
            .expect_err("unbalanced block should fail");
        assert_eq!(error.kind, FlowErrorKind::Configuration);
        assert!(error.message.contains("prompt template is invalid"));
    }

    #[test]
    fn duplicate_tools_and_zero_rounds_are_rejected() {
        let duplicate = FlowDefinition::builder("dup")
            .prompt("hi")
            .tools(["sendSms", "sendSms"])
            .build()
            .expect_err("duplicate tool should fail");
        assert!(duplicate.message.contains("sendSms"));

        let zero = FlowDefinition::builder("zero")
            .prompt("hi")
            .max_tool_rounds(0)
            .build()
            .expect_err("zero rounds should fail");
        assert_eq!(zero.kind, FlowErrorKind::Configuration);
    }

    #[test]
    fn derived_variables_override_input() {
        let flow = FlowDefinition::builder("derive")
            .input(ObjectSchema::builder().field(Field::string("name")).build())
            .prompt("{{greeting}}, {{name}}")
            .derive(|input| {
                let mut derived = Map::new();
                derived.insert("greeting".to_string(), json!("Hello"));
                derived.insert(
                    "name".to_string(),
                    json!(input["name"].as_str().unwrap_or_default().to_uppercase()),
                );
                derived
            })
            .build()
            .expect("flow should build");

        let variables = flow.variables(&json!({"name": "oak"}));
        assert_eq!(
            flow.prompt().render(&variables).expect("render").text,
            "Hello, OAK"
        );
        assert!(!flow.declares_tool("sendSms"));
        assert_eq!(flow.output_name(), "deriveOutput");
    }
}
