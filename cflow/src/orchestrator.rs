//! Flow orchestration: validate, render, invoke, run tools, derive the outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ccommon::InvocationId;
use cprovider::{
    MediaPart, Message, ModelProvider, ProviderOperationHooks, RetryPolicy, TokenUsage, ToolCall,
    ToolResult,
};
use cprompt::{RenderedPrompt, TemplateError};
use cschema::Validation;
use ctooling::{
    DefaultToolRuntime, ToolError, ToolExecutionContext, ToolRegistry, ToolRuntime, ToolSpec,
    parse_json_value,
};
use serde_json::{Value, json};

use crate::{
    Delivery, DeliveryLedger, FlowCatalog, FlowDefinition, FlowError, FlowResult,
    FlowRuntimeHooks, FlowState, InvocationRequest, ModelCall, ModelInvoker, ModelReply,
    NoopFlowRuntimeHooks, OutcomeContext, ToolCallRecord,
};

pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 5;

#[derive(Clone)]
pub struct FlowOrchestrator {
    catalog: Arc<FlowCatalog>,
    tools: Arc<dyn ToolRuntime>,
    invoker: ModelInvoker,
    hooks: Arc<dyn FlowRuntimeHooks>,
    max_tool_rounds: u32,
}

impl FlowOrchestrator {
    pub fn builder() -> FlowOrchestratorBuilder {
        FlowOrchestratorBuilder::default()
    }

    pub fn catalog(&self) -> &FlowCatalog {
        &self.catalog
    }

    pub fn invoker(&self) -> &ModelInvoker {
        &self.invoker
    }

    pub fn tool_runtime(&self) -> Arc<dyn ToolRuntime> {
        Arc::clone(&self.tools)
    }

    pub fn max_tool_rounds(&self) -> u32 {
        self.max_tool_rounds
    }

    /// Runs one invocation to a terminal state.
    ///
    /// Only input rejection, unknown flows, unrenderable prompts and model
    /// failures before any tool ran return `Err`. Tool failures are recorded on
    /// the result and never stop later calls. Once a tool has run, a failed
    /// follow-up model call ends the loop and the outcome comes from the ledger.
    pub async fn run(&self, request: InvocationRequest) -> Result<FlowResult, FlowError> {
        let started = Instant::now();
        let InvocationRequest {
            flow: flow_name,
            input,
            invocation_id,
            trace_id,
            metadata,
            cancellation,
        } = request;

        let Some(flow) = self.catalog.get(&flow_name) else {
            let error = FlowError::unknown_flow(&flow_name);
            self.hooks
                .on_flow_failure(&flow_name, &invocation_id, &error, started.elapsed());
            return Err(error);
        };

        let mut tracker = StateTracker::new(self.hooks.as_ref(), flow.name(), &invocation_id);
        tracker.advance(FlowState::Validating);

        let validated = match flow.input().validate(&input) {
            Validation::Valid(coerced) => coerced,
            Validation::Invalid(errors) => {
                tracker.advance(FlowState::Rejected);
                let error = FlowError::input_invalid(errors);
                self.hooks
                    .on_flow_failure(flow.name(), &invocation_id, &error, started.elapsed());
                return Err(error);
            }
        };

        let variables = flow.variables(&validated);
        let tool_specs = self.flow_tool_specs(&flow);

        let messages = match initial_messages(&flow, &variables) {
            Ok(messages) => messages,
            Err(error) => {
                tracker.advance(FlowState::Failed);
                let error = FlowError::from(error);
                self.hooks
                    .on_flow_failure(flow.name(), &invocation_id, &error, started.elapsed());
                return Err(error);
            }
        };

        let mut call = ModelCall::new(messages)
            .with_tools(
                flow.tool_names()
                    .iter()
                    .filter_map(|name| tool_specs.get(name))
                    .map(ToolSpec::to_model_definition)
                    .collect(),
            )
            .with_options(flow.options())
            .with_timeout(flow.model_timeout().unwrap_or(self.invoker.timeout()));
        if let Some(output) = flow.output() {
            call = call.with_output(flow.output_name(), output.clone());
        }
        call.metadata = metadata;
        call.metadata
            .insert("flow".to_string(), flow.name().to_string());

        let context = ToolExecutionContext {
            invocation_id: invocation_id.clone(),
            trace_id,
            metadata: call.metadata.clone(),
        };

        let max_rounds = flow.max_tool_rounds().unwrap_or(self.max_tool_rounds);
        let mut records = Vec::<ToolCallRecord>::new();
        let mut usage = TokenUsage::default();
        let mut raw_text = None::<String>;
        let mut structured_output = None::<Value>;
        let mut rounds = 0_u32;
        let mut limit_reached = false;
        let mut follow_up_error = None::<FlowError>;

        loop {
            tracker.advance(FlowState::Invoking);

            let turn = match self.invoker.invoke(&call, cancellation.as_ref()).await {
                Ok(turn) => turn,
                Err(error) if rounds > 0 => {
                    // Tool side effects already happened and cannot be undone.
                    tracker.advance(FlowState::ToolExecuting);
                    self.hooks
                        .on_follow_up_failure(flow.name(), &invocation_id, &error, rounds);
                    follow_up_error = Some(error);
                    break;
                }
                Err(error) => {
                    tracker.advance(FlowState::ModelError);
                    tracker.advance(FlowState::Failed);
                    self.hooks
                        .on_flow_failure(flow.name(), &invocation_id, &error, started.elapsed());
                    return Err(error);
                }
            };

            usage.accumulate(turn.usage);
            if !turn.raw_text.trim().is_empty() {
                raw_text = Some(turn.raw_text.clone());
            }

            let (tool_calls, final_output) = match turn.reply {
                ModelReply::FinalOutput(output) => {
                    tracker.advance(FlowState::DirectOutput);
                    structured_output = Some(output);
                    break;
                }
                ModelReply::TextOnly(_) => {
                    tracker.advance(FlowState::DirectOutput);
                    break;
                }
                ModelReply::ToolRequests(tool_calls) => (tool_calls, None),
                ModelReply::Both { output, tool_calls } => (tool_calls, Some(output)),
            };

            tracker.advance(FlowState::ToolExecuting);
            rounds += 1;
            call.messages.push(Message::assistant_tool_calls(
                turn.raw_text,
                tool_calls.clone(),
            ));

            for tool_call in tool_calls {
                let record = self
                    .execute_tool(&flow, &tool_specs, tool_call, rounds, &context)
                    .await;
                self.hooks
                    .on_tool_call_recorded(flow.name(), &invocation_id, &record);
                call.messages
                    .push(Message::tool_result(tool_result_message(&record)));
                records.push(record);
            }

            if final_output.is_some() {
                structured_output = final_output;
                break;
            }

            if rounds >= max_rounds {
                limit_reached = true;
                break;
            }
        }

        let ledger = DeliveryLedger::from_records(&records);
        let outcome = flow.outcome().evaluate(&OutcomeContext {
            flow: flow.name(),
            variables: &variables,
            structured_output: structured_output.as_ref(),
            raw_text: raw_text.as_deref(),
            records: &records,
            ledger: &ledger,
        });

        tracker.advance(FlowState::Completed);
        let result = FlowResult {
            invocation_id: invocation_id.clone(),
            flow: flow.name().to_string(),
            status: outcome.status,
            satisfied: outcome.satisfied,
            structured_output: outcome.output.or(structured_output),
            tool_calls: records,
            raw_text,
            state: tracker.state,
            usage,
            tool_rounds: rounds,
            tool_round_limit_reached: limit_reached,
            follow_up_error,
        };

        self.hooks
            .on_flow_complete(flow.name(), &invocation_id, &result, started.elapsed());
        Ok(result)
    }

    fn flow_tool_specs(&self, flow: &FlowDefinition) -> HashMap<String, ToolSpec> {
        let registry = self.tools.registry();
        flow.tool_names()
            .iter()
            .filter_map(|name| registry.spec(name).map(|spec| (name.clone(), spec)))
            .collect()
    }

    async fn execute_tool(
        &self,
        flow: &FlowDefinition,
        tool_specs: &HashMap<String, ToolSpec>,
        tool_call: ToolCall,
        round: u32,
        context: &ToolExecutionContext,
    ) -> ToolCallRecord {
        let started = Instant::now();
        let received_input = parse_json_value(&tool_call.arguments)
            .unwrap_or_else(|_| Value::String(tool_call.arguments.clone()));

        let Some(spec) = tool_specs.get(&tool_call.name) else {
            let error = ToolError::not_found(format!(
                "tool '{}' is not available to flow '{}'",
                tool_call.name,
                flow.name()
            ))
            .with_tool_name(&tool_call.name)
            .with_tool_call_id(&tool_call.id);

            return ToolCallRecord {
                call_id: tool_call.id,
                tool_name: tool_call.name,
                round,
                input: received_input,
                result: Err(error),
                elapsed: started.elapsed(),
                delivery: None,
            };
        };

        let call_id = tool_call.id.clone();
        let tool_name = tool_call.name.clone();

        match self.tools.execute(tool_call, context.clone()).await {
            Ok(executed) => {
                let delivery = spec.delivery.as_ref().and_then(|target| {
                    target
                        .recipient_in(&executed.input)
                        .map(|recipient| Delivery::new(target.channel, recipient))
                });

                ToolCallRecord {
                    call_id,
                    tool_name,
                    round,
                    input: executed.input,
                    result: Ok(executed.output),
                    elapsed: started.elapsed(),
                    delivery,
                }
            }
            Err(error) => ToolCallRecord {
                call_id,
                tool_name,
                round,
                input: received_input,
                result: Err(error),
                elapsed: started.elapsed(),
                delivery: None,
            },
        }
    }
}

fn initial_messages(
    flow: &FlowDefinition,
    variables: &Value,
) -> Result<Vec<Message>, TemplateError> {
    let mut messages = Vec::new();

    if let Some(system) = flow.system() {
        let rendered = system.render(variables)?;
        if !rendered.is_empty() {
            messages.push(to_message(Message::system(rendered.text.clone()), rendered));
        }
    }

    let prompt = flow.prompt().render(variables)?;
    messages.push(to_message(Message::user(prompt.text.clone()), prompt));
    Ok(messages)
}

fn to_message(message: Message, rendered: RenderedPrompt) -> Message {
    message.with_media(
        rendered
            .media
            .into_iter()
            .map(|media| MediaPart::new(media.url, media.content_type)),
    )
}

fn tool_result_message(record: &ToolCallRecord) -> ToolResult {
    let output = match &record.result {
        Ok(output) => output.to_string(),
        Err(error) => json!({
            "error": error.message,
            "kind": format!("{:?}", error.kind),
        })
        .to_string(),
    };

    ToolResult {
        tool_call_id: record.call_id.clone(),
        output,
    }
}

/// Tracks the current state and reports every transition to the hooks.
struct StateTracker<'a> {
    hooks: &'a dyn FlowRuntimeHooks,
    flow: &'a str,
    invocation_id: &'a InvocationId,
    state: FlowState,
}

impl<'a> StateTracker<'a> {
    fn new(hooks: &'a dyn FlowRuntimeHooks, flow: &'a str, invocation_id: &'a InvocationId) -> Self {
        Self {
            hooks,
            flow,
            invocation_id,
            state: FlowState::Pending,
        }
    }

    fn advance(&mut self, next: FlowState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal flow transition {} -> {}",
            self.state,
            next
        );

        let previous = self.state;
        self.state = next;
        self.hooks
            .on_state_change(self.flow, self.invocation_id, previous, next);
    }
}

#[derive(Default)]
pub struct FlowOrchestratorBuilder {
    provider: Option<Arc<dyn ModelProvider>>,
    model: Option<String>,
    flows: Vec<FlowDefinition>,
    catalog: Option<FlowCatalog>,
    tools: Option<Arc<dyn ToolRuntime>>,
    hooks: Option<Arc<dyn FlowRuntimeHooks>>,
    provider_hooks: Option<Arc<dyn ProviderOperationHooks>>,
    retry_policy: Option<RetryPolicy>,
    model_timeout: Option<Duration>,
    max_tool_rounds: Option<u32>,
}

impl FlowOrchestratorBuilder {
    pub fn provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn catalog(mut self, catalog: FlowCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn flow(mut self, flow: FlowDefinition) -> Self {
        self.flows.push(flow);
        self
    }

    pub fn tool_runtime(mut self, runtime: Arc<dyn ToolRuntime>) -> Self {
        self.tools = Some(runtime);
        self
    }

    pub fn tool_registry(self, registry: ToolRegistry) -> Self {
        self.tool_runtime(Arc::new(DefaultToolRuntime::new(Arc::new(registry))))
    }

    pub fn hooks(mut self, hooks: Arc<dyn FlowRuntimeHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn provider_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.provider_hooks = Some(hooks);
        self
    }

    pub fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = Some(retry_policy);
        self
    }

    pub fn model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = Some(timeout);
        self
    }

    pub fn max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = Some(rounds);
        self
    }

    /// Fails when a flow names a tool the runtime does not provide.
    pub fn build(self) -> Result<FlowOrchestrator, FlowError> {
        let provider = self
            .provider
            .ok_or_else(|| FlowError::configuration("a model provider is required"))?;
        let model = self
            .model
            .filter(|model| !model.trim().is_empty())
            .ok_or_else(|| FlowError::configuration("a model name is required"))?;

        let max_tool_rounds = self.max_tool_rounds.unwrap_or(DEFAULT_MAX_TOOL_ROUNDS);
        if max_tool_rounds == 0 {
            return Err(FlowError::configuration(
                "max_tool_rounds must be at least 1",
            ));
        }

        let mut catalog = self.catalog.unwrap_or_default();
        for flow in self.flows {
            catalog.register(flow)?;
        }

        let tools = self
            .tools
            .unwrap_or_else(|| Arc::new(DefaultToolRuntime::default()));
        let registry = tools.registry();
        for flow in catalog.iter() {
            if let Some(missing) = flow
                .tool_names()
                .iter()
                .find(|name| !registry.contains(name))
            {
                return Err(FlowError::configuration(format!(
                    "flow '{}' references unregistered tool '{missing}'",
                    flow.name()
                )));
            }
        }

        let mut invoker = ModelInvoker::new(provider, model);
        if let Some(timeout) = self.model_timeout {
            invoker = invoker.with_timeout(timeout);
        }
        if let Some(retry_policy) = self.retry_policy {
            invoker = invoker.with_retry_policy(retry_policy);
        }
        if let Some(hooks) = self.provider_hooks {
            invoker = invoker.with_hooks(hooks);
        }

        Ok(FlowOrchestrator {
            catalog: Arc::new(catalog),
            tools,
            invoker,
            hooks: self
                .hooks
                .unwrap_or_else(|| Arc::new(NoopFlowRuntimeHooks)),
            max_tool_rounds,
        })
    }
}
