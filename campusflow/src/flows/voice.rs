//! Voice commands that move the dashboard to another page.

use cflow::{
    ACTION_MISSING_STATUS, FlowDefinition, FlowError, Outcome, OutcomeContext, OutcomePolicy,
};
use cschema::{Field, ObjectSchema};
use serde_json::{Value, json};

use crate::navigate::{DashboardPage, NAVIGATE};

pub const VOICE_COMMAND: &str = "voiceCommand";

const SYSTEM: &str = "\
You are the voice assistant of the CampusConnect dashboard. When the user asks to open, show \
or go to a page, call navigate with the matching page. Otherwise answer briefly in one sentence.";

const PROMPT: &str = "Voice command: \"{{command}}\"";

pub fn input_shape() -> ObjectSchema {
    ObjectSchema::builder()
        .field(
            Field::string("command")
                .min_length(1)
                .max_length(500)
                .describe("Transcribed speech"),
        )
        .build()
}

pub fn flow() -> Result<FlowDefinition, FlowError> {
    FlowDefinition::builder(VOICE_COMMAND)
        .description("Interpret a spoken dashboard command.")
        .input(input_shape())
        .system(SYSTEM)
        .prompt(PROMPT)
        .tool(NAVIGATE)
        .outcome(VoiceCommandPolicy)
        .build()
}

/// A successful navigation wins over any text the model produced.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoiceCommandPolicy;

impl OutcomePolicy for VoiceCommandPolicy {
    fn evaluate(&self, context: &OutcomeContext<'_>) -> Outcome {
        if let Some(page) = context
            .last_output_of(NAVIGATE)
            .and_then(|output| output.get("page"))
            .and_then(Value::as_str)
            .and_then(DashboardPage::parse)
        {
            return Outcome::satisfied(format!("Navigating to {}.", page.label())).with_output(
                json!({
                    "page": page.as_str(),
                    "label": page.label(),
                    "path": page.path(),
                }),
            );
        }

        match context.raw_text.map(str::trim).filter(|text| !text.is_empty()) {
            Some(text) => Outcome::satisfied(text),
            None => Outcome::unsatisfied(ACTION_MISSING_STATUS),
        }
    }
}
