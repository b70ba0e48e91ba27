//! Classroom assistants that answer with a structured object and call no tools.

use cflow::{
    FlowDefinition, FlowError, FnOutcomePolicy, OUTPUT_MISSING_STATUS, Outcome, OutcomeContext,
    StructuredOutputPolicy,
};
use cschema::{Field, FieldType, ObjectSchema, StringFormat};
use serde_json::Value;

pub const STUDY_BUDDY: &str = "studyBuddy";
pub const SUMMARIZE_DOCUMENT: &str = "summarizeDocument";
pub const GENERATE_QUIZ: &str = "generateQuiz";
pub const PLAN_LESSON: &str = "planLesson";

pub const QUIZ_DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];

pub fn study_buddy() -> Result<FlowDefinition, FlowError> {
    FlowDefinition::builder(STUDY_BUDDY)
        .description("Answer a student's question step by step, optionally from a photo.")
        .input(
            ObjectSchema::builder()
                .field(Field::string("question").min_length(1).max_length(2000))
                .field(Field::string("subject").optional())
                .field(Field::string("gradeLevel").optional())
                .field(
                    Field::string("photoDataUri")
                        .format(StringFormat::DataUri)
                        .optional()
                        .describe("Photo of the exercise as a base64 data URI"),
                )
                .build(),
        )
        .output(
            ObjectSchema::builder()
                .field(Field::string("answer").min_length(1))
                .field(Field::array("steps", FieldType::string()).optional())
                .field(Field::array("relatedTopics", FieldType::string()).optional())
                .build(),
        )
        .system(
            "You are Study Buddy, a patient tutor for school students. Explain answers in \
             simple language suited to {{#if gradeLevel}}{{gradeLevel}}{{else}}the student's grade{{/if}}.",
        )
        .prompt(
            "{{#if subject}}Subject: {{subject}}\n{{/if}}Question: {{question}}\
             {{#if photoDataUri}}\nThe student attached a photo of the exercise.{{media url=photoDataUri}}{{/if}}",
        )
        .outcome(StructuredOutputPolicy::new().with_success_status("Answer ready."))
        .build()
}

pub fn summarize_document() -> Result<FlowDefinition, FlowError> {
    FlowDefinition::builder(SUMMARIZE_DOCUMENT)
        .description("Extract the text of a scanned document and summarize it.")
        .input(
            ObjectSchema::builder()
                .field(
                    Field::string("documentDataUri")
                        .format(StringFormat::DataUri)
                        .describe("Scanned page as a base64 data URI"),
                )
                .build(),
        )
        .output(
            ObjectSchema::builder()
                .field(Field::string("extractedText"))
                .field(Field::string("summary").min_length(1))
                .field(Field::array("keyPoints", FieldType::string()))
                .build(),
        )
        .system("You read scanned school documents accurately and summarize them for teachers.")
        .prompt(
            "Extract all readable text from the attached document, then summarize it and list \
             its key points.{{media url=documentDataUri}}",
        )
        .outcome(StructuredOutputPolicy::new().with_success_status("Document summarized."))
        .build()
}

pub fn generate_quiz() -> Result<FlowDefinition, FlowError> {
    let question = ObjectSchema::builder()
        .field(Field::string("question").min_length(1))
        .field(Field::array("options", FieldType::string()).min_items(2))
        .field(Field::string("correctAnswer").min_length(1))
        .field(Field::string("explanation").optional())
        .build();

    FlowDefinition::builder(GENERATE_QUIZ)
        .description("Write a multiple-choice quiz on a topic.")
        .input(
            ObjectSchema::builder()
                .field(Field::string("topic").min_length(1).max_length(200))
                .field(Field::integer("numberOfQuestions").min(1.0).max(20.0))
                .field(Field::enumeration("difficulty", QUIZ_DIFFICULTIES))
                .build(),
        )
        .output(
            ObjectSchema::builder()
                .field(Field::string("title").min_length(1))
                .field(Field::array("questions", FieldType::object(question)).min_items(1))
                .build(),
        )
        .system("You write clear multiple-choice quizzes for school classes.")
        .prompt(
            "Write a {{difficulty}} quiz about {{topic}} with exactly {{numberOfQuestions}} \
             questions. Every question has at least two options and the correct answer is one of them.",
        )
        .outcome(FnOutcomePolicy::new(quiz_outcome))
        .build()
}

fn quiz_outcome(context: &OutcomeContext<'_>) -> Outcome {
    let Some(output) = context.structured_output else {
        return Outcome::unsatisfied(OUTPUT_MISSING_STATUS);
    };

    let requested = context
        .variables
        .get("numberOfQuestions")
        .and_then(Value::as_u64)
        .unwrap_or_default();
    let returned = output
        .get("questions")
        .and_then(Value::as_array)
        .map_or(0, Vec::len) as u64;

    if returned == requested {
        Outcome::satisfied(format!("Quiz with {returned} questions ready."))
    } else {
        Outcome::unsatisfied(format!(
            "AI returned {returned} of {requested} requested questions."
        ))
    }
}

pub fn plan_lesson() -> Result<FlowDefinition, FlowError> {
    let activity = ObjectSchema::builder()
        .field(Field::string("name").min_length(1))
        .field(Field::integer("durationMinutes").positive())
        .field(Field::string("description"))
        .build();

    FlowDefinition::builder(PLAN_LESSON)
        .description("Draft a lesson plan with objectives, timed activities and an assessment.")
        .input(
            ObjectSchema::builder()
                .field(Field::string("subject").min_length(1))
                .field(Field::string("gradeLevel").min_length(1))
                .field(Field::string("topic").min_length(1))
                .field(Field::integer("durationMinutes").min(10.0).max(240.0))
                .build(),
        )
        .output(
            ObjectSchema::builder()
                .field(Field::string("title").min_length(1))
                .field(Field::array("objectives", FieldType::string()).min_items(1))
                .field(Field::array("activities", FieldType::object(activity)).min_items(1))
                .field(Field::array("materials", FieldType::string()).optional())
                .field(Field::string("assessment"))
                .build(),
        )
        .system("You are an experienced teacher who plans engaging, well-timed lessons.")
        .prompt(
            "Plan a {{durationMinutes}}-minute {{subject}} lesson on {{topic}} for {{gradeLevel}}. \
             The activity durations add up to the lesson length.",
        )
        .outcome(StructuredOutputPolicy::new().with_success_status("Lesson plan ready."))
        .build()
}
