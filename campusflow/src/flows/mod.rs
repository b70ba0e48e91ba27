//! The CampusConnect flow catalog.

pub mod billing;
pub mod fee_reminder;
pub mod learning;
pub mod voice;

use cflow::{FlowCatalog, FlowDefinition, FlowError};

pub use billing::ADDITIONAL_STUDENT_BILLING;
pub use fee_reminder::{FEES_NOT_CHECKED_STATUS, SEND_FEE_REMINDERS};
pub use learning::{GENERATE_QUIZ, PLAN_LESSON, STUDY_BUDDY, SUMMARIZE_DOCUMENT};
pub use voice::VOICE_COMMAND;

pub fn campus_flows() -> Result<Vec<FlowDefinition>, FlowError> {
    Ok(vec![
        billing::flow()?,
        fee_reminder::flow()?,
        voice::flow()?,
        learning::study_buddy()?,
        learning::summarize_document()?,
        learning::generate_quiz()?,
        learning::plan_lesson()?,
    ])
}

pub fn campus_catalog() -> Result<FlowCatalog, FlowError> {
    let mut catalog = FlowCatalog::new();
    for flow in campus_flows()? {
        catalog.register(flow)?;
    }
    Ok(catalog)
}
