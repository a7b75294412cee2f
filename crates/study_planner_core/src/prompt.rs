//! crates/study_planner_core/src/prompt.rs
//!
//! The Plan Request Builder: turns a student's `StudyPlanParams` into the
//! instruction text, output schema and inline attachments of one
//! generation request.

use crate::domain::StudyPlanParams;
use crate::ports::GenerationRequest;
use crate::schema;

const COACH_PREAMBLE: &str = "You are a friendly and helpful study coach for students.

TASK: Create a simple, clear study plan.
LANGUAGE LEVEL: Use simple English.";

const UNDATED_NOTE: &str =
    "Not set yet (Please provide a general preparation plan for the next 6-8 weeks).";

const ATTACHMENTS_NOTE: &str = "ATTACHMENTS: The student has provided photos/PDFs of their syllabus or notes.
Use the information in these files to make the study plan very specific to their actual school work.";

const PRIORITY_DIRECTIVE: &str =
    "The plan must focus on the subjects they find hard. Include small breaks.";

const UNDATED_MOCK_TESTS: &str =
    "Since no exam date is set, suggest mock tests at regular intervals like every 2 weeks.";

/// Builds the instruction text for a study plan.
pub fn plan_prompt(params: &StudyPlanParams) -> String {
    let date_line = match params.exam_date {
        Some(date) => format!("- Exam Date: {date}"),
        None => format!("- Exam Date: {UNDATED_NOTE}"),
    };

    let mut student = vec![
        format!("- Exam: {}", params.exam_type.trim()),
        date_line,
        format!("- Daily Study Time: {} hours", params.daily_hours),
        format!("- All Subjects: {}", params.subjects.join(", ")),
        format!("- Subjects they find hard: {}", list_or_none(&params.weak_subjects)),
    ];
    if let Some(notes) = &params.extra_notes {
        student.push(format!("- Extra Notes from Student: \"{}\"", notes.trim()));
    }

    let mock_tests = match params.exam_date {
        Some(date) => format!("Suggest clear dates for practice tests (mock tests) before {date}."),
        None => UNDATED_MOCK_TESTS.to_string(),
    };

    let mut sections = vec![
        COACH_PREAMBLE.to_string(),
        format!("Student Information:\n{}", student.join("\n")),
    ];
    if !params.attachments.is_empty() {
        sections.push(ATTACHMENTS_NOTE.to_string());
    }
    sections.push(format!("{PRIORITY_DIRECTIVE}\n{mock_tests}"));
    sections.push("Return ONLY a valid JSON object.".to_string());

    sections.join("\n\n")
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "None listed".to_string()
    } else {
        names.join(", ")
    }
}

/// Assembles the full generation request for a validated `StudyPlanParams`.
///
/// Attachments travel as inline parts after the prompt, in the order the
/// student added them.
pub fn build_plan_request(params: &StudyPlanParams) -> GenerationRequest {
    GenerationRequest {
        prompt: plan_prompt(params),
        attachments: params.attachments.clone(),
        response_schema: Some(schema::study_plan()),
        web_search: false,
    }
}
