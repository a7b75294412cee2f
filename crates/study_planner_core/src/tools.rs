//! crates/study_planner_core/src/tools.rs
//!
//! The auxiliary study tools. Each tool identifier resolves through a single
//! lookup to its prompt template and, for structured tools, the schema its
//! answer must match.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlanError;
use crate::normalize::{parse_structured, require_text};
use crate::params::ValidationError;
use crate::ports::{GenerationOutput, GenerationRequest};
use crate::schema::{array_of, object, string};

//=========================================================================================
// Tool identifiers and their lookup table
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum StudyTool {
    Flashcards,
    Quiz,
    Summarizer,
    Predictor,
    Mnemonic,
    ConceptMap,
    Assistant,
    Glossary,
}

/// What a tool sends and what it expects back.
pub struct ToolSpec {
    /// Contains one `{input}` placeholder.
    pub prompt_template: &'static str,
    /// `None` for tools that answer in free text.
    pub schema: Option<fn() -> Value>,
}

impl StudyTool {
    pub const ALL: [StudyTool; 8] = [
        StudyTool::Flashcards,
        StudyTool::Quiz,
        StudyTool::Summarizer,
        StudyTool::Predictor,
        StudyTool::Mnemonic,
        StudyTool::ConceptMap,
        StudyTool::Assistant,
        StudyTool::Glossary,
    ];

    pub fn id(self) -> &'static str {
        match self {
            StudyTool::Flashcards => "flashcards",
            StudyTool::Quiz => "quiz",
            StudyTool::Summarizer => "summarizer",
            StudyTool::Predictor => "predictor",
            StudyTool::Mnemonic => "mnemonic",
            StudyTool::ConceptMap => "conceptmap",
            StudyTool::Assistant => "assistant",
            StudyTool::Glossary => "glossary",
        }
    }

    pub fn spec(self) -> ToolSpec {
        match self {
            StudyTool::Flashcards => ToolSpec {
                prompt_template: "Create 6 simple study flashcards for: {input}. Each has a 'front' and a 'back'. Use simple English. Return as JSON.",
                schema: Some(flashcards_schema),
            },
            StudyTool::Quiz => ToolSpec {
                prompt_template: "Make a 5-question multiple choice quiz for a student about: {input}. Keep it simple. Return as JSON.",
                schema: Some(quiz_schema),
            },
            StudyTool::Summarizer => ToolSpec {
                prompt_template: "Take these notes and give me the \"Big Points\" in easy words. Use bullet points: {input}",
                schema: None,
            },
            StudyTool::Predictor => ToolSpec {
                prompt_template: "Look at this topic: \"{input}\". Guess 4 questions that might be on the test. Tell me why they are important and what special word I should use in my answer. Return as JSON.",
                schema: Some(predictions_schema),
            },
            StudyTool::Mnemonic => ToolSpec {
                prompt_template: "Give me 2 easy ways to remember this: {input}. Use funny sentences or acronyms.",
                schema: None,
            },
            StudyTool::ConceptMap => ToolSpec {
                prompt_template: "Make a \"Topic Tree\" for {input}. Use simple text branches like ├── to show how big ideas break into smaller ones.",
                schema: None,
            },
            StudyTool::Assistant => ToolSpec {
                prompt_template: "You are a helpful study buddy. Explain this simply and answer any questions the student might have: {input}",
                schema: None,
            },
            StudyTool::Glossary => ToolSpec {
                prompt_template: "Look at this text and pull out 5 to 8 \"Hard Words\" or \"Key Words\". For each word, give me a very simple definition. Return as JSON.\n\nTEXT:\n{input}",
                schema: Some(glossary_schema),
            },
        }
    }
}

impl fmt::Display for StudyTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// An identifier that names no tool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown study tool: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for StudyTool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StudyTool::ALL
            .into_iter()
            .find(|tool| tool.id() == s)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

//=========================================================================================
// Structured tool answers
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ExamPrediction {
    pub question: String,
    pub importance: String,
    pub key_term: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GlossaryEntry {
    pub word: String,
    pub meaning: String,
}

/// A validated tool answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolOutput {
    Flashcards { cards: Vec<Flashcard> },
    Quiz { questions: Vec<QuizQuestion> },
    Predictions { questions: Vec<ExamPrediction> },
    Glossary { entries: Vec<GlossaryEntry> },
    Text { text: String },
}

fn flashcards_schema() -> Value {
    array_of(object(&[("front", string()), ("back", string())]))
}

fn quiz_schema() -> Value {
    array_of(object(&[
        ("question", string()),
        ("options", array_of(string())),
        ("answer", string()),
    ]))
}

fn predictions_schema() -> Value {
    array_of(object(&[
        ("question", string()),
        ("importance", string()),
        ("keyTerm", string()),
    ]))
}

fn glossary_schema() -> Value {
    array_of(object(&[("word", string()), ("meaning", string())]))
}

//=========================================================================================
// Request / response
//=========================================================================================

/// Fills the tool's template with the student's input.
pub fn build_tool_request(tool: StudyTool, input: &str) -> Result<GenerationRequest, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    let spec = tool.spec();
    Ok(GenerationRequest {
        prompt: spec.prompt_template.replace("{input}", input),
        attachments: Vec::new(),
        response_schema: spec.schema.map(|schema| schema()),
        web_search: false,
    })
}

/// Validates a tool answer on the same strict path as study plans.
pub fn normalize_tool_output(tool: StudyTool, output: &GenerationOutput) -> Result<ToolOutput, PlanError> {
    let text = output.text.as_deref();
    Ok(match tool {
        StudyTool::Flashcards => ToolOutput::Flashcards {
            cards: parse_structured(text)?,
        },
        StudyTool::Quiz => ToolOutput::Quiz {
            questions: parse_structured(text)?,
        },
        StudyTool::Predictor => ToolOutput::Predictions {
            questions: parse_structured(text)?,
        },
        StudyTool::Glossary => ToolOutput::Glossary {
            entries: parse_structured(text)?,
        },
        StudyTool::Summarizer | StudyTool::Mnemonic | StudyTool::ConceptMap | StudyTool::Assistant => {
            ToolOutput::Text {
                text: require_text(text)?.trim().to_string(),
            }
        }
    })
}
