//! crates/study_planner_core/src/schema.rs
//!
//! Declarative output schemas handed to the generation service.
//!
//! The provider accepts an OpenAPI-style subset with upper-case type names,
//! so schemas are plain `serde_json::Value`s built with the helpers below.

use serde_json::{json, Map, Value};

use crate::domain::Priority;

pub fn string() -> Value {
    json!({ "type": "STRING" })
}

pub fn integer() -> Value {
    json!({ "type": "INTEGER" })
}

pub fn string_enum(values: &[&str]) -> Value {
    json!({ "type": "STRING", "enum": values })
}

pub fn array_of(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

/// An object whose listed properties are all required.
pub fn object(properties: &[(&str, Value)]) -> Value {
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    let properties: Map<String, Value> = properties
        .iter()
        .map(|(name, schema)| (name.to_string(), schema.clone()))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

/// The exact shape of `StudyPlanResponse`.
pub fn study_plan() -> Value {
    let priorities: Vec<&str> = Priority::ALL.iter().map(|p| p.as_str()).collect();

    object(&[
        ("summary", string()),
        (
            "dailyScheduleTemplate",
            array_of(object(&[
                ("timeSlot", string()),
                ("subject", string()),
                ("activity", string()),
                ("priority", string_enum(&priorities)),
            ])),
        ),
        (
            "weeklyBreakdown",
            array_of(object(&[
                ("weekNumber", integer()),
                ("focusArea", string()),
                ("revisionTopic", string()),
                ("mockTestGoal", string()),
            ])),
        ),
        ("generalStudyTips", array_of(string())),
        ("mockTestSuggestions", array_of(string())),
        ("weakSubjectStrategy", string()),
    ])
}
