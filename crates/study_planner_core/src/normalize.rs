//! crates/study_planner_core/src/normalize.rs
//!
//! The Response Validator/Normalizer. Every structured answer from the
//! generation service goes through `parse_structured`, so plans and tool
//! results share one strict path: no text is `EmptyResponse`, anything that
//! does not decode into the full target type is `MalformedResponse`.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::domain::StudyPlanResponse;
use crate::error::PlanError;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*(?:```)?$").expect("fence pattern is valid")
    })
}

/// Removes a surrounding markdown code fence (```` ``` ```` or
/// ```` ```json ````), if any, and trims whitespace. An opening fence is
/// stripped even when the answer was cut off before the closing one.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    match fence_regex().captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => trimmed,
    }
}

/// Returns the text, or `EmptyResponse` when there is none.
pub fn require_text(text: Option<&str>) -> Result<&str, PlanError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(PlanError::EmptyResponse),
    }
}

/// Decodes a fenced or bare JSON answer into `T`.
pub fn parse_structured<T: DeserializeOwned>(text: Option<&str>) -> Result<T, PlanError> {
    let text = require_text(text)?;
    serde_json::from_str(strip_code_fences(text))
        .map_err(|e| PlanError::MalformedResponse(e.to_string()))
}

/// Validates the service's raw answer as a `StudyPlanResponse`.
pub fn normalize_plan(text: Option<&str>) -> Result<StudyPlanResponse, PlanError> {
    parse_structured(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DayTask, Priority, WeeklyMilestone};

    const PLAN_JSON: &str = r#"{"summary":"...", "dailyScheduleTemplate":[{"timeSlot":"9-10am","subject":"Math","activity":"Algebra review","priority":"High"}], "weeklyBreakdown":[{"weekNumber":1,"focusArea":"Math","revisionTopic":"Algebra","mockTestGoal":"Practice set A"}], "generalStudyTips":["Take breaks"], "mockTestSuggestions":["Mock test 1"], "weakSubjectStrategy":"Extra time on Math"}"#;

    fn expected() -> StudyPlanResponse {
        StudyPlanResponse {
            summary: "...".into(),
            daily_schedule_template: vec![DayTask {
                time_slot: "9-10am".into(),
                subject: "Math".into(),
                activity: "Algebra review".into(),
                priority: Priority::High,
            }],
            weekly_breakdown: vec![WeeklyMilestone {
                week_number: 1,
                focus_area: "Math".into(),
                revision_topic: "Algebra".into(),
                mock_test_goal: "Practice set A".into(),
            }],
            general_study_tips: vec!["Take breaks".into()],
            mock_test_suggestions: vec!["Mock test 1".into()],
            weak_subject_strategy: "Extra time on Math".into(),
        }
    }

    #[test]
    fn parses_a_well_formed_plan() {
        assert_eq!(normalize_plan(Some(PLAN_JSON)).unwrap(), expected());
    }

    #[test]
    fn fenced_plan_parses_like_the_bare_one() {
        let fenced = format!("```json\n{PLAN_JSON}\n```");
        assert_eq!(normalize_plan(Some(&fenced)).unwrap(), expected());

        let bare_fence = format!("  ```\n{PLAN_JSON}```  ");
        assert_eq!(normalize_plan(Some(&bare_fence)).unwrap(), expected());
    }

    #[test]
    fn truncated_json_is_malformed() {
        let truncated = &PLAN_JSON[..PLAN_JSON.len() / 2];
        assert!(matches!(
            normalize_plan(Some(truncated)),
            Err(PlanError::MalformedResponse(_))
        ));
    }

    #[test]
    fn missing_field_is_malformed() {
        let missing = PLAN_JSON.replace(r#", "weakSubjectStrategy":"Extra time on Math""#, "");
        assert!(matches!(
            normalize_plan(Some(&missing)),
            Err(PlanError::MalformedResponse(msg)) if msg.contains("weakSubjectStrategy")
        ));
    }

    #[test]
    fn priority_outside_the_enum_is_malformed() {
        let urgent = PLAN_JSON.replace(r#""priority":"High""#, r#""priority":"Urgent""#);
        assert!(matches!(
            normalize_plan(Some(&urgent)),
            Err(PlanError::MalformedResponse(_))
        ));
    }

    #[test]
    fn empty_arrays_are_allowed() {
        let empty = r#"{"summary":"s","dailyScheduleTemplate":[],"weeklyBreakdown":[],
            "generalStudyTips":[],"mockTestSuggestions":[],"weakSubjectStrategy":"w"}"#;
        let plan = normalize_plan(Some(empty)).unwrap();
        assert!(plan.daily_schedule_template.is_empty());
    }

    #[test]
    fn no_text_is_an_empty_response() {
        assert!(matches!(normalize_plan(None), Err(PlanError::EmptyResponse)));
        assert!(matches!(normalize_plan(Some("")), Err(PlanError::EmptyResponse)));
        assert!(matches!(normalize_plan(Some(" \n ")), Err(PlanError::EmptyResponse)));
    }

    #[test]
    fn strip_code_fences_leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("  [1, 2] "), "[1, 2]");
        assert_eq!(strip_code_fences("```json[1]```"), "[1]");
    }

    #[test]
    fn opening_fence_without_a_closing_one_is_still_stripped() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n"), "[1, 2]");

        let unterminated = format!("```json\n{PLAN_JSON}");
        assert_eq!(normalize_plan(Some(&unterminated)).unwrap(), expected());
    }
}
