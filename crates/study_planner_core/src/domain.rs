//! crates/study_planner_core/src/domain.rs
//!
//! Defines the core data structures exchanged between the browser client,
//! the planner and the external generation service.
//!
//! Field names follow the camelCase JSON the client sends and the model is
//! instructed to return, so these types double as the wire format.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

//=========================================================================================
// Input: what the student tells us
//=========================================================================================

/// The default value of the daily-hours slider on the plan form.
pub const DEFAULT_DAILY_HOURS: u8 = 4;

/// The structured input describing a student's exam, subjects, and constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanParams {
    pub exam_type: String,
    /// `None` when the student has not picked a date yet. An empty string
    /// from the form is read as "not set".
    #[serde(default, deserialize_with = "deserialize_exam_date")]
    pub exam_date: Option<NaiveDate>,
    #[serde(default = "default_daily_hours")]
    pub daily_hours: u8,
    pub subjects: Vec<String>,
    #[serde(default)]
    pub weak_subjects: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_notes")]
    pub extra_notes: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

fn default_daily_hours() -> u8 {
    DEFAULT_DAILY_HOURS
}

fn deserialize_exam_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(date) => date
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid examDate '{date}': {e}"))),
    }
}

fn deserialize_notes<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|notes| !notes.trim().is_empty()))
}

/// A user-supplied file (image or PDF) encoded as base64 for inclusion in
/// the generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub mime_type: String,
    /// Standard base64, no data-URL prefix.
    pub data: String,
    pub file_name: String,
}

impl Attachment {
    /// Size of the base64 payload as it travels on the wire.
    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }

    /// Size of the original file, recovered from the base64 length.
    pub fn decoded_len(&self) -> usize {
        let data = self.data.trim_end();
        let padding = data.bytes().rev().take_while(|b| *b == b'=').count().min(2);
        (data.len() / 4 * 3).saturating_sub(padding)
    }
}

//=========================================================================================
// Output: what the model is instructed to return
//=========================================================================================

/// How urgent one slot of the daily schedule is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// One slot of the repeating daily schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DayTask {
    pub time_slot: String,
    pub subject: String,
    pub activity: String,
    pub priority: Priority,
}

/// A goal for one week of the preparation period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMilestone {
    pub week_number: u32,
    pub focus_area: String,
    pub revision_topic: String,
    pub mock_test_goal: String,
}

/// The structured study plan. Every field is required; the lists may be
/// empty but must be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanResponse {
    pub summary: String,
    pub daily_schedule_template: Vec<DayTask>,
    pub weekly_breakdown: Vec<WeeklyMilestone>,
    pub general_study_tips: Vec<String>,
    pub mock_test_suggestions: Vec<String>,
    pub weak_subject_strategy: String,
}

//=========================================================================================
// Resource finder
//=========================================================================================

/// A web source the provider's search grounding pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ResourceLink {
    pub uri: String,
    pub title: String,
}

/// The answer to a resource lookup: a short write-up plus the links it was
/// grounded on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ResourceSuggestions {
    pub summary: String,
    pub links: Vec<ResourceLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_payload_with_blank_date_and_notes_reads_as_absent() {
        let params: StudyPlanParams = serde_json::from_str(
            r#"{"examType":"Finals","examDate":"","dailyHours":6,
                "subjects":["Math"],"weakSubjects":[],"extraNotes":"  "}"#,
        )
        .unwrap();

        assert_eq!(params.exam_date, None);
        assert_eq!(params.extra_notes, None);
        assert!(params.attachments.is_empty());
    }

    #[test]
    fn exam_date_parses_iso_dates_and_hours_default_to_four() {
        let params: StudyPlanParams = serde_json::from_str(
            r#"{"examType":"SAT","examDate":"2026-12-05","subjects":["Reading"]}"#,
        )
        .unwrap();

        assert_eq!(params.exam_date, NaiveDate::from_ymd_opt(2026, 12, 5));
        assert_eq!(params.daily_hours, DEFAULT_DAILY_HOURS);
    }

    #[test]
    fn garbage_exam_date_is_rejected() {
        let result = serde_json::from_str::<StudyPlanParams>(
            r#"{"examType":"SAT","examDate":"next tuesday","subjects":["Reading"]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn decoded_len_accounts_for_padding() {
        let attachment = |data: &str| Attachment {
            mime_type: "image/png".into(),
            data: data.into(),
            file_name: "a.png".into(),
        };
        // "abc" / "ab" / "a"
        assert_eq!(attachment("YWJj").decoded_len(), 3);
        assert_eq!(attachment("YWI=").decoded_len(), 2);
        assert_eq!(attachment("YQ==").decoded_len(), 1);
        assert_eq!(attachment("YQ==").encoded_len(), 4);
    }
}
