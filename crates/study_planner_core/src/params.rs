//! crates/study_planner_core/src/params.rs
//!
//! Pre-submission checks for `StudyPlanParams`, plus the subject list the
//! plan form builds one entry at a time.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::attachments::{self, AttachmentError};
use crate::domain::StudyPlanParams;

pub const MIN_DAILY_HOURS: u8 = 1;
pub const MAX_DAILY_HOURS: u8 = 12;

/// Reasons a plan request is refused before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Exam name is required")]
    MissingExamName,

    #[error("Add at least one subject")]
    NoSubjects,

    #[error("Daily study time must be between 1 and 12 hours, got {0}")]
    DailyHoursOutOfRange(u8),

    #[error("Subject \"{0}\" is listed more than once")]
    DuplicateSubject(String),

    #[error("Subject names cannot be blank")]
    BlankSubject,

    #[error("Tool input is empty")]
    EmptyInput,

    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}

impl StudyPlanParams {
    /// Runs every check the plan form performs before it lets the student
    /// submit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.exam_type.trim().is_empty() {
            return Err(ValidationError::MissingExamName);
        }
        if self.subjects.is_empty() {
            return Err(ValidationError::NoSubjects);
        }
        if !(MIN_DAILY_HOURS..=MAX_DAILY_HOURS).contains(&self.daily_hours) {
            return Err(ValidationError::DailyHoursOutOfRange(self.daily_hours));
        }
        check_unique(&self.subjects)?;
        check_unique(&self.weak_subjects)?;
        attachments::check_all(&self.attachments)?;
        Ok(())
    }
}

fn check_unique(names: &[String]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankSubject);
        }
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateSubject(name.to_string()));
        }
    }
    Ok(())
}

/// An ordered list of unique, trimmed subject names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectList(Vec<String>);

impl SubjectList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subject. Blank names and names already present are ignored;
    /// returns whether the list changed.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.0.iter().any(|existing| existing == name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> FromIterator<&'a str> for SubjectList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut list = SubjectList::new();
        for name in iter {
            list.add(name);
        }
        list
    }
}
