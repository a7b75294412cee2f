//! crates/study_planner_core/src/session.rs
//!
//! Explicit per-student application state: the subjects currently in play,
//! the files staged for the next plan, the last plan or failure, and
//! whether a plan request is outstanding.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::attachments::AttachmentSet;
use crate::domain::StudyPlanResponse;
use crate::error::PlanError;
use crate::params::SubjectList;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("A study plan is already being generated for this session")]
    RequestInFlight,
}

#[derive(Debug, Clone)]
pub struct PlannerSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub attachments: AttachmentSet,
    active_subjects: SubjectList,
    plan: Option<StudyPlanResponse>,
    last_error: Option<String>,
    pending: bool,
}

impl PlannerSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            attachments: AttachmentSet::new(),
            active_subjects: SubjectList::new(),
            plan: None,
            last_error: None,
            pending: false,
        }
    }

    pub fn plan(&self) -> Option<&StudyPlanResponse> {
        self.plan.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Subjects offered as one-click shortcuts on the tool and resource
    /// screens.
    pub fn quick_pick_subjects(&self) -> &[String] {
        self.active_subjects.as_slice()
    }

    /// Marks a plan request as outstanding. The subjects become active right
    /// away so the other screens can offer them before the plan is ready.
    pub fn begin_plan_request(&mut self, subjects: &[String]) -> Result<(), SessionError> {
        if self.pending {
            return Err(SessionError::RequestInFlight);
        }
        self.pending = true;
        self.last_error = None;
        self.active_subjects = subjects.iter().map(String::as_str).collect();
        Ok(())
    }

    /// Records the outcome of the outstanding request. Any failure is kept
    /// only as the single user-facing message.
    pub fn finish_plan_request(&mut self, result: &Result<StudyPlanResponse, PlanError>) {
        self.pending = false;
        match result {
            Ok(plan) => {
                self.plan = Some(plan.clone());
                self.last_error = None;
            }
            Err(_) => self.last_error = Some(PlanError::USER_MESSAGE.to_string()),
        }
    }

    /// Clears the plan and any error so the student can start over. Active
    /// subjects and staged files are kept.
    pub fn reset(&mut self) {
        self.plan = None;
        self.last_error = None;
    }
}

impl Default for PlannerSession {
    fn default() -> Self {
        Self::new()
    }
}
