//! crates/study_planner_core/src/planner.rs
//!
//! Composes builder, generation port and normalizer into the three
//! operations the front-end needs. Each call is one round trip; nothing is
//! retried and nothing is cached.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{ResourceSuggestions, StudyPlanParams, StudyPlanResponse};
use crate::error::PlanError;
use crate::normalize::normalize_plan;
use crate::ports::GenerationService;
use crate::prompt::build_plan_request;
use crate::resources::{build_resource_request, normalize_resources};
use crate::tools::{build_tool_request, normalize_tool_output, StudyTool, ToolOutput};

#[derive(Clone)]
pub struct StudyPlanner {
    generator: Arc<dyn GenerationService>,
}

impl StudyPlanner {
    pub fn new(generator: Arc<dyn GenerationService>) -> Self {
        Self { generator }
    }

    /// Generates a plan for already-validated params.
    pub async fn generate_plan(&self, params: &StudyPlanParams) -> Result<StudyPlanResponse, PlanError> {
        info!(
            exam = %params.exam_type,
            subjects = params.subjects.len(),
            attachments = params.attachments.len(),
            "Requesting study plan"
        );
        let request = build_plan_request(params);
        debug!(prompt_len = request.prompt.len(), "Plan prompt assembled");

        let output = self.generator.generate(request).await?;
        let plan = normalize_plan(output.text.as_deref())?;

        info!(
            days = plan.daily_schedule_template.len(),
            weeks = plan.weekly_breakdown.len(),
            "Study plan received"
        );
        Ok(plan)
    }

    /// Runs one study tool on the student's topic or notes. The answer is
    /// always decoded as the same tool the prompt was built for.
    pub async fn run_tool(&self, tool: StudyTool, input: &str) -> Result<ToolOutput, PlanError> {
        let request = build_tool_request(tool, input)?;
        info!(%tool, "Running study tool");
        let output = self.generator.generate(request).await?;
        normalize_tool_output(tool, &output)
    }

    /// Searches the web for free material on `query`.
    pub async fn find_resources(&self, query: &str) -> Result<ResourceSuggestions, PlanError> {
        let request = build_resource_request(query)?;
        info!("Searching for study resources");
        let output = self.generator.generate(request).await?;
        let suggestions = normalize_resources(output)?;
        debug!(links = suggestions.links.len(), "Resource lookup finished");
        Ok(suggestions)
    }
}
