use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use study_planner_core::ports::{GenerationOutput, GenerationRequest, GenerationService, PortError, PortResult};
use study_planner_core::{
    Attachment, PlanError, Priority, ResourceLink, StudyPlanParams, StudyPlanner, StudyTool,
    ToolOutput, ValidationError,
};

/// Replays a fixed answer and remembers every request it was sent.
struct ScriptedGenerator {
    reply: Mutex<Option<PortResult<GenerationOutput>>>,
    seen: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    fn new(reply: PortResult<GenerationOutput>) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(reply)),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> PortResult<GenerationOutput> {
        self.seen.lock().unwrap().push(request);
        self.reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(PortError::Transport("no scripted reply left".into())))
    }
}

const PLAN_JSON: &str = r#"{"summary":"Six weeks to finals","dailyScheduleTemplate":[{"timeSlot":"9-10am","subject":"Physics","activity":"Kinematics drills","priority":"High"},{"timeSlot":"10-10:15am","subject":"Break","activity":"Walk","priority":"Low"}],"weeklyBreakdown":[{"weekNumber":1,"focusArea":"Physics","revisionTopic":"Kinematics","mockTestGoal":"Past paper 1"}],"generalStudyTips":["Sleep well"],"mockTestSuggestions":["Week 2 mock"],"weakSubjectStrategy":"Physics first every morning"}"#;

fn params() -> StudyPlanParams {
    StudyPlanParams {
        exam_type: "Finals".into(),
        exam_date: None,
        daily_hours: 3,
        subjects: vec!["Math".into(), "Physics".into()],
        weak_subjects: vec!["Physics".into()],
        extra_notes: None,
        attachments: vec![Attachment {
            mime_type: "image/jpeg".into(),
            data: "/9j/".into(),
            file_name: "syllabus.jpg".into(),
        }],
    }
}

#[tokio::test]
async fn plan_round_trip_sends_schema_and_attachments() {
    let generator = ScriptedGenerator::new(Ok(GenerationOutput::text(format!(
        "```json\n{PLAN_JSON}\n```"
    ))));
    let planner = StudyPlanner::new(generator.clone());

    let plan = planner.generate_plan(&params()).await.unwrap();

    assert_eq!(plan.summary, "Six weeks to finals");
    assert_eq!(plan.daily_schedule_template[0].priority, Priority::High);
    assert_eq!(plan.weekly_breakdown[0].week_number, 1);

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.response_schema.is_some());
    assert_eq!(request.attachments[0].file_name, "syllabus.jpg");
    assert!(request.prompt.contains("Physics"));
    assert!(request.prompt.contains("ATTACHMENTS"));
}

#[tokio::test]
async fn transport_failure_surfaces_as_typed_error() {
    let generator = ScriptedGenerator::new(Err(PortError::Unauthorized("API key not valid".into())));
    let planner = StudyPlanner::new(generator);

    let err = planner.generate_plan(&params()).await.unwrap_err();

    assert!(matches!(
        err,
        PlanError::TransportFailure(PortError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn empty_and_malformed_answers_are_distinguished() {
    let planner = StudyPlanner::new(ScriptedGenerator::new(Ok(GenerationOutput::default())));
    assert!(matches!(
        planner.generate_plan(&params()).await,
        Err(PlanError::EmptyResponse)
    ));

    let planner = StudyPlanner::new(ScriptedGenerator::new(Ok(GenerationOutput::text(
        r#"{"summary":"cut off"#,
    ))));
    assert!(matches!(
        planner.generate_plan(&params()).await,
        Err(PlanError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn quiz_tool_parses_structured_answer() {
    let generator = ScriptedGenerator::new(Ok(GenerationOutput::text(
        r#"[{"question":"2+2?","options":["3","4"],"answer":"4"}]"#,
    )));
    let planner = StudyPlanner::new(generator.clone());
    let output = planner.run_tool(StudyTool::Quiz, "arithmetic").await.unwrap();

    match output {
        ToolOutput::Quiz { questions } => {
            assert_eq!(questions.len(), 1);
            assert_eq!(questions[0].answer, "4");
        }
        other => panic!("unexpected output {other:?}"),
    }
    assert!(generator.requests()[0].prompt.contains("about: arithmetic."));
}

#[tokio::test]
async fn resource_lookup_uses_web_search_and_returns_links() {
    let generator = ScriptedGenerator::new(Ok(GenerationOutput {
        text: Some("Khan Academy covers this well.".into()),
        sources: vec![ResourceLink {
            uri: "https://www.khanacademy.org/math".into(),
            title: "".into(),
        }],
    }));
    let planner = StudyPlanner::new(generator.clone());
    let suggestions = planner.find_resources("algebra").await.unwrap();

    assert_eq!(suggestions.links.len(), 1);
    assert_eq!(suggestions.links[0].title, "Educational Resource");
    assert!(generator.requests()[0].web_search);
}

#[tokio::test]
async fn tool_answer_is_decoded_as_the_tool_it_was_asked_of() {
    let generator = ScriptedGenerator::new(Ok(GenerationOutput::text(
        r#"[{"front":"H2O","back":"Water"}]"#,
    )));
    let planner = StudyPlanner::new(generator.clone());

    let output = planner.run_tool(StudyTool::Flashcards, "chemistry").await.unwrap();

    assert!(matches!(output, ToolOutput::Flashcards { .. }));
    let request = &generator.requests()[0];
    assert!(request.prompt.contains("chemistry"));
    assert_eq!(request.response_schema, StudyTool::Flashcards.spec().schema.map(|schema| schema()));
}

#[tokio::test]
async fn blank_tool_input_and_query_never_reach_the_service() {
    let generator = ScriptedGenerator::new(Ok(GenerationOutput::text("unused")));
    let planner = StudyPlanner::new(generator.clone());

    assert!(matches!(
        planner.run_tool(StudyTool::Quiz, "   ").await,
        Err(PlanError::InvalidInput(ValidationError::EmptyInput))
    ));
    assert!(matches!(
        planner.find_resources("").await,
        Err(PlanError::InvalidInput(ValidationError::EmptyInput))
    ));
    assert!(generator.requests().is_empty());
}
