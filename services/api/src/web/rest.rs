//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_planner_core::{
    domain::{
        Attachment, DayTask, Priority, ResourceLink, ResourceSuggestions, StudyPlanParams,
        StudyPlanResponse, WeeklyMilestone,
    },
    tools::{ExamPrediction, Flashcard, GlossaryEntry, QuizQuestion},
    AttachmentError, PlanError, PlannerSession, RawFile, SessionError, StudyTool, ToolOutput,
};
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Shown for any failed tool run or resource lookup.
pub const TOOL_FAILURE_MESSAGE: &str =
    "I couldn't do that right now. Please check your internet and try again!";

type HandlerError = (StatusCode, String);

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_session_handler,
        get_session_handler,
        delete_session_handler,
        upload_attachments_handler,
        remove_attachment_handler,
        generate_plan_handler,
        reset_plan_handler,
        run_tool_handler,
        find_resources_handler,
    ),
    components(
        schemas(
            CreateSessionResponse, SessionView, AttachmentSummary, UploadReport, RejectedFile,
            ToolRequest, ResourceRequest, StudyPlanParams, Attachment, StudyPlanResponse,
            DayTask, WeeklyMilestone, Priority, StudyTool, ToolOutput, Flashcard, QuizQuestion,
            ExamPrediction, GlossaryEntry, ResourceSuggestions, ResourceLink
        )
    ),
    tags(
        (name = "Study Planner API", description = "API endpoints for the AI study planner.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after successfully creating a session.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    session_id: Uuid,
}

/// A staged attachment, without its payload.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentSummary {
    file_name: String,
    mime_type: String,
    size_bytes: usize,
}

/// Everything the client needs to redraw a planner session.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    session_id: Uuid,
    created_at: DateTime<Utc>,
    pending: bool,
    quick_pick_subjects: Vec<String>,
    attachments: Vec<AttachmentSummary>,
    attachment_bytes: usize,
    plan: Option<StudyPlanResponse>,
    error: Option<String>,
}

impl From<&PlannerSession> for SessionView {
    fn from(session: &PlannerSession) -> Self {
        Self {
            session_id: session.id,
            created_at: session.created_at,
            pending: session.is_pending(),
            quick_pick_subjects: session.quick_pick_subjects().to_vec(),
            attachments: session
                .attachments
                .as_slice()
                .iter()
                .map(|attachment| AttachmentSummary {
                    file_name: attachment.file_name.clone(),
                    mime_type: attachment.mime_type.clone(),
                    size_bytes: attachment.decoded_len(),
                })
                .collect(),
            attachment_bytes: session.attachments.total_encoded_bytes(),
            plan: session.plan().cloned(),
            error: session.last_error().map(str::to_string),
        }
    }
}

/// A file turned away during upload, and why.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectedFile {
    file_name: String,
    reason: String,
}

impl From<AttachmentError> for RejectedFile {
    fn from(error: AttachmentError) -> Self {
        Self {
            file_name: error.file_name().to_string(),
            reason: error.to_string(),
        }
    }
}

/// The outcome of an upload.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    accepted: Vec<String>,
    rejected: Vec<RejectedFile>,
    total_encoded_bytes: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct ToolRequest {
    input: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ResourceRequest {
    query: String,
}

fn session_not_found(id: Uuid) -> HandlerError {
    (StatusCode::NOT_FOUND, format!("Session {} not found", id))
}

/// Rejected input is a 400; any other failure is the generation service's.
fn tool_failure(error: PlanError, what: &str) -> HandlerError {
    match error {
        PlanError::InvalidInput(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        e => {
            error!("{} failed: {:?}", what, e);
            (StatusCode::BAD_GATEWAY, TOOL_FAILURE_MESSAGE.to_string())
        }
    }
}

//=========================================================================================
// Session Handlers
//=========================================================================================

/// Start a new planner session.
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session created successfully", body = CreateSessionResponse),
        (status = 503, description = "Too many live sessions")
    )
)]
pub async fn create_session_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), HandlerError> {
    let session = app_state.sessions.create().await.ok_or_else(|| {
        warn!("Session limit reached; refusing new session");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Too many planner sessions are open. Please try again later.".to_string(),
        )
    })?;
    info!(session_id = %session.id, "Planner session created");
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id,
        }),
    ))
}

/// Fetch the current state of a planner session.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    params(("id" = Uuid, Path, description = "The planner session ID.")),
    responses(
        (status = 200, description = "Current session state", body = SessionView),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, HandlerError> {
    let session = app_state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(SessionView::from(&session)))
}

/// Discard a planner session and everything staged in it.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    params(("id" = Uuid, Path, description = "The planner session ID.")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn delete_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .sessions
        .remove(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Attachment Handlers
//=========================================================================================

/// Stage study material for the next plan.
///
/// Accepts a multipart/form-data request with one or more image or PDF parts.
/// Oversized files are skipped; the first file that would push the session
/// past the total limit stops the upload.
#[utoipa::path(
    post,
    path = "/sessions/{id}/attachments",
    params(("id" = Uuid, Path, description = "The planner session ID.")),
    request_body(content_type = "multipart/form-data", description = "The files to upload."),
    responses(
        (status = 200, description = "Upload processed", body = UploadReport),
        (status = 400, description = "No files in the request"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn upload_attachments_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadReport>, HandlerError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let file_name = field.file_name().unwrap_or("untitled").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read file bytes: {}", e),
            )
        })?;
        files.push(RawFile {
            file_name,
            mime_type,
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Multipart form must include at least one file".to_string(),
        ));
    }

    let (report, total_encoded_bytes) = app_state
        .sessions
        .update(id, |session| {
            let report = session.attachments.accept_batch(files);
            (report, session.attachments.total_encoded_bytes())
        })
        .await
        .ok_or_else(|| session_not_found(id))?;

    for rejected in &report.rejected {
        warn!(session_id = %id, "Attachment rejected: {}", rejected);
    }

    Ok(Json(UploadReport {
        accepted: report.accepted,
        rejected: report.rejected.into_iter().map(RejectedFile::from).collect(),
        total_encoded_bytes,
    }))
}

/// Remove one staged attachment.
#[utoipa::path(
    delete,
    path = "/sessions/{id}/attachments/{index}",
    params(
        ("id" = Uuid, Path, description = "The planner session ID."),
        ("index" = usize, Path, description = "Position of the attachment in the session.")
    ),
    responses(
        (status = 204, description = "Attachment removed"),
        (status = 404, description = "Unknown session or attachment")
    )
)]
pub async fn remove_attachment_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .sessions
        .update(id, |session| session.attachments.remove(index))
        .await
        .ok_or_else(|| session_not_found(id))?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("No attachment at position {}", index),
            )
        })?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Plan Handlers
//=========================================================================================

/// Generate a study plan.
///
/// Attachments staged on the session are sent after any attachments in the
/// body. Only one plan request may be outstanding per session; it runs to
/// completion even if the client disconnects.
#[utoipa::path(
    post,
    path = "/sessions/{id}/plan",
    params(("id" = Uuid, Path, description = "The planner session ID.")),
    request_body = StudyPlanParams,
    responses(
        (status = 200, description = "The generated plan", body = StudyPlanResponse),
        (status = 400, description = "Invalid study parameters"),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "A plan is already being generated"),
        (status = 502, description = "The plan could not be generated")
    )
)]
pub async fn generate_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(mut params): Json<StudyPlanParams>,
) -> Result<Json<StudyPlanResponse>, HandlerError> {
    // Staged attachments are read and the session claimed under one lock.
    app_state
        .sessions
        .update(id, |session| {
            params
                .attachments
                .extend(session.attachments.as_slice().iter().cloned());
            if let Err(e) = params.validate() {
                warn!(session_id = %id, "Rejected study parameters: {}", e);
                return Err((StatusCode::BAD_REQUEST, e.to_string()));
            }
            session
                .begin_plan_request(&params.subjects)
                .map_err(|e: SessionError| (StatusCode::CONFLICT, e.to_string()))
        })
        .await
        .ok_or_else(|| session_not_found(id))??;

    // Runs detached so the session is settled even if the client goes away.
    let planner = app_state.planner.clone();
    let sessions = app_state.sessions.clone();
    let generation = tokio::spawn(async move {
        let result = planner.generate_plan(&params).await;
        sessions
            .update(id, |session| session.finish_plan_request(&result))
            .await;
        result
    });

    let result = generation.await.map_err(|e| {
        error!(session_id = %id, "Plan generation task failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            PlanError::USER_MESSAGE.to_string(),
        )
    })?;

    match result {
        Ok(plan) => Ok(Json(plan)),
        Err(e) => {
            error!(session_id = %id, "Failed to generate study plan: {:?}", e);
            Err((StatusCode::BAD_GATEWAY, PlanError::USER_MESSAGE.to_string()))
        }
    }
}

/// Clear the current plan so the student can make a new one.
#[utoipa::path(
    post,
    path = "/sessions/{id}/reset",
    params(("id" = Uuid, Path, description = "The planner session ID.")),
    responses(
        (status = 204, description = "Plan cleared"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn reset_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .sessions
        .update(id, PlannerSession::reset)
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Study Tool and Resource Handlers
//=========================================================================================

/// Run one of the study tools on a topic or a block of notes.
#[utoipa::path(
    post,
    path = "/tools/{tool}",
    params(("tool" = StudyTool, Path, description = "The tool identifier, e.g. `flashcards`.")),
    request_body = ToolRequest,
    responses(
        (status = 200, description = "The tool's answer", body = ToolOutput),
        (status = 400, description = "Empty input"),
        (status = 404, description = "Unknown tool"),
        (status = 502, description = "The tool could not run")
    )
)]
pub async fn run_tool_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tool): Path<String>,
    Json(body): Json<ToolRequest>,
) -> Result<Json<ToolOutput>, HandlerError> {
    let tool: StudyTool = tool
        .parse()
        .map_err(|e: study_planner_core::UnknownTool| (StatusCode::NOT_FOUND, e.to_string()))?;

    app_state
        .planner
        .run_tool(tool, &body.input)
        .await
        .map(Json)
        .map_err(|e| tool_failure(e, &format!("Study tool '{}'", tool)))
}

/// Find free study resources for a topic, grounded in a web search.
#[utoipa::path(
    post,
    path = "/resources",
    request_body = ResourceRequest,
    responses(
        (status = 200, description = "Suggested resources", body = ResourceSuggestions),
        (status = 400, description = "Empty query"),
        (status = 502, description = "The lookup failed")
    )
)]
pub async fn find_resources_handler(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<ResourceRequest>,
) -> Result<Json<ResourceSuggestions>, HandlerError> {
    app_state
        .planner
        .find_resources(&body.query)
        .await
        .map(Json)
        .map_err(|e| tool_failure(e, "Resource lookup"))
}
