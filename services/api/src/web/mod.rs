pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

pub use rest::{
    create_session_handler, delete_session_handler, find_resources_handler,
    generate_plan_handler, get_session_handler, remove_attachment_handler, reset_plan_handler,
    run_tool_handler, upload_attachments_handler,
};
pub use state::{AppState, SessionRegistry};

/// Builds the API router. CORS and the Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    let max_body_bytes = app_state.config.max_body_bytes;

    Router::new()
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/{id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/sessions/{id}/attachments", post(upload_attachments_handler))
        .route(
            "/sessions/{id}/attachments/{index}",
            delete(remove_attachment_handler),
        )
        .route("/sessions/{id}/plan", post(generate_plan_handler))
        .route("/sessions/{id}/reset", post(reset_plan_handler))
        .route("/tools/{tool}", post(run_tool_handler))
        .route("/resources", post(find_resources_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(app_state)
}
