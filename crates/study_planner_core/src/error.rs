//! crates/study_planner_core/src/error.rs
//!
//! The failure taxonomy of a single generation round trip.

use crate::params::ValidationError;
use crate::ports::PortError;

/// Why a plan (or tool result) could not be produced.
///
/// Apart from `InvalidInput`, which is refused before any call is made,
/// callers only log the variant; every other case is shown to the student as
/// the same "try again" message.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The service returned no text at all.
    #[error("The generation service returned an empty response")]
    EmptyResponse,

    /// Text was present but was not valid, complete JSON of the expected shape.
    #[error("The generation service returned a malformed response: {0}")]
    MalformedResponse(String),

    /// Network or provider-side failure, including rejected credentials.
    #[error("The generation service could not be reached: {0}")]
    TransportFailure(#[from] PortError),

    /// The tool input or search query was rejected before sending.
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),
}

impl PlanError {
    /// The single message shown to the student for any generation failure.
    pub const USER_MESSAGE: &'static str =
        "I had trouble making your plan. Please check your internet and try again.";
}
