//! crates/study_planner_core/src/ports.rs
//!
//! Defines the service contract (trait) for the external generation service.
//! This trait is the boundary of the hexagonal architecture: the planner only
//! ever sees a prompt going out and text coming back, never a specific provider.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Attachment, ResourceLink};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (network, provider).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Item not found: {0}")]
    NotFound(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Request / Response shapes crossing the port
//=========================================================================================

/// Everything one outbound generation call carries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationRequest {
    /// The natural-language instruction.
    pub prompt: String,
    /// Inline binary parts sent after the prompt, in order.
    pub attachments: Vec<Attachment>,
    /// When present the provider is asked for `application/json` matching
    /// this schema.
    pub response_schema: Option<Value>,
    /// Ask the provider to ground the answer in a web search.
    pub web_search: bool,
}

/// What came back from one generation call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationOutput {
    /// `None` when the provider returned no text at all.
    pub text: Option<String>,
    /// Web sources reported by search grounding, if any.
    pub sources: Vec<ResourceLink>,
}

impl GenerationOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            sources: Vec::new(),
        }
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Performs a single round trip to the generation provider.
    async fn generate(&self, request: GenerationRequest) -> PortResult<GenerationOutput>;
}
