//! services/api/src/adapters/gemini.rs
//!
//! This module contains the adapter for the Gemini `generateContent` API.
//! It implements the `GenerationService` port from the `core` crate.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use study_planner_core::domain::ResourceLink;
use study_planner_core::ports::{
    GenerationOutput, GenerationRequest, GenerationService, PortError, PortResult,
};
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationService` using Gemini's REST API.
#[derive(Clone)]
pub struct GeminiAdapter {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiAdapter {
    /// Creates a new `GeminiAdapter`. `api_base` is the versioned root, e.g.
    /// `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(http: reqwest::Client, api_base: String, api_key: String, model: String) -> Self {
        Self {
            http,
            api_base,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

//=========================================================================================
// Wire Format: Request
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclaration>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData<'a>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclaration {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

fn build_body(request: &GenerationRequest) -> GenerateContentRequest<'_> {
    let mut parts = vec![Part::Text(&request.prompt)];
    parts.extend(request.attachments.iter().map(|attachment| {
        Part::InlineData(InlineData {
            mime_type: &attachment.mime_type,
            data: &attachment.data,
        })
    }));

    let generation_config = request
        .response_schema
        .as_ref()
        .map(|schema| GenerationConfig {
            response_mime_type: "application/json",
            response_schema: schema,
        });

    let tools = if request.web_search {
        vec![ToolDeclaration {
            google_search: GoogleSearch {},
        }]
    } else {
        Vec::new()
    };

    GenerateContentRequest {
        contents: vec![Content { role: "user", parts }],
        generation_config,
        tools,
    }
}

//=========================================================================================
// Wire Format: Response
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    /// Set on the model's internal reasoning parts, which are not answer text.
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Deserialize)]
struct WebSource {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GenerateContentResponse {
    /// Joins the answer text of the first candidate and collects its web
    /// grounding sources.
    fn into_output(self) -> GenerationOutput {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return GenerationOutput::default();
        };

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        let sources = candidate
            .grounding_metadata
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.web)
                    .filter_map(|web| {
                        Some(ResourceLink {
                            uri: web.uri?,
                            title: web.title.unwrap_or_default(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        GenerationOutput {
            text: (!text.is_empty()).then_some(text),
            sources,
        }
    }
}

/// Maps a non-success HTTP status onto the port's error taxonomy.
fn status_error(status: StatusCode, body: &str) -> PortError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized(message),
        // Gemini reports a bad key as 400 INVALID_ARGUMENT.
        StatusCode::BAD_REQUEST if message.contains("API key") => PortError::Unauthorized(message),
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        _ => PortError::Transport(format!("{status}: {message}")),
    }
}

//=========================================================================================
// `GenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationService for GeminiAdapter {
    /// Sends one `generateContent` call and returns the candidate's text.
    async fn generate(&self, request: GenerationRequest) -> PortResult<GenerationOutput> {
        let body = build_body(&request);
        debug!(
            model = %self.model,
            parts = body.contents[0].parts.len(),
            structured = body.generation_config.is_some(),
            web_search = !body.tools.is_empty(),
            "Calling Gemini"
        );

        // Map reqwest errors by hand; `PortError` lives in the core crate.
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let error = status_error(status, &detail);
            warn!(%status, "Gemini rejected the request: {}", error);
            return Err(error);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PortError::Transport(format!("Unreadable Gemini response: {}", e)))?;

        Ok(parsed.into_output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use study_planner_core::domain::Attachment;

    #[test]
    fn body_puts_prompt_first_then_inline_attachments() {
        let request = GenerationRequest {
            prompt: "Plan please".into(),
            attachments: vec![Attachment {
                mime_type: "application/pdf".into(),
                data: "JVBERi0=".into(),
                file_name: "syllabus.pdf".into(),
            }],
            response_schema: Some(json!({"type": "OBJECT"})),
            web_search: false,
        };

        let body = serde_json::to_value(build_body(&request)).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "Plan please"},
                        {"inlineData": {"mimeType": "application/pdf", "data": "JVBERi0="}}
                    ]
                }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {"type": "OBJECT"}
                }
            })
        );
    }

    #[test]
    fn web_search_adds_the_google_search_tool() {
        let request = GenerationRequest {
            prompt: "Find resources".into(),
            web_search: true,
            ..Default::default()
        };

        let body = serde_json::to_value(build_body(&request)).unwrap();

        assert_eq!(body["tools"], json!([{"googleSearch": {}}]));
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn output_joins_text_parts_and_skips_thoughts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "{\"a\":"},
                    {"text": "1}"}
                ]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://khanacademy.org", "title": "Khan Academy"}},
                    {"web": {"title": "no uri"}},
                    {"retrievedContext": {}}
                ]}
            }]
        }))
        .unwrap();

        let output = response.into_output();

        assert_eq!(output.text.as_deref(), Some("{\"a\":1}"));
        assert_eq!(
            output.sources,
            vec![ResourceLink {
                uri: "https://khanacademy.org".into(),
                title: "Khan Academy".into()
            }]
        );
    }

    #[test]
    fn no_candidates_means_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert_eq!(response.into_output(), GenerationOutput::default());
    }

    #[test]
    fn status_errors_map_onto_port_errors() {
        let bad_key = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, bad_key),
            PortError::Unauthorized(msg) if msg.starts_with("API key not valid")
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "denied"),
            PortError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "{}"),
            PortError::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "overloaded"),
            PortError::Transport(msg) if msg.contains("503")
        ));
    }
}
