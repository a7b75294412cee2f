//! crates/study_planner_core/src/resources.rs
//!
//! The resource finder: a search-grounded request for free study material.

use crate::domain::{ResourceLink, ResourceSuggestions};
use crate::error::PlanError;
use crate::normalize::require_text;
use crate::params::ValidationError;
use crate::ports::{GenerationOutput, GenerationRequest};

const RESOURCE_PROMPT: &str = "Find high-quality, free educational resources (websites, videos, articles) for studying: {query}.
Briefly explain why these are good. Include specific sites like Khan Academy, Coursera, or YouTube channels if relevant.";

pub const DEFAULT_LINK_TITLE: &str = "Educational Resource";

pub fn build_resource_request(query: &str) -> Result<GenerationRequest, ValidationError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    Ok(GenerationRequest {
        prompt: RESOURCE_PROMPT.replace("{query}", query),
        attachments: Vec::new(),
        response_schema: None,
        web_search: true,
    })
}

/// Pairs the write-up with its grounding links. Links without a usable
/// address are dropped and duplicates collapse to their first occurrence.
pub fn normalize_resources(output: GenerationOutput) -> Result<ResourceSuggestions, PlanError> {
    let summary = require_text(output.text.as_deref())?.trim().to_string();

    let mut links: Vec<ResourceLink> = Vec::new();
    for link in output.sources {
        let uri = link.uri.trim();
        if uri.is_empty() || links.iter().any(|seen| seen.uri == uri) {
            continue;
        }
        let title = match link.title.trim() {
            "" => DEFAULT_LINK_TITLE.to_string(),
            title => title.to_string(),
        };
        links.push(ResourceLink {
            uri: uri.to_string(),
            title,
        });
    }

    Ok(ResourceSuggestions { summary, links })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(uri: &str, title: &str) -> ResourceLink {
        ResourceLink {
            uri: uri.into(),
            title: title.into(),
        }
    }

    #[test]
    fn request_enables_web_search_without_a_schema() {
        let request = build_resource_request(" calculus ").unwrap();
        assert!(request.web_search);
        assert!(request.response_schema.is_none());
        assert!(request.prompt.contains("for studying: calculus."));
    }

    #[test]
    fn blank_query_is_refused() {
        assert_eq!(build_resource_request(""), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn links_get_default_titles_and_are_deduplicated() {
        let output = GenerationOutput {
            text: Some(" Try these. ".into()),
            sources: vec![
                link("https://khanacademy.org", "Khan Academy"),
                link("https://example.edu/notes", " "),
                link("https://khanacademy.org", "Duplicate"),
                link("", "No address"),
            ],
        };

        let suggestions = normalize_resources(output).unwrap();

        assert_eq!(suggestions.summary, "Try these.");
        assert_eq!(
            suggestions.links,
            vec![
                link("https://khanacademy.org", "Khan Academy"),
                link("https://example.edu/notes", DEFAULT_LINK_TITLE),
            ]
        );
    }

    #[test]
    fn missing_summary_is_an_empty_response() {
        let output = GenerationOutput {
            text: None,
            sources: vec![link("https://khanacademy.org", "Khan Academy")],
        };
        assert!(matches!(normalize_resources(output), Err(PlanError::EmptyResponse)));
    }
}
