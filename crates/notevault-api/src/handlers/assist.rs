//! Text-assist endpoints: summarization and grammar checking.
//!
//! Both endpoints are open (no token required) and answer 503 when no
//! generation backend is configured. Backend failures never affect the
//! note and category endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;

use notevault_assist::{check_grammar, summarize, GenerationBackend, GrammarOutcome, SummarizeOutcome};

use crate::{ApiError, AppState};

pub(crate) const EMPTY_TEXT_MESSAGE: &str = "Input text is empty or invalid.";
pub(crate) const BACKEND_UNCONFIGURED_MESSAGE: &str = "Text assist is not configured";

#[derive(Debug, Default, Deserialize)]
pub struct AssistRequest {
    pub text: Option<String>,
}

fn require_backend(state: &AppState) -> Result<Arc<dyn GenerationBackend>, ApiError> {
    state
        .assist
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable(BACKEND_UNCONFIGURED_MESSAGE.to_string()))
}

fn require_text(req: &AssistRequest) -> Result<&str, ApiError> {
    match req.text.as_deref() {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::BadRequest(EMPTY_TEXT_MESSAGE.to_string())),
    }
}

pub async fn summarize_text(
    State(state): State<AppState>,
    Json(req): Json<AssistRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let text = require_text(&req)?;
    let backend = require_backend(&state)?;

    match summarize(backend.as_ref(), text).await? {
        SummarizeOutcome::Summary(summary) => Ok(Json(json!({ "summary": summary }))),
        SummarizeOutcome::Rejected(message) => {
            Err(ApiError::BadRequestMessage(message.to_string()))
        }
    }
}

pub async fn check_text(
    State(state): State<AppState>,
    Json(req): Json<AssistRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let text = require_text(&req)?;
    let backend = require_backend(&state)?;

    match check_grammar(backend.as_ref(), text).await? {
        GrammarOutcome::NoFixRequired => {
            Ok(Json(json!({ "message": notevault_assist::grammar::NO_FIX_REQUIRED_MESSAGE })))
        }
        GrammarOutcome::Corrected(corrected) => Ok(Json(json!({ "correctedText": corrected }))),
        GrammarOutcome::Rejected(message) => Err(ApiError::BadRequestMessage(message.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_text_rejected() {
        let req = AssistRequest { text: None };
        assert!(require_text(&req).is_err());

        let req = AssistRequest {
            text: Some("   ".to_string()),
        };
        assert!(require_text(&req).is_err());
    }

    #[test]
    fn test_present_text_accepted() {
        let req = AssistRequest {
            text: Some("Some text.".to_string()),
        };
        assert_eq!(require_text(&req).unwrap(), "Some text.");
    }
}
