//! Analysis dashboard endpoints.

use axum::extract::State;
use axum::Json;
use ractor::call;
use serde::Deserialize;

use shared_types::EditorSnapshot;

use crate::actors::analysis::{AnalysisMsg, AnalysisStatus};
use crate::actors::editor::EditorMsg;
use crate::markup;

use super::{ApiError, ApiState};

#[derive(Debug, Deserialize)]
pub struct ApplySuggestionRequest {
    pub suggestion_id: String,
}

pub async fn get_analysis(State(state): State<ApiState>) -> Result<Json<AnalysisStatus>, ApiError> {
    let analysis = state
        .app_state
        .ensure_analysis()
        .await
        .map_err(ApiError::Actor)?;
    let status = call!(analysis, |reply| AnalysisMsg::Status { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))?;
    Ok(Json(status))
}

pub async fn refresh_analysis(
    State(state): State<ApiState>,
) -> Result<Json<AnalysisStatus>, ApiError> {
    let editor = state.app_state.ensure_editor().await.map_err(ApiError::Actor)?;
    let snapshot = call!(editor, |reply| EditorMsg::Snapshot { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))?;

    let analysis = state
        .app_state
        .ensure_analysis()
        .await
        .map_err(ApiError::Actor)?;
    let status = call!(analysis, |reply| AnalysisMsg::Refresh {
        text: markup::strip_markup(&snapshot.content),
        reply,
    })
    .map_err(|e| ApiError::Actor(e.to_string()))?;
    Ok(Json(status))
}

/// Apply a suggestion's replacement by exact-substring match against the
/// stored markup.
pub async fn apply_suggestion(
    State(state): State<ApiState>,
    Json(req): Json<ApplySuggestionRequest>,
) -> Result<Json<EditorSnapshot>, ApiError> {
    let analysis = state
        .app_state
        .ensure_analysis()
        .await
        .map_err(ApiError::Actor)?;
    let suggestion = call!(analysis, |reply| AnalysisMsg::FindSuggestion {
        suggestion_id: req.suggestion_id,
        reply,
    })
    .map_err(|e| ApiError::Actor(e.to_string()))?
    .ok_or(ApiError::SuggestionNotFound)?;

    let (original, replacement) = match (suggestion.original_text, suggestion.replacement_text) {
        (Some(original), Some(replacement)) => (original, replacement),
        _ => return Err(ApiError::SuggestionNotApplicable),
    };

    let editor = state.app_state.ensure_editor().await.map_err(ApiError::Actor)?;
    let snapshot = call!(editor, |reply| EditorMsg::ReplaceExact {
        original,
        replacement,
        reply,
    })
    .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(snapshot))
}
