//! Document, selection, and autocomplete endpoints.

use axum::extract::State;
use axum::Json;
use ractor::call;
use serde::{Deserialize, Serialize};

use shared_types::{EditorSnapshot, FormatCommand, SavedSelection};

use crate::actors::editor::{EditorMsg, SyncOutcome};

use super::{ApiError, ApiState};

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub content: String,
    pub base_rev: u64,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub view_content: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selection: Option<SavedSelection>,
}

#[derive(Debug, Serialize)]
pub struct AutocompleteResponse {
    pub suggestion: String,
}

async fn editor(state: &ApiState) -> Result<ractor::ActorRef<EditorMsg>, ApiError> {
    state.app_state.ensure_editor().await.map_err(ApiError::Actor)
}

pub async fn get_document(State(state): State<ApiState>) -> Result<Json<EditorSnapshot>, ApiError> {
    let editor = editor(&state).await?;
    let snapshot = call!(editor, |reply| EditorMsg::Snapshot { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))?;
    Ok(Json(snapshot))
}

pub async fn update_document(
    State(state): State<ApiState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<EditorSnapshot>, ApiError> {
    let editor = editor(&state).await?;
    let snapshot = call!(editor, |reply| EditorMsg::Update {
        content: req.content,
        base_rev: req.base_rev,
        reply,
    })
    .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(snapshot))
}

pub async fn new_document(State(state): State<ApiState>) -> Result<Json<EditorSnapshot>, ApiError> {
    let editor = editor(&state).await?;
    let snapshot = call!(editor, |reply| EditorMsg::New { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(snapshot))
}

pub async fn import_document(
    State(state): State<ApiState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<EditorSnapshot>, ApiError> {
    let editor = editor(&state).await?;
    let snapshot = call!(editor, |reply| EditorMsg::Import {
        file_name: req.file_name,
        content: req.content,
        reply,
    })
    .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(snapshot))
}

pub async fn sync_view(
    State(state): State<ApiState>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncOutcome>, ApiError> {
    let editor = editor(&state).await?;
    let outcome = call!(editor, |reply| EditorMsg::SyncView {
        view_content: req.view_content,
        reply,
    })
    .map_err(|e| ApiError::Actor(e.to_string()))?;
    Ok(Json(outcome))
}

pub async fn format_document(
    State(state): State<ApiState>,
    Json(command): Json<FormatCommand>,
) -> Result<Json<EditorSnapshot>, ApiError> {
    let editor = editor(&state).await?;
    let snapshot = call!(editor, |reply| EditorMsg::Format { command, reply })
        .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(snapshot))
}

pub async fn get_selection(
    State(state): State<ApiState>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let editor = editor(&state).await?;
    let selection = call!(editor, |reply| EditorMsg::GetSelection { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))?;
    Ok(Json(SelectionResponse { selection }))
}

pub async fn set_selection(
    State(state): State<ApiState>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<SavedSelection>, ApiError> {
    let editor = editor(&state).await?;
    let selection = call!(editor, |reply| EditorMsg::SetSelection {
        start: req.start,
        end: req.end,
        reply,
    })
    .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(selection))
}

pub async fn get_autocomplete(
    State(state): State<ApiState>,
) -> Result<Json<AutocompleteResponse>, ApiError> {
    let editor = editor(&state).await?;
    let pending = call!(editor, |reply| EditorMsg::AutocompleteState { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))?;
    Ok(Json(AutocompleteResponse {
        suggestion: pending.unwrap_or_default(),
    }))
}

pub async fn accept_autocomplete(
    State(state): State<ApiState>,
) -> Result<Json<EditorSnapshot>, ApiError> {
    let editor = editor(&state).await?;
    let snapshot = call!(editor, |reply| EditorMsg::AcceptCompletion { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(snapshot))
}

pub async fn dismiss_autocomplete(
    State(state): State<ApiState>,
) -> Result<Json<AutocompleteResponse>, ApiError> {
    let editor = editor(&state).await?;
    call!(editor, |reply| EditorMsg::DismissCompletion { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))?;
    Ok(Json(AutocompleteResponse {
        suggestion: String::new(),
    }))
}
