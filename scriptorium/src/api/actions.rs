//! Quick-action popup endpoints.

use axum::extract::State;
use axum::Json;
use ractor::call;
use serde::{Deserialize, Serialize};

use shared_types::{ActionKind, ActionState, EditorSnapshot};

use crate::actors::editor::EditorMsg;

use super::{ApiError, ApiState};

#[derive(Debug, Deserialize)]
pub struct StartActionRequest {
    pub kind: ActionKind,
    #[serde(default)]
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct CopyResponse {
    pub text: String,
}

async fn editor(state: &ApiState) -> Result<ractor::ActorRef<EditorMsg>, ApiError> {
    state.app_state.ensure_editor().await.map_err(ApiError::Actor)
}

pub async fn get_action_state(
    State(state): State<ApiState>,
) -> Result<Json<ActionState>, ApiError> {
    let editor = editor(&state).await?;
    let action_state = call!(editor, |reply| EditorMsg::GetActionState { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))?;
    Ok(Json(action_state))
}

pub async fn start_action(
    State(state): State<ApiState>,
    Json(req): Json<StartActionRequest>,
) -> Result<Json<ActionState>, ApiError> {
    let editor = editor(&state).await?;
    let action_state = call!(editor, |reply| EditorMsg::StartAction {
        kind: req.kind,
        custom_prompt: req.custom_prompt,
        reply,
    })
    .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(action_state))
}

pub async fn submit_prompt(
    State(state): State<ApiState>,
    Json(req): Json<PromptRequest>,
) -> Result<Json<ActionState>, ApiError> {
    let editor = editor(&state).await?;
    let action_state = call!(editor, |reply| EditorMsg::SubmitPrompt {
        prompt: req.prompt,
        reply,
    })
    .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(action_state))
}

pub async fn apply_action(State(state): State<ApiState>) -> Result<Json<EditorSnapshot>, ApiError> {
    let editor = editor(&state).await?;
    let snapshot = call!(editor, |reply| EditorMsg::ApplyAction { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(snapshot))
}

pub async fn copy_action(State(state): State<ApiState>) -> Result<Json<CopyResponse>, ApiError> {
    let editor = editor(&state).await?;
    let text = call!(editor, |reply| EditorMsg::CopyAction { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(CopyResponse { text }))
}

pub async fn close_action(State(state): State<ApiState>) -> Result<Json<ActionState>, ApiError> {
    let editor = editor(&state).await?;
    let action_state = call!(editor, |reply| EditorMsg::CloseAction { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))?;
    Ok(Json(action_state))
}
