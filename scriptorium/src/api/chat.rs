//! Chat sidebar endpoints.

use axum::extract::State;
use axum::Json;
use ractor::call;
use serde::{Deserialize, Serialize};

use shared_types::{ChatMessage, EditorSnapshot};

use crate::actors::chat::{ChatExchange, ChatMsg};

use super::{ApiError, ApiState};

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub message_id: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<ChatMessage>,
}

async fn chat(state: &ApiState) -> Result<ractor::ActorRef<ChatMsg>, ApiError> {
    state.app_state.ensure_chat().await.map_err(ApiError::Actor)
}

pub async fn get_history(State(state): State<ApiState>) -> Result<Json<HistoryResponse>, ApiError> {
    let chat = chat(&state).await?;
    let messages = call!(chat, |reply| ChatMsg::History { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))?;
    Ok(Json(HistoryResponse { messages }))
}

pub async fn send_message(
    State(state): State<ApiState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<ChatExchange>, ApiError> {
    let chat = chat(&state).await?;
    let exchange = call!(chat, |reply| ChatMsg::Send {
        text: req.text,
        reply,
    })
    .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(exchange))
}

pub async fn apply_message(
    State(state): State<ApiState>,
    Json(req): Json<ApplyRequest>,
) -> Result<Json<EditorSnapshot>, ApiError> {
    let chat = chat(&state).await?;
    let snapshot = call!(chat, |reply| ChatMsg::Apply {
        message_id: req.message_id,
        reply,
    })
    .map_err(|e| ApiError::Actor(e.to_string()))??;
    Ok(Json(snapshot))
}
