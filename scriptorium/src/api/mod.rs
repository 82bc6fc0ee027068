//! HTTP API routes bridging the actor system to the browser client.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

pub mod actions;
pub mod analysis;
pub mod chat;
pub mod document;
pub mod error;
pub mod export;

pub use error::ApiError;

use crate::app_state::AppState;

#[derive(Clone)]
pub struct ApiState {
    pub app_state: AppState,
}

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/api/health", get(health_check))
        // Document
        .route(
            "/api/document",
            get(document::get_document).put(document::update_document),
        )
        .route("/api/document/new", post(document::new_document))
        .route("/api/document/import", post(document::import_document))
        .route("/api/document/sync", post(document::sync_view))
        .route("/api/document/format", post(document::format_document))
        .route(
            "/api/selection",
            get(document::get_selection).put(document::set_selection),
        )
        // Autocomplete
        .route("/api/autocomplete", get(document::get_autocomplete))
        .route(
            "/api/autocomplete/accept",
            post(document::accept_autocomplete),
        )
        .route(
            "/api/autocomplete/dismiss",
            post(document::dismiss_autocomplete),
        )
        // Quick-action popup
        .route("/api/actions", get(actions::get_action_state))
        .route("/api/actions/start", post(actions::start_action))
        .route("/api/actions/prompt", post(actions::submit_prompt))
        .route("/api/actions/apply", post(actions::apply_action))
        .route("/api/actions/copy", post(actions::copy_action))
        .route("/api/actions/close", post(actions::close_action))
        // Chat
        .route("/api/chat", get(chat::get_history).post(chat::send_message))
        .route("/api/chat/apply", post(chat::apply_message))
        // Analysis
        .route("/api/analysis", get(analysis::get_analysis))
        .route("/api/analysis/refresh", post(analysis::refresh_analysis))
        .route(
            "/api/analysis/suggestions/apply",
            post(analysis::apply_suggestion),
        )
        // Export
        .route("/api/export/text", get(export::export_text))
        .route("/api/export/pdf", get(export::export_pdf))
        .route("/api/export/docx", get(export::export_docx))
}

async fn health_check(State(_state): State<ApiState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "scriptorium",
    }))
}
