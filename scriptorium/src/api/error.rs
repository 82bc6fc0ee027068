//! API error responses.
//!
//! Every error body is `{"error": {"code", "message"}}` with a
//! machine-readable code. The document-conflict case additionally carries
//! the current server revision and content so the client can merge and
//! retry.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::actors::chat::ChatError;
use crate::editor::EditorError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Editor(EditorError),

    #[error(transparent)]
    Chat(ChatError),

    #[error("no suggestion with that id in the current analysis")]
    SuggestionNotFound,

    #[error("suggestion has no replacement text to apply")]
    SuggestionNotApplicable,

    #[error("actor unavailable: {0}")]
    Actor(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Editor(e) => match e {
                EditorError::Conflict { .. } => "CONFLICT",
                EditorError::NoSelection => "NO_SELECTION",
                EditorError::StaleSelection => "STALE_SELECTION",
                EditorError::EmptySelection => "EMPTY_SELECTION",
                EditorError::InvalidRange => "INVALID_RANGE",
                EditorError::InvalidActionState { .. } => "INVALID_ACTION_STATE",
                EditorError::NoSuggestion => "NO_SUGGESTION",
                EditorError::NoMatch => "NO_MATCH",
                EditorError::UnsupportedImport(_) => "UNSUPPORTED_IMPORT",
                EditorError::Persist(_) => "PERSIST_ERROR",
            },
            ApiError::Chat(e) => match e {
                ChatError::NotFound => "NOT_FOUND",
                ChatError::NotModelTurn => "NOT_MODEL_TURN",
                // Normally flattened by From<ChatError>.
                ChatError::Editor(_) => "EDITOR_ERROR",
                ChatError::EditorUnavailable(_) => "ACTOR_ERROR",
            },
            ApiError::SuggestionNotFound => "SUGGESTION_NOT_FOUND",
            ApiError::SuggestionNotApplicable => "NO_MATCH",
            ApiError::Actor(_) => "ACTOR_ERROR",
            ApiError::Export(_) => "EXPORT_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Editor(EditorError::Conflict { .. }) => StatusCode::CONFLICT,
            ApiError::Editor(EditorError::Persist(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Editor(_) => StatusCode::BAD_REQUEST,
            ApiError::Chat(ChatError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Chat(ChatError::EditorUnavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Chat(_) => StatusCode::BAD_REQUEST,
            ApiError::SuggestionNotFound => StatusCode::NOT_FOUND,
            ApiError::SuggestionNotApplicable => StatusCode::BAD_REQUEST,
            ApiError::Actor(_) | ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EditorError> for ApiError {
    fn from(e: EditorError) -> Self {
        ApiError::Editor(e)
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::Editor(inner) => ApiError::Editor(inner),
            other => ApiError::Chat(other),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

/// Conflict responses include the server state so the client can merge.
#[derive(Debug, Serialize)]
struct ConflictResponse {
    #[serde(flatten)]
    error: ErrorResponse,
    current_revision: u64,
    current_content: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };

        if let ApiError::Editor(EditorError::Conflict {
            current_revision,
            current_content,
        }) = self
        {
            return (
                status,
                Json(ConflictResponse {
                    error,
                    current_revision,
                    current_content,
                }),
            )
                .into_response();
        }

        (status, Json(error)).into_response()
    }
}
