//! Export endpoints. Each renders the current document to bytes and
//! returns them as an attachment.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use ractor::call;

use crate::actors::editor::EditorMsg;
use crate::export;

use super::{ApiError, ApiState};

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

async fn current_content(state: &ApiState) -> Result<String, ApiError> {
    let editor = state.app_state.ensure_editor().await.map_err(ApiError::Actor)?;
    let snapshot = call!(editor, |reply| EditorMsg::Snapshot { reply })
        .map_err(|e| ApiError::Actor(e.to_string()))?;
    Ok(snapshot.content)
}

fn attachment(bytes: Vec<u8>, content_type: &'static str, file_name: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

pub async fn export_text(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let content = current_content(&state).await?;
    let bytes = export::text::render(&content);
    Ok(attachment(bytes, "text/plain; charset=utf-8", "document.txt"))
}

pub async fn export_pdf(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let content = current_content(&state).await?;
    let bytes = export::pdf::render(&content).map_err(|e| ApiError::Export(e.to_string()))?;
    Ok(attachment(bytes, "application/pdf", "document.pdf"))
}

pub async fn export_docx(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let content = current_content(&state).await?;
    let bytes = export::docx::render(&content).map_err(|e| ApiError::Export(e.to_string()))?;
    Ok(attachment(bytes, DOCX_MIME, "document.docx"))
}
