//! Pure document logic: selection validation, insertion, formatting
//! transforms, and the AI-action popup state machine. No IO and no actor
//! state; everything here is unit-testable over plain strings.

pub mod action;
pub mod doc;

/// Errors from editor operations. The API layer maps each variant to a
/// status code and a machine-readable error code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    #[error("document was modified by another client")]
    Conflict {
        current_revision: u64,
        current_content: String,
    },

    #[error("no selection has been captured")]
    NoSelection,

    #[error("selection was captured before the document was replaced; select again")]
    StaleSelection,

    #[error("selection must not be empty")]
    EmptySelection,

    #[error("selection range is outside the document")]
    InvalidRange,

    #[error("action is not in the {expected} state")]
    InvalidActionState { expected: &'static str },

    #[error("no pending autocomplete suggestion")]
    NoSuggestion,

    #[error("original text was not found in the document")]
    NoMatch,

    #[error("unsupported import file type: {0}")]
    UnsupportedImport(String),

    #[error("failed to persist draft: {0}")]
    Persist(String),
}
