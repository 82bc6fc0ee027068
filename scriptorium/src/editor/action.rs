//! Transition functions for the AI-action popup state machine.
//!
//! `closed` is the implicit initial and terminal state (the actor holds
//! `Option<ActionSession>`); only custom actions pass through `prompt`.
//! Completions are matched by session token so a result for a closed or
//! superseded session is dropped by the actor, never applied.

use shared_types::{ActionKind, ActionState, SavedSelection};

use super::EditorError;

/// A live popup session. The selection is frozen at open time; apply
/// re-validates it against the document as it stands then.
#[derive(Debug, Clone)]
pub struct ActionSession {
    pub token: u64,
    pub kind: ActionKind,
    pub selection: SavedSelection,
    pub selection_text: String,
    pub custom_prompt: Option<String>,
    pub state: ActionState,
}

impl ActionSession {
    /// Open a session. Custom actions without a prompt open at `prompt`;
    /// everything else goes straight to `processing`.
    pub fn open(
        token: u64,
        kind: ActionKind,
        selection: SavedSelection,
        selection_text: String,
        custom_prompt: Option<String>,
    ) -> Self {
        let prompt = custom_prompt.filter(|p| !p.trim().is_empty());
        let state = if kind == ActionKind::Custom && prompt.is_none() {
            ActionState::Prompt { kind }
        } else {
            ActionState::Processing { kind }
        };
        Self {
            token,
            kind,
            selection,
            selection_text,
            custom_prompt: prompt,
            state,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, ActionState::Processing { .. })
    }

    /// `prompt` -> `processing` with the submitted free-form prompt.
    pub fn submit_prompt(&mut self, prompt: String) -> Result<(), EditorError> {
        match self.state {
            ActionState::Prompt { kind } => {
                self.custom_prompt = Some(prompt);
                self.state = ActionState::Processing { kind };
                Ok(())
            }
            _ => Err(EditorError::InvalidActionState { expected: "prompt" }),
        }
    }

    /// `processing` -> `result`. Failures land in `result` with the fixed
    /// error text rather than transitioning back to `prompt`.
    pub fn complete(&mut self, text: String, failed: bool) -> Result<(), EditorError> {
        match self.state {
            ActionState::Processing { kind } => {
                self.state = ActionState::Result { kind, text, failed };
                Ok(())
            }
            _ => Err(EditorError::InvalidActionState {
                expected: "processing",
            }),
        }
    }

    /// Result text, available only at `result`.
    pub fn result_text(&self) -> Result<&str, EditorError> {
        match &self.state {
            ActionState::Result { text, .. } => Ok(text),
            _ => Err(EditorError::InvalidActionState { expected: "result" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> SavedSelection {
        SavedSelection {
            start: 0,
            end: 4,
            epoch: 0,
            revision: 0,
        }
    }

    #[test]
    fn test_non_custom_action_skips_prompt() {
        let session = ActionSession::open(1, ActionKind::Summarize, selection(), "text".into(), None);
        assert_eq!(session.state, ActionState::Processing { kind: ActionKind::Summarize });
    }

    #[test]
    fn test_custom_without_prompt_opens_at_prompt() {
        let mut session = ActionSession::open(1, ActionKind::Custom, selection(), "text".into(), None);
        assert_eq!(session.state, ActionState::Prompt { kind: ActionKind::Custom });

        session.submit_prompt("make it formal".into()).unwrap();
        assert!(session.is_processing());
        assert_eq!(session.custom_prompt.as_deref(), Some("make it formal"));
    }

    #[test]
    fn test_custom_with_prompt_skips_prompt() {
        let session = ActionSession::open(
            1,
            ActionKind::Custom,
            selection(),
            "text".into(),
            Some("shorten".into()),
        );
        assert!(session.is_processing());
    }

    #[test]
    fn test_submit_prompt_rejected_outside_prompt_state() {
        let mut session = ActionSession::open(1, ActionKind::Expand, selection(), "text".into(), None);
        assert!(session.submit_prompt("late".into()).is_err());
    }

    #[test]
    fn test_complete_moves_processing_to_result() {
        let mut session = ActionSession::open(1, ActionKind::Paraphrase, selection(), "t".into(), None);
        session.complete("rewritten".into(), false).unwrap();
        assert_eq!(session.result_text().unwrap(), "rewritten");

        // A second completion for the same session is invalid.
        assert!(session.complete("again".into(), false).is_err());
    }

    #[test]
    fn test_failure_lands_in_result_with_flag() {
        let mut session = ActionSession::open(1, ActionKind::Cite, selection(), "t".into(), None);
        session.complete("unavailable".into(), true).unwrap();
        match &session.state {
            ActionState::Result { failed, .. } => assert!(failed),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_result_text_unavailable_before_completion() {
        let session = ActionSession::open(1, ActionKind::Expand, selection(), "t".into(), None);
        assert!(session.result_text().is_err());
    }
}
