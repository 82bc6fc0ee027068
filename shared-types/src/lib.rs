//! Shared types between the writing service and its clients
//!
//! These types cross the HTTP boundary:
//! - ractor actors (native Rust) own the canonical state
//! - browser clients consume the JSON and the generated TypeScript
//!
//! Serializable with serde for JSON over HTTP

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Document
// ============================================================================

/// Snapshot of the editor document returned by every document operation.
///
/// `revision` increases on every edit; `epoch` increases only on wholesale
/// replacement (new document, file import). Selections remember both so
/// stale ones can be rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub struct EditorSnapshot {
    pub content: String,
    pub revision: u64,
    pub epoch: u64,
    pub word_count: usize,
    pub char_count: usize,
}

/// A captured text-range selection, in byte offsets into the markup string.
///
/// Carries the epoch and revision it was captured under; using it after a
/// document reset fails validation instead of inserting at a detached
/// location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub struct SavedSelection {
    pub start: usize,
    pub end: usize,
    pub epoch: u64,
    pub revision: u64,
}

impl SavedSelection {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Overall grammar verdict for the current document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub enum GrammarRating {
    Good,
    #[serde(rename = "Needs Work")]
    NeedsWork,
    Poor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub enum SuggestionCategory {
    Improvement,
    Correction,
    Tone,
}

/// A targeted edit recommendation from the analysis pass.
///
/// When both `original_text` and `replacement_text` are present the
/// suggestion can be applied with one click; application requires an exact
/// substring match of `original_text` in the current document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub struct Suggestion {
    pub id: String,
    pub category: SuggestionCategory,
    pub advice: String,
    pub original_text: Option<String>,
    pub replacement_text: Option<String>,
}

/// Aggregate document statistics reported alongside the scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, TS)]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub struct DocumentInsights {
    pub reading_time_minutes: u32,
    pub vocabulary_diversity: f32,
    pub complex_sentences: u32,
    pub transition_words: u32,
}

/// Result of one analysis pass. Replaced wholesale; never patched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub struct AnalysisResult {
    /// 0-100
    pub clarity_score: u8,
    /// 0-100
    pub tone_score: u8,
    pub grammar_rating: GrammarRating,
    pub readability: String,
    pub suggestions: Vec<Suggestion>,
    pub insights: DocumentInsights,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            clarity_score: 0,
            tone_score: 0,
            grammar_rating: GrammarRating::Good,
            readability: "N/A".to_string(),
            suggestions: Vec::new(),
            insights: DocumentInsights::default(),
        }
    }
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub enum ChatRole {
    User,
    Model,
}

/// One conversation turn. Append-only; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Quick actions / popup state machine
// ============================================================================

/// The predefined AI transformations that can run over a selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub enum ActionKind {
    Paraphrase,
    Expand,
    Summarize,
    Cite,
    Custom,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Paraphrase => "paraphrase",
            ActionKind::Expand => "expand",
            ActionKind::Summarize => "summarize",
            ActionKind::Cite => "cite",
            ActionKind::Custom => "custom",
        }
    }
}

/// Observable state of the AI action popup.
///
/// `closed` is the implicit initial and terminal state; only `custom`
/// actions pass through `prompt`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "state", rename_all = "lowercase")]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub enum ActionState {
    Closed,
    Prompt {
        kind: ActionKind,
    },
    Processing {
        kind: ActionKind,
    },
    Result {
        kind: ActionKind,
        text: String,
        failed: bool,
    },
}

// ============================================================================
// Formatting commands
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// A formatting command applied to the live selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "command", rename_all = "snake_case")]
#[ts(export, export_to = "../../bindings/generated.ts")]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    Heading { level: u8 },
    BulletList,
    NumberedList,
    Align { alignment: Alignment },
    Indent,
    Outdent,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ts_rs::Config;

    #[test]
    fn test_chat_message_ids_unique() {
        let a = ChatMessage::new(ChatRole::User, "hello");
        let b = ChatMessage::new(ChatRole::User, "hello");
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 36); // UUID length
    }

    #[test]
    fn test_grammar_rating_wire_labels() {
        assert_eq!(
            serde_json::to_string(&GrammarRating::NeedsWork).unwrap(),
            "\"Needs Work\""
        );
        assert_eq!(serde_json::to_string(&GrammarRating::Good).unwrap(), "\"Good\"");
    }

    #[test]
    fn test_action_state_tagged_union() {
        let state = ActionState::Result {
            kind: ActionKind::Summarize,
            text: "shorter".to_string(),
            failed: false,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "result");
        assert_eq!(json["kind"], "summarize");

        let closed: ActionState = serde_json::from_str(r#"{"state":"closed"}"#).unwrap();
        assert_eq!(closed, ActionState::Closed);
    }

    #[test]
    fn test_format_command_wire_shape() {
        let cmd = FormatCommand::Heading { level: 2 };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["command"], "heading");
        assert_eq!(json["level"], 2);

        let align: FormatCommand =
            serde_json::from_str(r#"{"command":"align","alignment":"center"}"#).unwrap();
        assert_eq!(
            align,
            FormatCommand::Align {
                alignment: Alignment::Center
            }
        );
    }

    #[test]
    fn test_analysis_result_default_is_neutral() {
        let result = AnalysisResult::default();
        assert_eq!(result.clarity_score, 0);
        assert_eq!(result.tone_score, 0);
        assert_eq!(result.readability, "N/A");
        assert!(result.suggestions.is_empty());
        assert_eq!(result.insights.reading_time_minutes, 0);
    }

    #[test]
    fn test_analysis_result_serialization() {
        let result = AnalysisResult {
            clarity_score: 82,
            tone_score: 74,
            grammar_rating: GrammarRating::Good,
            readability: "College level".to_string(),
            suggestions: vec![Suggestion {
                id: "s1".to_string(),
                category: SuggestionCategory::Correction,
                advice: "Fix subject-verb agreement".to_string(),
                original_text: Some("The results was".to_string()),
                replacement_text: Some("The results were".to_string()),
            }],
            insights: DocumentInsights {
                reading_time_minutes: 3,
                vocabulary_diversity: 0.62,
                complex_sentences: 4,
                transition_words: 7,
            },
        };

        let json = serde_json::to_string(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }

    #[test]
    fn export_types() {
        // Export all types to TypeScript
        // The export_to attribute in each type's #[ts] macro specifies the output file
        let config = Config::default();
        EditorSnapshot::export(&config).unwrap();
        SavedSelection::export(&config).unwrap();
        GrammarRating::export(&config).unwrap();
        SuggestionCategory::export(&config).unwrap();
        Suggestion::export(&config).unwrap();
        DocumentInsights::export(&config).unwrap();
        AnalysisResult::export(&config).unwrap();
        ChatRole::export(&config).unwrap();
        ChatMessage::export(&config).unwrap();
        ActionKind::export(&config).unwrap();
        ActionState::export(&config).unwrap();
        Alignment::export(&config).unwrap();
        FormatCommand::export(&config).unwrap();
    }
}
