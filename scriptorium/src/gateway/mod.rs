//! AI gateway - request/response facade over the generative-language API.
//!
//! Exposes the four operations behind [`WritingGateway`] so actors hold an
//! `Arc<dyn WritingGateway>` and tests substitute scripted implementations.
//! All four operations degrade to inert or neutral values on provider
//! failure rather than propagating errors; availability wins over failure
//! reporting. The short-input no-op thresholds also live here so they hold
//! for every implementation of the wire client.

mod client;
mod prompts;

pub use client::{GatewayError, GenerateClient, GenerateRequest, HttpGenerateClient};

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use shared_types::{
    ActionKind, AnalysisResult, ChatMessage, DocumentInsights, GrammarRating, Suggestion,
    SuggestionCategory,
};

pub type SharedGateway = Arc<dyn WritingGateway>;

/// Inputs under this length make `analyze` return the zero result without a
/// provider call.
pub const ANALYZE_MIN_CHARS: usize = 10;
/// Inputs under this length make `autocomplete` return an empty string
/// without a provider call.
pub const AUTOCOMPLETE_MIN_CHARS: usize = 50;
/// Only the trailing window of context is sent with autocomplete requests.
const AUTOCOMPLETE_WINDOW_CHARS: usize = 500;

pub const CHAT_APOLOGY: &str =
    "I'm sorry - I couldn't reach the writing assistant just now. Please try again in a moment.";
pub const ACTION_UNAVAILABLE: &str =
    "The writing assistant is unavailable right now. Please try again.";
const ANALYSIS_UNAVAILABLE_ADVICE: &str =
    "Analysis is temporarily unavailable. Your document is unchanged; try again shortly.";

/// Outcome of a quick action. `failed` marks the fixed error text so the
/// popup can surface it as a failure result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReply {
    pub text: String,
    pub failed: bool,
}

#[async_trait]
pub trait WritingGateway: Send + Sync {
    /// Analyze the document text. Never fails: short inputs get the zero
    /// result, provider failures get a fixed degraded result.
    async fn analyze(&self, text: &str) -> AnalysisResult;

    /// One chat turn with prior history and a truncated document snapshot.
    async fn chat(&self, history: &[ChatMessage], new_message: &str, document_context: &str)
        -> String;

    /// Short low-variability continuation of the preceding text. Empty
    /// string when the input is too short or the provider fails.
    async fn autocomplete(&self, preceding_text: &str) -> String;

    /// Run a quick action over the selected text.
    async fn quick_action(
        &self,
        kind: ActionKind,
        selection: &str,
        custom_prompt: Option<&str>,
    ) -> ActionReply;
}

/// Production gateway: degradation policy over a [`GenerateClient`].
pub struct GeminiGateway {
    client: Arc<dyn GenerateClient>,
}

impl GeminiGateway {
    pub fn new(client: Arc<dyn GenerateClient>) -> Self {
        Self { client }
    }

    /// Fixed result returned when the provider cannot be reached.
    fn degraded_result() -> AnalysisResult {
        AnalysisResult {
            clarity_score: 0,
            tone_score: 0,
            grammar_rating: GrammarRating::NeedsWork,
            readability: "Unavailable".to_string(),
            suggestions: vec![Suggestion {
                id: uuid::Uuid::new_v4().to_string(),
                category: SuggestionCategory::Improvement,
                advice: ANALYSIS_UNAVAILABLE_ADVICE.to_string(),
                original_text: None,
                replacement_text: None,
            }],
            insights: DocumentInsights::default(),
        }
    }

    fn parse_analysis(raw: &str) -> Option<AnalysisResult> {
        let wire: WireAnalysis = serde_json::from_str(raw).ok()?;
        Some(wire.into_result())
    }

    fn trailing_window(text: &str) -> &str {
        let total = text.chars().count();
        if total <= AUTOCOMPLETE_WINDOW_CHARS {
            return text;
        }
        let skip = total - AUTOCOMPLETE_WINDOW_CHARS;
        let (start, _) = text.char_indices().nth(skip).unwrap_or((0, ' '));
        &text[start..]
    }
}

#[async_trait]
impl WritingGateway for GeminiGateway {
    async fn analyze(&self, text: &str) -> AnalysisResult {
        if text.chars().count() < ANALYZE_MIN_CHARS {
            return AnalysisResult::default();
        }

        let request = GenerateRequest {
            prompt: prompts::analysis_prompt(text),
            response_schema: Some(prompts::analysis_schema()),
            ..Default::default()
        };

        match self.client.generate(request).await {
            Ok(raw) => match Self::parse_analysis(&raw) {
                Some(result) => result,
                None => {
                    tracing::warn!("Analysis response did not match the expected shape");
                    Self::degraded_result()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Analysis call failed, returning degraded result");
                Self::degraded_result()
            }
        }
    }

    async fn chat(
        &self,
        history: &[ChatMessage],
        new_message: &str,
        document_context: &str,
    ) -> String {
        let request =
            GenerateRequest::text(prompts::chat_prompt(history, new_message, document_context));
        match self.client.generate(request).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Chat call failed, returning apology");
                CHAT_APOLOGY.to_string()
            }
        }
    }

    async fn autocomplete(&self, preceding_text: &str) -> String {
        if preceding_text.chars().count() < AUTOCOMPLETE_MIN_CHARS {
            return String::new();
        }

        let request = GenerateRequest {
            prompt: prompts::autocomplete_prompt(Self::trailing_window(preceding_text)),
            temperature: Some(0.2),
            max_output_tokens: Some(40),
            ..Default::default()
        };

        match self.client.generate(request).await {
            Ok(text) => text.trim_end().to_string(),
            Err(e) => {
                tracing::debug!(error = %e, "Autocomplete call failed, suppressing suggestion");
                String::new()
            }
        }
    }

    async fn quick_action(
        &self,
        kind: ActionKind,
        selection: &str,
        custom_prompt: Option<&str>,
    ) -> ActionReply {
        let instruction = prompts::action_instruction(kind, custom_prompt);
        let request = GenerateRequest::text(format!("{instruction}\n\n{selection}"));

        match self.client.generate(request).await {
            Ok(text) => ActionReply {
                text: text.trim().to_string(),
                failed: false,
            },
            Err(e) => {
                tracing::warn!(error = %e, action = kind.as_str(), "Quick action failed");
                ActionReply {
                    text: ACTION_UNAVAILABLE.to_string(),
                    failed: true,
                }
            }
        }
    }
}

// ============================================================================
// Wire shapes
// ============================================================================

/// Tolerant deserialization target for the provider's structured analysis
/// output. Scores are clamped, suggestion ids are minted here.
#[derive(Debug, Deserialize)]
struct WireAnalysis {
    #[serde(default)]
    clarity_score: i64,
    #[serde(default)]
    tone_score: i64,
    #[serde(default)]
    grammar_rating: Option<String>,
    #[serde(default)]
    readability: Option<String>,
    #[serde(default)]
    suggestions: Vec<WireSuggestion>,
    #[serde(default)]
    insights: WireInsights,
}

#[derive(Debug, Deserialize)]
struct WireSuggestion {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    advice: String,
    #[serde(default)]
    original_text: Option<String>,
    #[serde(default)]
    replacement_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireInsights {
    #[serde(default)]
    reading_time_minutes: u32,
    #[serde(default)]
    vocabulary_diversity: f32,
    #[serde(default)]
    complex_sentences: u32,
    #[serde(default)]
    transition_words: u32,
}

impl WireAnalysis {
    fn into_result(self) -> AnalysisResult {
        AnalysisResult {
            clarity_score: self.clarity_score.clamp(0, 100) as u8,
            tone_score: self.tone_score.clamp(0, 100) as u8,
            grammar_rating: match self.grammar_rating.as_deref() {
                Some("Poor") => GrammarRating::Poor,
                Some("Needs Work") => GrammarRating::NeedsWork,
                _ => GrammarRating::Good,
            },
            readability: self.readability.unwrap_or_else(|| "N/A".to_string()),
            suggestions: self
                .suggestions
                .into_iter()
                .filter(|s| !s.advice.trim().is_empty())
                .map(|s| Suggestion {
                    id: uuid::Uuid::new_v4().to_string(),
                    category: match s.category.as_deref() {
                        Some("correction") => SuggestionCategory::Correction,
                        Some("tone") => SuggestionCategory::Tone,
                        _ => SuggestionCategory::Improvement,
                    },
                    advice: s.advice,
                    original_text: s.original_text.filter(|t| !t.is_empty()),
                    replacement_text: s.replacement_text.filter(|t| !t.is_empty()),
                })
                .collect(),
            insights: DocumentInsights {
                reading_time_minutes: self.insights.reading_time_minutes,
                vocabulary_diversity: self.insights.vocabulary_diversity,
                complex_sentences: self.insights.complex_sentences,
                transition_words: self.insights.transition_words,
            },
        }
    }
}
