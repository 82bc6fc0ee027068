//! Prompt templates for the four gateway operations.

use serde_json::{json, Value};
use shared_types::{ActionKind, ChatMessage, ChatRole};

pub(crate) fn analysis_prompt(text: &str) -> String {
    format!(
        "You are an academic writing analyst. Analyze the document below and \
         respond with JSON only.\n\
         Score clarity and tone from 0 to 100. Rate grammar as one of \
         \"Good\", \"Needs Work\", or \"Poor\". Describe readability in a \
         short phrase (for example \"College level\"). Provide up to five \
         targeted suggestions; when a suggestion rewrites a specific passage, \
         include the exact original text and its replacement.\n\n\
         Document:\n{text}"
    )
}

/// Structured-output schema matching the `AnalysisResult` wire shape.
pub(crate) fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "clarity_score": { "type": "integer" },
            "tone_score": { "type": "integer" },
            "grammar_rating": { "type": "string", "enum": ["Good", "Needs Work", "Poor"] },
            "readability": { "type": "string" },
            "suggestions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "category": { "type": "string", "enum": ["improvement", "correction", "tone"] },
                        "advice": { "type": "string" },
                        "original_text": { "type": "string" },
                        "replacement_text": { "type": "string" }
                    },
                    "required": ["category", "advice"]
                }
            },
            "insights": {
                "type": "object",
                "properties": {
                    "reading_time_minutes": { "type": "integer" },
                    "vocabulary_diversity": { "type": "number" },
                    "complex_sentences": { "type": "integer" },
                    "transition_words": { "type": "integer" }
                }
            }
        },
        "required": ["clarity_score", "tone_score", "grammar_rating", "readability", "suggestions", "insights"]
    })
}

pub(crate) fn chat_prompt(
    history: &[ChatMessage],
    new_message: &str,
    document_context: &str,
) -> String {
    let mut prompt = String::with_capacity(document_context.len() + new_message.len() + 512);
    prompt.push_str(
        "You are an academic writing assistant embedded in a text editor. \
         Help the user improve their document. Be concise and concrete.\n",
    );
    if !document_context.is_empty() {
        prompt.push_str("\nCurrent document (may be truncated):\n");
        prompt.push_str(document_context);
        prompt.push('\n');
    }
    for turn in history {
        let speaker = match turn.role {
            ChatRole::User => "User",
            ChatRole::Model => "Assistant",
        };
        prompt.push_str(&format!("\n{speaker}: {}", turn.content));
    }
    prompt.push_str(&format!("\nUser: {new_message}\nAssistant:"));
    prompt
}

pub(crate) fn autocomplete_prompt(window: &str) -> String {
    format!(
        "Continue the text below with a short natural completion of at most \
         one sentence fragment. Respond with the continuation only, no \
         quotes, no commentary.\n\n{window}"
    )
}

pub(crate) fn action_instruction(kind: ActionKind, custom_prompt: Option<&str>) -> String {
    match kind {
        ActionKind::Paraphrase => {
            "Paraphrase the following text, preserving its meaning and academic register. \
             Respond with the rewritten text only."
                .to_string()
        }
        ActionKind::Expand => {
            "Expand the following text with additional detail and supporting argument. \
             Respond with the expanded text only."
                .to_string()
        }
        ActionKind::Summarize => {
            "Summarize the following text concisely. Respond with the summary only."
                .to_string()
        }
        ActionKind::Cite => {
            "Suggest an appropriate academic citation for the claim in the following text, \
             in an author-date style. Respond with the citation only."
                .to_string()
        }
        ActionKind::Custom => match custom_prompt {
            Some(prompt) if !prompt.trim().is_empty() => prompt.trim().to_string(),
            _ => "Improve the following text. Respond with the improved text only.".to_string(),
        },
    }
}
