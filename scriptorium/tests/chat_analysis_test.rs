//! Chat sidebar and analysis dashboard integration tests.

mod support;

use axum::http::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use support::{
    get, json_response, post_json, post_empty, put_document, put_selection, setup_test_app,
    setup_with_gateway, ScriptedGateway,
};

use shared_types::{
    AnalysisResult, DocumentInsights, GrammarRating, Suggestion, SuggestionCategory,
};

async fn wait_for_analysis(app: &axum::Router) -> Value {
    for _ in 0..50 {
        let (_, body) = json_response(app, get("/api/analysis")).await;
        if !body["result"].is_null() && body["loading"] == false {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("analysis never completed");
}

fn scripted_analysis() -> AnalysisResult {
    AnalysisResult {
        clarity_score: 82,
        tone_score: 74,
        grammar_rating: GrammarRating::Good,
        readability: "High school level".to_string(),
        suggestions: vec![
            Suggestion {
                id: "s-fix".to_string(),
                category: SuggestionCategory::Correction,
                advice: "Fix subject-verb agreement".to_string(),
                original_text: Some("results was".to_string()),
                replacement_text: Some("results were".to_string()),
            },
            Suggestion {
                id: "s-advice".to_string(),
                category: SuggestionCategory::Improvement,
                advice: "Vary sentence openings".to_string(),
                original_text: None,
                replacement_text: None,
            },
        ],
        insights: DocumentInsights {
            reading_time_minutes: 1,
            vocabulary_diversity: 0.62,
            complex_sentences: 2,
            transition_words: 4,
        },
    }
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn test_chat_turn_appends_user_and_model() {
    let (app, _gateway, _dir) = setup_test_app().await;

    let (status, body) = json_response(
        &app,
        post_json("/api/chat", json!({ "text": "How can I improve my intro?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["content"], "How can I improve my intro?");
    assert_eq!(body["model"]["role"], "model");
    assert_eq!(body["model"]["content"], "scripted reply");

    let (_, history) = json_response(&app, get("/api/chat")).await;
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["id"], body["user"]["id"]);
    assert_eq!(messages[1]["id"], body["model"]["id"]);
}

#[tokio::test]
async fn test_chat_apply_inserts_at_selection() {
    let (app, _gateway, _dir) = setup_test_app().await;
    put_document(&app, "<p>replace THIS now</p>", 0).await;
    put_selection(&app, 11, 15).await;

    let (_, exchange) = json_response(
        &app,
        post_json("/api/chat", json!({ "text": "suggest a phrase" })),
    )
    .await;
    let message_id = exchange["model"]["id"].as_str().unwrap();

    let (status, body) = json_response(
        &app,
        post_json("/api/chat/apply", json!({ "message_id": message_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "<p>replace scripted reply now</p>");
}

#[tokio::test]
async fn test_chat_apply_rejects_user_message_and_unknown_id() {
    let (app, _gateway, _dir) = setup_test_app().await;

    let (status, body) = json_response(
        &app,
        post_json("/api/chat/apply", json!({ "message_id": "missing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (_, exchange) = json_response(&app, post_json("/api/chat", json!({ "text": "hi" }))).await;
    let user_id = exchange["user"]["id"].as_str().unwrap();
    let (status, body) = json_response(
        &app,
        post_json("/api/chat/apply", json!({ "message_id": user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "NOT_MODEL_TURN");
}

// ============================================================================
// Analysis
// ============================================================================

#[tokio::test]
async fn test_analysis_starts_empty() {
    let (app, _gateway, _dir) = setup_test_app().await;
    let (status, body) = json_response(&app, get("/api/analysis")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loading"], false);
    assert!(body["result"].is_null());
}

#[tokio::test]
async fn test_refresh_populates_dashboard() {
    let gateway = ScriptedGateway {
        analysis: scripted_analysis(),
        ..ScriptedGateway::default()
    };
    let (app, gateway, _dir) = setup_with_gateway(gateway).await;
    put_document(&app, "<p>The results was clear to every reviewer.</p>", 0).await;

    let (status, body) = json_response(&app, post_empty("/api/analysis/refresh")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loading"], true);

    let body = wait_for_analysis(&app).await;
    let result = &body["result"];
    assert_eq!(result["clarity_score"], 82);
    assert_eq!(result["tone_score"], 74);
    assert_eq!(result["readability"], "High school level");
    assert_eq!(result["suggestions"].as_array().unwrap().len(), 2);
    assert_eq!(result["insights"]["transition_words"], 4);
    assert_eq!(gateway.analyze_calls(), 1);
}

#[tokio::test]
async fn test_apply_suggestion_replaces_exact_text() {
    let gateway = ScriptedGateway {
        analysis: scripted_analysis(),
        ..ScriptedGateway::default()
    };
    let (app, _gateway, _dir) = setup_with_gateway(gateway).await;
    put_document(&app, "<p>the results was clear</p>", 0).await;

    json_response(&app, post_empty("/api/analysis/refresh")).await;
    wait_for_analysis(&app).await;

    let (status, body) = json_response(
        &app,
        post_json(
            "/api/analysis/suggestions/apply",
            json!({ "suggestion_id": "s-fix" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "<p>the results were clear</p>");
}

#[tokio::test]
async fn test_apply_suggestion_error_paths() {
    let gateway = ScriptedGateway {
        analysis: scripted_analysis(),
        ..ScriptedGateway::default()
    };
    let (app, _gateway, _dir) = setup_with_gateway(gateway).await;
    // Document that does not contain the suggested original text.
    put_document(&app, "<p>nothing matches here</p>", 0).await;

    json_response(&app, post_empty("/api/analysis/refresh")).await;
    wait_for_analysis(&app).await;

    let (status, body) = json_response(
        &app,
        post_json(
            "/api/analysis/suggestions/apply",
            json!({ "suggestion_id": "unknown" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "SUGGESTION_NOT_FOUND");

    // Advice-only suggestion has nothing to apply.
    let (status, body) = json_response(
        &app,
        post_json(
            "/api/analysis/suggestions/apply",
            json!({ "suggestion_id": "s-advice" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "NO_MATCH");

    // Original text is absent from this document.
    let (status, body) = json_response(
        &app,
        post_json(
            "/api/analysis/suggestions/apply",
            json!({ "suggestion_id": "s-fix" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "NO_MATCH");
}
