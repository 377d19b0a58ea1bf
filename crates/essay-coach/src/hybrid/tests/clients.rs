use std::sync::Arc;

use mockito::{Matcher, Server};
use serde_json::json;

use super::common::*;
use crate::config::{GenerativeConfig, GrammarConfig};
use crate::hybrid::domain::{CorrectionKind, TextSpan};
use crate::hybrid::generative::{
    evaluator_from_config, GenerationRequest, GenerativeError, GenerativeEvaluator,
    OpenAiEvaluator,
};
use crate::hybrid::grammar::{check_grammar, GrammarChecker, GrammarServiceError, LanguageToolClient};
use crate::hybrid::HybridOrchestrator;

fn grammar_config(base_url: String) -> GrammarConfig {
    GrammarConfig {
        base_url,
        language: "en-AU".to_string(),
        timeout_secs: 5,
    }
}

fn generative_config(base_url: String, api_key: Option<&str>) -> GenerativeConfig {
    GenerativeConfig {
        api_key: api_key.map(str::to_string),
        base_url,
        model: "gpt-4o-mini".to_string(),
        timeout_secs: 5,
    }
}

fn language_tool_body() -> String {
    json!({
        "matches": [
            {
                "message": "Possible spelling mistake found.",
                "offset": 68,
                "length": 6,
                "replacements": [{ "value": "climbed" }, { "value": "climes" }],
                "rule": {
                    "id": "MORFOLOGIK_RULE_EN_AU",
                    "issueType": "misspelling",
                    "category": { "id": "TYPOS", "name": "Possible Typo" }
                }
            },
            {
                "message": "Possible typo: you repeated a whitespace",
                "offset": 3,
                "length": 2,
                "replacements": [{ "value": " " }],
                "rule": {
                    "id": "WHITESPACE_RULE",
                    "issueType": "whitespace",
                    "category": { "id": "TYPOGRAPHY", "name": "Typography" }
                }
            }
        ]
    })
    .to_string()
}

fn chat_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn language_tool_client_converts_matches() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/check")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("language".into(), "en-AU".into()),
            Matcher::UrlEncoded("text".into(), ESSAY_TEXT.into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(language_tool_body())
        .create_async()
        .await;

    let client = LanguageToolClient::new(&grammar_config(server.url())).expect("client");
    let corrections = client.check(ESSAY_TEXT).await.expect("grammar check");

    mock.assert_async().await;
    assert_eq!(corrections.len(), 1);
    assert_eq!(corrections[0].original, "climed");
    assert_eq!(corrections[0].suggestion.as_deref(), Some("climbed"));
    assert_eq!(corrections[0].position, TextSpan::new(68, 74));
    assert_eq!(corrections[0].kind, CorrectionKind::SpellingError);
    assert_eq!(corrections[0].category, "Possible Typo");
}

#[tokio::test]
async fn language_tool_errors_surface_as_status_and_degrade_to_empty() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v2/check")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let client = LanguageToolClient::new(&grammar_config(server.url())).expect("client");
    let err = client.check(ESSAY_TEXT).await.expect_err("status error");
    assert!(matches!(err, GrammarServiceError::Status { status: 503, .. }));

    let corrections = check_grammar(&client, ESSAY_TEXT).await;
    assert!(corrections.is_empty());
}

#[tokio::test]
async fn openai_evaluator_posts_json_mode_chat_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 2500,
            "response_format": { "type": "json_object" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_body(r#"{"criteriaScores": {}}"#))
        .create_async()
        .await;

    let config = generative_config(server.url(), Some("sk-test-key"));
    let evaluator = OpenAiEvaluator::new(&config, "sk-test-key").expect("client");
    let reply = evaluator
        .evaluate(&GenerationRequest {
            system: "rubric".to_string(),
            user: "essay".to_string(),
        })
        .await
        .expect("generation");

    mock.assert_async().await;
    assert_eq!(reply.content, r#"{"criteriaScores": {}}"#);
    assert_eq!(reply.model, "gpt-4o-mini-2024-07-18");
}

#[tokio::test]
async fn openai_evaluator_reports_status_and_empty_content() {
    let mut server = Server::new_async().await;
    let _unauthorized = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-revoked")
        .with_status(401)
        .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
        .create_async()
        .await;
    let _empty = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-empty")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "choices": [] }).to_string())
        .create_async()
        .await;
    let request = GenerationRequest {
        system: "rubric".to_string(),
        user: "essay".to_string(),
    };

    let revoked = OpenAiEvaluator::new(&generative_config(server.url(), None), "sk-revoked")
        .expect("client");
    let err = revoked.evaluate(&request).await.expect_err("unauthorized");
    assert!(matches!(err, GenerativeError::Status { status: 401, .. }));

    let empty = OpenAiEvaluator::new(&generative_config(server.url(), None), "sk-empty")
        .expect("client");
    let err = empty.evaluate(&request).await.expect_err("empty");
    assert!(matches!(err, GenerativeError::EmptyResponse));
}

#[tokio::test]
async fn malformed_credential_never_reaches_the_network() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let evaluator =
        evaluator_from_config(&generative_config(server.url(), Some("not-a-key"))).expect("client");
    let err = evaluator
        .evaluate(&GenerationRequest {
            system: String::new(),
            user: String::new(),
        })
        .await
        .expect_err("unavailable");

    mock.assert_async().await;
    assert!(matches!(err, GenerativeError::Unavailable(_)));
}

#[tokio::test]
async fn end_to_end_over_http_merges_both_services() {
    let mut server = Server::new_async().await;
    let _grammar = server
        .mock("POST", "/v2/check")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(language_tool_body())
        .create_async()
        .await;
    let _chat = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_body(&draft_json().to_string()))
        .create_async()
        .await;

    let grammar: Arc<dyn GrammarChecker> =
        Arc::new(LanguageToolClient::new(&grammar_config(server.url())).expect("client"));
    let generator: Arc<dyn GenerativeEvaluator> =
        evaluator_from_config(&generative_config(server.url(), Some("sk-live"))).expect("client");
    let orchestrator = HybridOrchestrator::new(grammar, generator);

    let outcome = orchestrator.evaluate(&essay()).await.expect("valid essay");

    assert!(!outcome.is_fallback());
    assert_eq!(outcome.total_score(), 21.6);
    assert_eq!(outcome.criteria_scores().ideas_content.score, 9.6);
    assert_eq!(outcome.grammar_corrections()[0].original, "climed");
}
