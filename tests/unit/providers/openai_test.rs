/*!
 * Tests for the OpenAI provider against a local mock server
 */

use std::time::Duration;
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use modlingo::errors::{ProviderError, TranslationError};
use modlingo::providers::Provider;
use modlingo::providers::openai::{OpenAI, OpenAIRequest};
use modlingo::translation::{ConversationBuilder, RetryingTranslator};

fn client(server: &MockServer) -> OpenAI {
    OpenAI::new_with_config("sk-test", "gpt-test", format!("{}/v1", server.uri()), Duration::from_secs(5))
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[test]
fn test_openaiRequest_addMessage_shouldAddMultipleMessages() {
    let request = OpenAIRequest::new("gpt-4")
        .add_message("system", "You are a translator")
        .add_message("user", "{\"a\":\"b\"}");

    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[1].role, "user");
}

#[tokio::test]
async fn test_complete_withSuccess_shouldSendBearerAndMessages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "messages": [
                { "role": "system", "content": "prompt" },
                { "role": "user", "content": "{\"a\":\"b\"}" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"a\":\"び\"}")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = client(&server);
    let response = provider.complete(&ConversationBuilder::build("prompt", "{\"a\":\"b\"}")).await.unwrap();

    assert_eq!(OpenAI::extract_text(&response).unwrap(), "{\"a\":\"び\"}");
}

#[tokio::test]
async fn test_complete_withUnauthorized_shouldReturnAuthError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let result = client(&server).complete(&ConversationBuilder::build("p", "{}")).await;

    match result {
        Err(ProviderError::AuthenticationError(message)) => assert!(message.contains("invalid api key")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_complete_withServerError_shouldReturnApiErrorWithStatus() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let result = client(&server).complete(&ConversationBuilder::build("p", "{}")).await;

    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 500, .. })));
}

#[tokio::test]
async fn test_complete_withNonJsonBody_shouldReturnParseError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let result = client(&server).complete(&ConversationBuilder::build("p", "{}")).await;

    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[tokio::test]
async fn test_translator_overHttp_shouldContinueTruncatedReply() {
    let server = MockServer::start().await;
    // the continued conversation carries four messages
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "messages": [{}, {}, { "role": "assistant" }, { "role": "user", "content": "Please continue to execute" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"a\":\"あ\"}")))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Okay, translating now...")))
        .with_priority(2)
        .mount(&server)
        .await;

    let translator = RetryingTranslator::new(client(&server));
    let fragment = translator.translate("p", "{\"a\":\"A\"}").await.unwrap();

    assert_eq!(fragment["a"], "あ");
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(2));
}

#[tokio::test]
async fn test_translator_overHttp_withEmptyChoices_shouldFail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let translator = RetryingTranslator::new(client(&server));
    let outcome = translator.translate("p", "{\"a\":\"A\"}").await;

    assert!(matches!(outcome, Err(TranslationError::Api(ProviderError::ParseError(_)))));
}
