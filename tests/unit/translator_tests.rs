/*!
 * Tests for the retrying translator state machine
 */

use modlingo::errors::{ProviderError, TranslationError};
use modlingo::providers::mock::{MockErrorType, MockProvider, MockReply};
use modlingo::translation::conversation::{Role, CONTINUE_INSTRUCTION};
use modlingo::translation::RetryingTranslator;

const PROMPT: &str = "Translate the following.";
const BATCH: &str = "{\"a.key\":\"Hello\"}";

#[tokio::test]
async fn test_translate_withImmediateJson_shouldSendOneRequest() {
    let mock = MockProvider::scripted([MockReply::text("{\"a.key\":\"こんにちは\"}")]);
    let translator = RetryingTranslator::new(mock.clone());

    let fragment = translator.translate(PROMPT, BATCH).await.unwrap();

    assert_eq!(fragment["a.key"], "こんにちは");
    assert_eq!(mock.request_count(), 1);
    assert_eq!(mock.requests()[0].len(), 2);
}

#[tokio::test]
async fn test_translate_withOneIncompleteReply_shouldExtendOnce() {
    let mock = MockProvider::scripted([
        MockReply::text("Sure, I'll translate that"),
        MockReply::text("{\"a.key\":\"X\"}"),
    ]);
    let translator = RetryingTranslator::new(mock.clone());

    let fragment = translator.translate(PROMPT, BATCH).await.unwrap();
    assert_eq!(fragment["a.key"], "X");

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    let second = &requests[1];
    assert_eq!(second.len(), 4);
    assert_eq!(second.continuation_count(), 1);
    assert_eq!(second.turns()[2].role, Role::Assistant);
    assert_eq!(second.turns()[2].content, "Sure, I'll translate that");
    assert_eq!(second.turns()[3].content, CONTINUE_INSTRUCTION);
}

#[tokio::test]
async fn test_translate_withNoJsonEver_shouldFailAfterCeiling() {
    let mock = MockProvider::scripted([
        MockReply::text("thinking"),
        MockReply::text("still thinking"),
        MockReply::text("{\"a.key\":\"too late\"}"),
    ]);
    let translator = RetryingTranslator::new(mock.clone());

    let outcome = translator.translate(PROMPT, BATCH).await;

    assert!(matches!(outcome, Err(TranslationError::NoJsonFound)));
    // default ceiling of 3 sends two requests with a single continuation
    assert_eq!(mock.request_count(), 2);
    assert_eq!(mock.requests()[1].continuation_count(), 1);
}

#[tokio::test]
async fn test_translate_withMalformedJson_shouldFailWithoutContinuation() {
    let mock = MockProvider::scripted([
        MockReply::text("{hello: }"),
        MockReply::text("{\"a.key\":\"unused\"}"),
    ]);
    let translator = RetryingTranslator::new(mock.clone());

    let outcome = translator.translate(PROMPT, BATCH).await;

    assert!(matches!(outcome, Err(TranslationError::InvalidJson(_))));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withProviderFailure_shouldReturnApiError() {
    let mock = MockProvider::scripted([MockReply::Fail(MockErrorType::Auth)]);
    let translator = RetryingTranslator::new(mock.clone());

    let outcome = translator.translate(PROMPT, BATCH).await;

    assert!(matches!(outcome, Err(TranslationError::Api(ProviderError::AuthenticationError(_)))));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withFailureAfterContinuation_shouldNotRetry() {
    let mock = MockProvider::scripted([
        MockReply::text("no json yet"),
        MockReply::Fail(MockErrorType::RateLimit),
    ]);
    let translator = RetryingTranslator::new(mock.clone());

    let outcome = translator.translate(PROMPT, BATCH).await;

    assert!(matches!(outcome, Err(TranslationError::Api(ProviderError::RateLimitExceeded(_)))));
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn test_translate_calledTwice_shouldStartFreshConversations() {
    let mock = MockProvider::scripted([
        MockReply::text("incomplete"),
        MockReply::text("{\"a.key\":\"1\"}"),
        MockReply::text("{\"a.key\":\"2\"}"),
    ]);
    let translator = RetryingTranslator::new(mock.clone());

    translator.translate(PROMPT, BATCH).await.unwrap();
    let fragment = translator.translate(PROMPT, BATCH).await.unwrap();

    assert_eq!(fragment["a.key"], "2");
    let requests = mock.requests();
    assert_eq!(requests[2].len(), 2);
    assert_eq!(requests[2].continuation_count(), 0);
}

#[tokio::test]
async fn test_translate_withEchoProvider_shouldReturnSourceValues() {
    let translator = RetryingTranslator::new(MockProvider::echo());
    let fragment = translator.translate(PROMPT, "{\"a\":\"Hello\",\"b\":\"Wor\\\\ld\"}").await.unwrap();

    assert_eq!(fragment["a"], "Hello");
    assert_eq!(fragment["b"], "Wor\\ld");
}
