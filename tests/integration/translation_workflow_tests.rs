/*!
 * End-to-end tests of translating a language map through the core pipeline
 */

use modlingo::providers::mock::{MockProvider, MockReply};
use modlingo::translation::batch::Batch;
use modlingo::translation::{BatchOrchestrator, LanguageMap, PromptTemplate, RetryingTranslator};
use crate::common::language_map;

/// Mod-sized source map with a few formatting-heavy values
fn sample_source() -> LanguageMap {
    let mut source: LanguageMap = (0..60)
        .map(|i| (format!("item.testmod.thing_{:02}", i), format!("Thing number {}", i)))
        .collect();
    source.insert("tooltip.testmod.gold".to_string(), "§6Golden§r tool".to_string());
    source.insert("tooltip.testmod.lines".to_string(), "First line\nSecond line".to_string());
    source.insert("tooltip.testmod.path".to_string(), "C:\\mods\\config".to_string());
    source
}

#[tokio::test]
async fn test_translate_map_withSpecialCharacters_shouldKeepModelValues() {
    let source = language_map(&[("a.key", "Hello"), ("b.key", "Wor\\ld")]);
    let mock = MockProvider::scripted([
        MockReply::text("Here you go:\n{\"a.key\":\"こんにちは\",\"b.key\":\"世\\\\界\"}\nEnjoy!"),
    ]);
    let orchestrator = BatchOrchestrator::new(RetryingTranslator::new(mock.clone()), 25);

    let target = orchestrator.translate_map(&source, "prompt", |_| {}).await.unwrap();

    assert_eq!(target, language_map(&[("a.key", "こんにちは"), ("b.key", "世\\界")]));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_translate_map_withRenderedPrompt_shouldSendItAsSystemTurn() {
    let source = sample_source();
    let system_prompt = PromptTemplate::default().render("Test Mod", "en_us", "ja_jp");
    let mock = MockProvider::echo();
    let orchestrator = BatchOrchestrator::new(RetryingTranslator::new(mock.clone()), 25);

    let target = orchestrator.translate_map(&source, &system_prompt, |_| {}).await.unwrap();

    assert_eq!(target, source);
    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(request.turns()[0].content, system_prompt);
        assert!(request.turns()[0].content.contains("\"Test Mod\""));
    }
}

#[tokio::test]
async fn test_translate_map_batchPayloads_shouldCoverSourceExactlyOnce() {
    let source = sample_source();
    let mock = MockProvider::echo();
    let orchestrator = BatchOrchestrator::new(RetryingTranslator::new(mock.clone()), 10);

    orchestrator.translate_map(&source, "p", |_| {}).await.unwrap();

    let mut seen = LanguageMap::new();
    for request in mock.requests() {
        let batch: LanguageMap = serde_json::from_str(&request.turns()[1].content).unwrap();
        assert!(batch.len() <= 10);
        for (key, value) in batch {
            assert!(seen.insert(key, value).is_none(), "key sent twice");
        }
    }
    assert_eq!(seen, source);
}

#[tokio::test]
async fn test_translate_map_withTruncatedSecondBatch_shouldRecover() {
    let source = language_map(&[("a", "A"), ("b", "B")]);
    let mock = MockProvider::scripted([
        MockReply::text("{\"a\":\"あ\"}"),
        MockReply::text("Translating key b, one moment"),
        MockReply::text("{\"b\":\"び\"}"),
    ]);
    let orchestrator = BatchOrchestrator::new(RetryingTranslator::new(mock.clone()), 1);

    let target = orchestrator.translate_map(&source, "p", |_| {}).await.unwrap();

    assert_eq!(target, language_map(&[("a", "あ"), ("b", "び")]));
    assert_eq!(mock.requests()[2].continuation_count(), 1);
}

#[test]
fn test_batch_toJson_shouldEscapeSpecialCharacters() {
    let batch = Batch { index: 0, entries: language_map(&[("k", "a\\b\n§c")]) };
    let json = batch.to_json();
    assert!(json.contains("a\\\\b\\n§c"));
}
