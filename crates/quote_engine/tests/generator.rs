mod common;

use std::sync::Arc;

use common::{FailingText, ScriptedText};
use quote_core::{token_set_ratio, GeneratorSettings, Rejection};
use quote_engine::{GenerationError, GeneratorError, UniqueContentGenerator};

fn history(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn rejects_near_duplicate_then_accepts_distinct_quote() {
    bot_logging::initialize_for_tests();
    let text = ScriptedText::new(vec![
        Ok("\"Code is like poetry\" - Anon #code".into()),
        Ok("\"Ship it.\" - Anon #shipping 🚀".into()),
        Ok("A small rocket lifting off from a cluttered workbench.".into()),
    ]);
    let generator = UniqueContentGenerator::new(text.clone(), GeneratorSettings::default());

    let quote = generator
        .generate_unique_quote(history(&["Code is poetry"]))
        .await
        .expect("unique quote");

    assert_eq!(quote.quote_text, "Ship it.");
    assert_eq!(quote.attempts, 2);
    assert_eq!(
        quote.image_prompt,
        "A small rocket lifting off from a cluttered workbench."
    );
    assert!(token_set_ratio(&quote.quote_text, "Code is poetry") < 90.0);

    // Two candidate calls plus one description call.
    let requests = text.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].messages.iter().any(|m| m.content.contains("Code is poetry")));
    assert!(requests[2].messages.iter().any(|m| m.content.contains("Ship it.")));
}

#[tokio::test]
async fn empty_history_accepts_first_candidate() {
    let text = ScriptedText::new(vec![
        Ok("\"Talk is cheap. Show me the code.\" - Linus Torvalds #opensource".into()),
        Ok("A terminal glowing in a dark room.".into()),
    ]);
    let generator = UniqueContentGenerator::new(text.clone(), GeneratorSettings::default());

    let quote = generator.generate_unique_quote(Vec::new()).await.unwrap();

    assert_eq!(quote.attempts, 1);
    assert_eq!(quote.quote_text, "Talk is cheap. Show me the code.");
    assert_eq!(text.calls(), 2);
}

#[tokio::test]
async fn persistent_collaborator_errors_exhaust_the_retry_cap() {
    let text = Arc::new(FailingText::default());
    let settings = GeneratorSettings {
        max_attempts: 4,
        ..GeneratorSettings::default()
    };
    let generator = UniqueContentGenerator::new(text.clone(), settings);

    let err = generator.generate_unique_quote(Vec::new()).await.unwrap_err();

    match err {
        GeneratorError::GenerationExhausted {
            attempts,
            last_rejection,
        } => {
            assert_eq!(attempts, 4);
            assert!(matches!(last_rejection, Some(Rejection::GenerationError(_))));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(text.calls(), 4);
}

#[tokio::test]
async fn duplicates_forever_exhaust_the_retry_cap() {
    let script = (0..5)
        .map(|_| Ok("\"Code is poetry\" - Someone".to_string()))
        .collect();
    let text = ScriptedText::new(script);
    let generator = UniqueContentGenerator::new(text.clone(), GeneratorSettings::default());

    let err = generator
        .generate_unique_quote(history(&["code is poetry"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GeneratorError::GenerationExhausted { attempts: 5, .. }
    ));
    assert_eq!(text.calls(), 5);
}

#[tokio::test]
async fn description_error_is_surfaced_as_generation_failure() {
    let text = ScriptedText::new(vec![
        Ok("\"Fine\" - Me".into()),
        Err(GenerationError::Api {
            status: 500,
            body: "upstream".into(),
        }),
    ]);
    let generator = UniqueContentGenerator::new(text.clone(), GeneratorSettings::default());

    let err = generator.generate_unique_quote(Vec::new()).await.unwrap_err();

    match err {
        GeneratorError::GenerationFailed(inner) => assert_eq!(inner.status(), Some(500)),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(text.calls(), 2);
}
