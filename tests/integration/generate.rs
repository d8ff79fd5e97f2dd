//! Generation call tests
//!
//! Drives `generate_with` through real Gemini sessions against the mock
//! server and checks the classified outcome for every reply shape.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use augur::{
    gemini::{BlockReason, FinishReason},
    generate_with, AiError, ErrorKind, ProviderError, ProviderSettings,
};

use crate::common::{constants, settings, CountingConnector};
use crate::mocks::gemini::{GeminiTestData, MockGeminiServer};

/// Run one call with a fresh counting connector
async fn run(settings: &ProviderSettings) -> (Result<String, AiError>, CountingConnector) {
    let connector = CountingConnector::new();
    let result = generate_with(
        &connector,
        settings,
        constants::TEST_PROMPT,
        &CancellationToken::new(),
    )
    .await;
    (result, connector)
}

// =============================================================================
// Success
// =============================================================================

#[tokio::test]
async fn test_text_reply_is_returned() {
    let gemini = MockGeminiServer::start().await;
    gemini
        .mock_generate_reply(GeminiTestData::text("Water evaporates, condenses and falls as rain."))
        .await;

    let (result, connector) = run(&settings(&gemini.uri())).await;

    assert_eq!(result.unwrap(), "Water evaporates, condenses and falls as rain.");
    assert_eq!(connector.opened(), 1);
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn test_request_carries_prompt_and_key() {
    let gemini = MockGeminiServer::start().await;
    gemini.mock_generate_reply(GeminiTestData::text("ok")).await;

    let (result, _) = run(&settings(&gemini.uri())).await;
    assert!(result.is_ok());

    let requests = gemini.received_requests().await;
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(
        request.headers.get("x-goog-api-key").unwrap(),
        constants::TEST_API_KEY
    );

    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], constants::TEST_PROMPT);
}

// =============================================================================
// Classified failures
// =============================================================================

#[tokio::test]
async fn test_safety_block() {
    let gemini = MockGeminiServer::start().await;
    gemini.mock_generate_reply(GeminiTestData::blocked("SAFETY")).await;

    let (result, connector) = run(&settings(&gemini.uri())).await;

    match result {
        Err(AiError::SafetyBlocked(reason)) => assert_eq!(reason, BlockReason::Safety),
        other => panic!("expected SafetyBlocked, got {:?}", other),
    }
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn test_recitation_finish() {
    let gemini = MockGeminiServer::start().await;
    gemini
        .mock_generate_reply(GeminiTestData::finished_without_content("RECITATION"))
        .await;

    let (result, connector) = run(&settings(&gemini.uri())).await;

    match result {
        Err(AiError::AbnormalFinish(reason)) => assert_eq!(reason, FinishReason::Recitation),
        other => panic!("expected AbnormalFinish, got {:?}", other),
    }
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn test_non_text_part() {
    let gemini = MockGeminiServer::start().await;
    gemini.mock_generate_reply(GeminiTestData::non_text()).await;

    let (result, connector) = run(&settings(&gemini.uri())).await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedFormat);
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn test_empty_reply() {
    let gemini = MockGeminiServer::start().await;
    gemini.mock_generate_reply(GeminiTestData::empty()).await;

    let (result, connector) = run(&settings(&gemini.uri())).await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::EmptyResponse);
    assert_eq!(connector.closed(), 1);
}

// =============================================================================
// Provider and transport errors
// =============================================================================

#[tokio::test]
async fn test_provider_error_message_is_surfaced() {
    let gemini = MockGeminiServer::start().await;
    gemini
        .mock_generate_error(400, "INVALID_ARGUMENT", "API key not valid. Please pass a valid API key.")
        .await;

    let (result, connector) = run(&settings(&gemini.uri())).await;

    match result {
        Err(AiError::Generation(ProviderError::Api { status, message })) => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid. Please pass a valid API key.");
        }
        other => panic!("expected Generation(Api), got {:?}", other),
    }
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn test_error_reply_with_text_body() {
    let gemini = MockGeminiServer::start().await;
    gemini.mock_generate_raw(503, "upstream connect error").await;

    let (result, _) = run(&settings(&gemini.uri())).await;

    match result {
        Err(AiError::Generation(ProviderError::Api { status, message })) => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream connect error");
        }
        other => panic!("expected Generation(Api), got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_success_body() {
    let gemini = MockGeminiServer::start().await;
    gemini.mock_generate_raw(200, "<html>not json</html>").await;

    let (result, connector) = run(&settings(&gemini.uri())).await;

    assert!(matches!(
        result,
        Err(AiError::Generation(ProviderError::Decode(_)))
    ));
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn test_timeout_is_generation_error() {
    let gemini = MockGeminiServer::start().await;
    gemini
        .mock_generate_delayed(GeminiTestData::text("too late"), Duration::from_secs(2))
        .await;

    let settings = settings(&gemini.uri()).with_timeout(Duration::from_millis(200));
    let (result, connector) = run(&settings).await;

    assert!(matches!(
        result,
        Err(AiError::Generation(ProviderError::Timeout))
    ));
    assert_eq!(connector.closed(), 1);
}

#[tokio::test]
async fn test_unreachable_provider() {
    // Port 9 (discard) is not listening on the loopback interface
    let (result, connector) = run(&settings("http://127.0.0.1:9")).await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Generation);
    assert_eq!(connector.closed(), 1);
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancellation_during_request() {
    let gemini = MockGeminiServer::start().await;
    gemini
        .mock_generate_delayed(GeminiTestData::text("never seen"), Duration::from_secs(10))
        .await;

    let connector = CountingConnector::new();
    let settings = settings(&gemini.uri());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        generate_with(&connector, &settings, constants::TEST_PROMPT, &cancel),
    )
    .await
    .expect("cancelled call should return promptly");

    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(connector.opened(), 1);
    assert_eq!(connector.closed(), 1);
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_missing_credential_sends_nothing() {
    let gemini = MockGeminiServer::start().await;
    gemini.mock_generate_reply(GeminiTestData::text("unused")).await;

    let mut settings = settings(&gemini.uri());
    settings.api_key = None;
    let (result, connector) = run(&settings).await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::MissingCredential);
    assert_eq!(connector.opened(), 0);
    assert!(gemini.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_missing_model_sends_nothing() {
    let gemini = MockGeminiServer::start().await;
    gemini.mock_generate_reply(GeminiTestData::text("unused")).await;

    let mut settings = settings(&gemini.uri());
    settings.model = Some(String::new());
    let (result, connector) = run(&settings).await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::MissingModel);
    assert_eq!(connector.opened(), 0);
    assert!(gemini.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_malformed_key_is_session_init_error() {
    let gemini = MockGeminiServer::start().await;

    let mut settings = settings(&gemini.uri());
    settings.api_key = Some("line\nbreak".to_string().into());
    let (result, connector) = run(&settings).await;

    assert!(matches!(
        result,
        Err(AiError::SessionInit(ProviderError::InvalidApiKey))
    ));
    assert_eq!(connector.opened(), 0);
    assert!(gemini.received_requests().await.is_empty());
}
