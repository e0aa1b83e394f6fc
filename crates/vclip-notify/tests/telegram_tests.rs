//! Telegram client tests against a mock Bot API.

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vclip_notify::{Delivery, Messenger, TelegramClient, TelegramConfig};

fn client(server: &MockServer, max_upload_bytes: u64) -> TelegramClient {
    TelegramClient::new(TelegramConfig {
        bot_token: Some("42:token".into()),
        chat_id: Some("-1001".into()),
        api_base: server.uri(),
        max_upload_bytes,
        ..Default::default()
    })
    .unwrap()
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}}))
}

#[tokio::test]
async fn send_text_posts_html_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot42:token/sendMessage"))
        .and(body_partial_json(json!({
            "chat_id": "-1001",
            "text": "<b>hi</b>",
            "parse_mode": "HTML"
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client(&server, 1024).send_text("<b>hi</b>").await, Delivery::Sent);
}

#[tokio::test]
async fn long_text_is_truncated() {
    let server = MockServer::start().await;
    let expected = format!("{}\n...(truncated)", "a".repeat(4000));
    Mock::given(method("POST"))
        .and(path("/bot42:token/sendMessage"))
        .and(body_partial_json(json!({"text": expected})))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let delivery = client(&server, 1024).send_text(&"a".repeat(5000)).await;
    assert!(delivery.is_sent());
}

#[tokio::test]
async fn api_error_is_reported_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot42:token/sendMessage"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    match client(&server, 1024).send_text("hello").await {
        Delivery::Failed(reason) => assert!(reason.contains("chat not found")),
        other => panic!("unexpected delivery {other:?}"),
    }
}

#[tokio::test]
async fn send_media_uses_streaming_video_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot42:token/sendVideo"))
        .and(body_string_contains("supports_streaming"))
        .and(body_string_contains("clip_01_hook.mp4"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip_01_hook.mp4");
    std::fs::write(&video, vec![0u8; 256]).unwrap();

    let delivery = client(&server, 1024)
        .send_media(&video, Some("<b>Clip 1/1</b>"))
        .await;
    assert_eq!(delivery, Delivery::Sent);
}

#[tokio::test]
async fn oversized_media_falls_back_to_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot42:token/sendVideo"))
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot42:token/sendDocument"))
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot42:token/sendMessage"))
        .and(body_string_contains("File too large to send via Telegram"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("big.mp4");
    std::fs::write(&video, vec![0u8; 2048]).unwrap();

    let delivery = client(&server, 1024).send_media(&video, None).await;
    assert!(delivery.is_failed());
}

#[tokio::test]
async fn send_file_uses_document_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot42:token/sendDocument"))
        .and(body_string_contains("talk_transcript.md"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("talk_transcript.md");
    std::fs::write(&doc, "# Transcript: talk.mp4").unwrap();

    assert!(client(&server, 1024)
        .send_file(&doc, Some("Transcript - talk.mp4"))
        .await
        .is_sent());
}

#[tokio::test]
async fn missing_file_is_a_failure() {
    let server = MockServer::start().await;
    let delivery = client(&server, 1024)
        .send_file(std::path::Path::new("/no/such/file.srt"), None)
        .await;
    assert!(delivery.is_failed());
}

#[tokio::test]
async fn health_check_calls_get_me() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bot42:token/getMe"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client(&server, 1024).health_check().await, Delivery::Sent);
}
