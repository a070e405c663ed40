//! The welcome-email server over real HTTP.

#![allow(clippy::unwrap_used)]

use mangaverse_storefront::config::StorefrontConfig;
use mangaverse_storefront::routes::routes;
use mangaverse_storefront::state::AppState;
use serde_json::{Value, json};
use tokio::net::TcpListener;

async fn spawn_server() -> String {
    let config = StorefrontConfig::from_lookup(|_| None).unwrap();
    let app = routes().with_state(AppState::with_email(config, None));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_health() {
    let base = spawn_server().await;
    let body = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_welcome_email_requires_recipient() {
    let base = spawn_server().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/send-welcome-email"))
        .json(&json!({"recipientEmail": " ", "recipientName": "Grimmer"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "recipientEmail is required");
}

#[tokio::test]
async fn test_welcome_email_without_smtp_fails() {
    let base = spawn_server().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/send-welcome-email"))
        .json(&json!({"recipientEmail": "grimmer@example.com", "recipientName": "Grimmer"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].is_string());
}
