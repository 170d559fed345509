// Integration tests for the HTTP control API
//
// The router is served on an ephemeral port and driven with a plain HTTP
// client, the way the browser client talks to it.

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;

use lectern::audio::AudioCapture;
use lectern::session::SessionManager;
use lectern::speech::{SpeechRecognizer, UnsupportedRecognizer};
use lectern::{create_router, AppState, Config};

mod common;
use common::{spawn_endpoint, ScriptedCapture};

/// Serve the control API against scripted collaborators and return its
/// base URL. The configured default mode is `chunked`.
async fn serve_api() -> Result<String> {
    let transcribe = spawn_endpoint(vec![]).await;

    let mut config = Config::load("does/not/exist")?;
    config.endpoints.transcribe_url = transcribe.url.clone();
    config.recording.flush_interval_secs = 3600;
    config.recording.process_interval_secs = 3600;

    let manager = SessionManager::with_providers(
        &config,
        Box::new(|_| Ok(Box::new(ScriptedCapture::new(vec![])) as Box<dyn AudioCapture>)),
        Box::new(|| Box::new(UnsupportedRecognizer) as Box<dyn SpeechRecognizer>),
    )?;

    let app = create_router(AppState::new(Arc::new(manager)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("api serve");
    });

    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn start_without_a_body_uses_the_default_mode() -> Result<()> {
    let base = serve_api().await?;
    let client = reqwest::Client::new();

    let response = client.post(format!("{base}/sessions/start")).send().await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["mode"], "chunked");
    assert_eq!(body["status"], "recording");
    assert!(body["session_id"].as_str().unwrap().starts_with("session-"));

    client.post(format!("{base}/sessions/stop")).send().await?;
    Ok(())
}

#[tokio::test]
async fn start_with_a_mode_body_overrides_the_default() -> Result<()> {
    let base = serve_api().await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/sessions/start"))
        .json(&serde_json::json!({ "mode": "chunked" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["mode"], "chunked");

    client.post(format!("{base}/sessions/stop")).send().await?;
    Ok(())
}

#[tokio::test]
async fn second_start_while_recording_returns_conflict() -> Result<()> {
    let base = serve_api().await?;
    let client = reqwest::Client::new();

    client.post(format!("{base}/sessions/start")).send().await?;
    let response = client.post(format!("{base}/sessions/start")).send().await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await?;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("already recording"));

    client.post(format!("{base}/sessions/stop")).send().await?;
    Ok(())
}

#[tokio::test]
async fn queries_without_a_session_return_not_found() -> Result<()> {
    let base = serve_api().await?;
    let client = reqwest::Client::new();

    let status = client
        .get(format!("{base}/sessions/status"))
        .send()
        .await?;
    assert_eq!(status.status(), StatusCode::NOT_FOUND);

    let stop = client.post(format!("{base}/sessions/stop")).send().await?;
    assert_eq!(stop.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn health_check_responds_ok() -> Result<()> {
    let base = serve_api().await?;

    let response = reqwest::get(format!("{base}/health")).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");
    Ok(())
}
