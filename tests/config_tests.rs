// Integration tests for configuration loading
//
// Verify that a config file layers over the built-in defaults and that
// missing files fall back to defaults entirely.

use std::fs;

use anyhow::Result;
use tempfile::TempDir;

use lectern::Config;

#[test]
fn file_values_layer_over_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("lectern.toml");
    fs::write(
        &path,
        r#"
[service.http]
bind = "0.0.0.0"
port = 9000

[recording]
mode = "live"

[endpoints]
transcribe_url = "http://transcriber.internal/api/transcribe-chunk"
"#,
    )?;

    let stem = dir.path().join("lectern");
    let config = Config::load(stem.to_str().expect("utf-8 path"))?;

    // Overridden values.
    assert_eq!(config.service.http.bind, "0.0.0.0");
    assert_eq!(config.service.http.port, 9000);
    assert_eq!(config.recording.mode, "live");
    assert_eq!(
        config.endpoints.transcribe_url,
        "http://transcriber.internal/api/transcribe-chunk"
    );

    // Untouched defaults survive.
    assert_eq!(config.service.name, "lectern");
    assert_eq!(config.audio.sample_rate, 16_000);
    assert_eq!(config.recording.process_interval_secs, 5);
    assert_eq!(config.endpoints.notes_url, "http://localhost:3000/api/notes");
    Ok(())
}

#[test]
fn missing_file_uses_defaults() -> Result<()> {
    let config = Config::load("no/such/config")?;
    assert_eq!(config.service.http.port, 8090);
    assert_eq!(config.recording.mode, "chunked");
    assert_eq!(config.audio.block_size, 4096);
    Ok(())
}
