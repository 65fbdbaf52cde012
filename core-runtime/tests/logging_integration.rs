//! Integration tests for logging system

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CapturingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CapturingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

// Global subscriber installation can only happen once per process, so the
// whole lifecycle is exercised in one test.
#[test]
fn test_init_logging_installs_sink_once() {
    let sink = Arc::new(CapturingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(sink.clone());

    init_logging(config.clone()).expect("first initialization succeeds");

    tracing::info!(
        target: "core_playback",
        provider = "youtube",
        token = "should-not-leak",
        "Engine ready"
    );
    tracing::debug!(target: "hyper", "Dependency chatter");

    {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Engine ready");
        assert_eq!(entries[0].fields.get("provider"), Some(&"youtube".to_string()));
        assert_eq!(entries[0].fields.get("token"), Some(&"[REDACTED]".to_string()));
    }

    match init_logging(config) {
        Err(Error::Config(message)) => assert!(message.contains("Failed to initialize")),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
fn test_pii_redaction_tokens() {
    assert_eq!(redact_if_sensitive("access_token", "BQD123"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("refresh_token", "AQC456"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("client_secret", "s3cr3t"), "[REDACTED]");
}

#[test]
fn test_pii_redaction_normal_values() {
    assert_eq!(redact_if_sensitive("track_id", "12345"), "12345");
    assert_eq!(redact_if_sensitive("video_id", "dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    assert_eq!(redact_if_sensitive("user_id", "user_123"), "user_123");
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_pii_redaction(false)
        .with_spans(false)
        .with_target(false);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.redact_pii);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
}
