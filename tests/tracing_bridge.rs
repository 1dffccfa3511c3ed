//! The global `tracing` bridge delivers library events to a configured logger.

use applog::observability::init_tracing_bridge;
use applog::{LogFormat, LogSettings};
use serde_json::Value;

mod common;

#[test]
fn test_global_bridge_reaches_destinations() {
    let settings = LogSettings {
        format: LogFormat::Json,
        ..LogSettings::default()
    };
    let (registry, buffer) = common::capturing_registry(settings);
    let logger = registry.get_logger("service").unwrap();
    init_tracing_bridge(logger).unwrap();

    tracing::info!(target: "http", status = 503, "upstream unavailable");
    tracing::debug!(target: "http", "filtered out at INFO");

    let lines = buffer.lines();
    assert_eq!(lines.len(), 1);
    let value: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["name"], "service");
    assert_eq!(value["level"], "INFO");
    assert_eq!(value["message"], "upstream unavailable status=503");
    assert_eq!(value["module"], "tracing_bridge");
}
