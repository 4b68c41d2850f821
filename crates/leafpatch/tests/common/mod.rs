//! Shared helpers for leafpatch integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use leafpatch::{Engine, Value};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness. Set `RUST_LOG=leafpatch=trace`
/// to see per-operation logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn instant(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .unwrap_or_else(|e| panic!("bad timestamp {s}: {e}"))
        .with_timezone(&Utc)
}

pub fn date(s: &str) -> Value {
    Value::leaf(instant(s))
}

pub fn engine() -> Engine {
    init_tracing();
    Engine::default()
}

pub fn json_of(engine: &Engine, value: &Value) -> serde_json::Value {
    engine.to_json(value).expect("value should encode")
}

/// Assert two trees are equal under leaf-aware equality, printing both on failure.
pub fn assert_tree_eq(engine: &Engine, actual: &Value, expected: &Value) {
    assert!(
        engine.equals(actual, expected).expect("comparable"),
        "trees differ:\n  actual:   {}\n  expected: {}",
        json_of(engine, actual),
        json_of(engine, expected),
    );
}
