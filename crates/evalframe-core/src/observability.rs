//! Invocation logging for watched calls.
//!
//! [`watch`] runs a closure, times it, and hands an [`InvocationLog`] to a
//! [`LogSink`]. The log is a flat-ish JSON document carrying a `call_type`,
//! which is exactly the shape the normalizer partitions on downstream.

use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::Clock;

/// One watched call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationLog {
    pub call_type: String,
    pub event_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Destination for invocation logs. Emitting is fire-and-forget: a sink that
/// cannot deliver logs and carries on.
pub trait LogSink {
    fn emit(&self, log: &InvocationLog);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&self, _log: &InvocationLog) {}
}

/// Keeps every log in memory.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    logs: Mutex<Vec<InvocationLog>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logs(&self) -> Vec<InvocationLog> {
        self.logs.lock().map(|logs| logs.clone()).unwrap_or_default()
    }
}

impl LogSink for MemoryLogSink {
    fn emit(&self, log: &InvocationLog) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.push(log.clone());
        }
    }
}

/// Run `call`, then emit one log describing its input, outcome and duration.
///
/// The closure's result is returned untouched.
pub fn watch<I, T, E, F>(
    sink: &dyn LogSink,
    clock: &dyn Clock,
    call_type: &str,
    input: &I,
    call: F,
) -> Result<T, E>
where
    I: Serialize + ?Sized,
    T: Serialize,
    E: std::fmt::Display,
    F: FnOnce() -> Result<T, E>,
{
    let event_time = clock.now();
    let started = Instant::now();
    let result = call();
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (output, error) = match &result {
        Ok(value) => (Some(serde_json::to_value(value).unwrap_or(Value::Null)), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let log = InvocationLog {
        call_type: call_type.to_string(),
        event_time,
        duration_ms,
        input: serde_json::to_value(input).unwrap_or(Value::Null),
        output,
        error,
    };
    tracing::debug!(call_type, duration_ms, failed = log.error.is_some(), "watched call finished");
    sink.emit(&log);
    result
}
