//! Test builders — ergonomic constructors for records, batches, and stores.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use evalframe_core::config::{MissingDatasetPolicy, NormalizerConfig};
use evalframe_core::normalizer::Normalizer;
use evalframe_core::store::{MemoryBlobStore, MemoryParameterStore};
use evalframe_core::{FixedClock, InputRecord, RecordBatch};
use serde_json::Value;

use super::fixtures::{GROUND_TRUTH_CSV, THRESHOLDS_JSON};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Base64 of the JSON text of `value`, as the stream delivers it.
pub fn encode_json(value: &Value) -> String {
    STANDARD.encode(value.to_string())
}

/// Base64 of arbitrary text (for malformed payloads).
pub fn encode_text(text: &str) -> String {
    STANDARD.encode(text)
}

/// Decode an output record's payload back into JSON.
pub fn decode_json(data: &str) -> Value {
    let bytes = STANDARD.decode(data).expect("output payload must be base64");
    serde_json::from_slice(&bytes).expect("output payload must be JSON")
}

/// Fluent builder for [`RecordBatch`] fixtures. Record ids default to
/// `rec-0`, `rec-1`, … in insertion order.
///
/// # Example
///
/// ```rust
/// let batch = BatchBuilder::new()
///     .json(json!({"call_type": "chat"}))
///     .raw("{not json")
///     .build();
/// ```
#[derive(Default)]
pub struct BatchBuilder {
    records: Vec<InputRecord>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record carrying `value` as its payload.
    pub fn json(self, value: Value) -> Self {
        let data = encode_json(&value);
        self.data(data)
    }

    /// Append a record whose payload is `text`, verbatim.
    pub fn raw(self, text: &str) -> Self {
        let data = encode_text(text);
        self.data(data)
    }

    /// Append a record with an already-encoded payload.
    pub fn data(mut self, data: impl Into<String>) -> Self {
        let id = format!("rec-{}", self.records.len());
        self.records.push(InputRecord {
            record_id: id,
            data: data.into(),
        });
        self
    }

    pub fn build(self) -> RecordBatch {
        RecordBatch {
            records: self.records,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers and collaborators
// ---------------------------------------------------------------------------

/// The instant every fixed-clock test runs at.
pub fn test_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 42, 7).unwrap()
}

/// A normalizer frozen at [`test_instant`].
pub fn fixed_normalizer(policy: MissingDatasetPolicy) -> Normalizer<FixedClock> {
    let settings = NormalizerConfig {
        missing_dataset: policy,
        ..NormalizerConfig::default()
    };
    Normalizer::with_clock(settings, FixedClock(test_instant()))
}

/// Parameter store holding the ground-truth location and thresholds for
/// `kb-chat`.
pub fn seeded_parameters() -> MemoryParameterStore {
    MemoryParameterStore::new()
        .with(
            "/AppGenAIEvalThresholdMetrics/kb-chat/groundtruth",
            r#"{"bucket": "eval-data", "prefix": "kb-chat/"}"#,
        )
        .with("/AppGenAIEvalThresholdMetrics/kb-chat/threshold", THRESHOLDS_JSON)
}

/// Blob store holding [`GROUND_TRUTH_CSV`] where [`seeded_parameters`]
/// points.
pub fn seeded_blobs() -> MemoryBlobStore {
    MemoryBlobStore::new().with("eval-data", "kb-chat/ground_truth.csv", GROUND_TRUTH_CSV)
}

/// A JSON object literal as a score map.
pub fn scores(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().expect("scores must be a JSON object")
}
