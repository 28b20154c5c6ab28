//! Normalizer — flattens and deduplicates JSON telemetry records for
//! partitioned storage.
//!
//! Each record of a [`RecordBatch`] is decoded (base64 → UTF-8 → JSON),
//! [`flatten`]ed into a single-level mapping, [`deduplicate`]d, re-encoded, and
//! tagged with [`PartitionKeys`] derived from its call type and the time at
//! which it was processed.
//!
//! Records that cannot be decoded, or that lack a call type under
//! [`MissingDatasetPolicy::Fail`], are emitted as `ProcessingFailed` with their
//! original payload. A bad record never aborts the batch and never borrows
//! state from its neighbours.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value};

use crate::clock::{Clock, SystemClock};
use crate::config::{MissingDatasetPolicy, NormalizerConfig};
use crate::error::RecordError;
use crate::types::{
    InputRecord, OutputBatch, OutputRecord, PartitionKeys, RecordBatch, RecordMetadata,
    RecordResult,
};

/// The one key carried through [`flatten`] verbatim.
pub const CITATIONS_KEY: &str = "citations";

// ---------------------------------------------------------------------------
// Flatten
// ---------------------------------------------------------------------------

/// Flatten a nested document into a single-level mapping.
///
/// Object keys have `-` replaced by `_` and are joined to their parent path
/// with `_`; array elements append `[i]`. A `citations` key (after dash
/// replacement) is stored verbatim under `citations` at the top level, without
/// recursing into it. When two leaves produce the same path the later one
/// wins and the key keeps its first position.
///
/// ```
/// use evalframe_core::normalizer::flatten;
/// use serde_json::json;
///
/// let flat = flatten(&json!({"a-b": 1, "c": {"d": [true, null]}}));
/// assert_eq!(flat["a_b"], json!(1));
/// assert_eq!(flat["c_d[0]"], json!(true));
/// assert_eq!(flat["c_d[1]"], json!(null));
/// ```
pub fn flatten(document: &Value) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(document, String::new(), &mut flat);
    flat
}

fn flatten_into(value: &Value, path: String, flat: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = key.replace('-', "_");
                if key == CITATIONS_KEY {
                    flat.insert(key, child.clone());
                } else if path.is_empty() {
                    flatten_into(child, key, flat);
                } else {
                    flatten_into(child, format!("{path}_{key}"), flat);
                }
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(item, format!("{path}[{i}]"), flat);
            }
        }
        scalar => {
            flat.insert(path, scalar.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Deduplicate
// ---------------------------------------------------------------------------

/// Collapse structurally equal repeats, recursively.
///
/// Arrays keep the first occurrence of each distinct item (deep equality).
/// Objects are rebuilt through [`deduplicate_entries`]; their keys are
/// already unique, so only the values change. Scalars are returned as-is.
pub fn deduplicate(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(deduplicate_entries(map)),
        Value::Array(items) => {
            let mut unique: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                let item = deduplicate(item);
                if !unique.contains(&item) {
                    unique.push(item);
                }
            }
            Value::Array(unique)
        }
        scalar => scalar,
    }
}

/// Merge a sequence of key/value pairs that may repeat keys.
///
/// Values are deduplicated first. The first value seen for a key takes its
/// slot; a repeat is appended if the stored value is already an array, and
/// otherwise turns the slot into `[stored, repeat]`. Keys keep the order of
/// their first appearance.
///
/// ```
/// use evalframe_core::normalizer::deduplicate_entries;
/// use serde_json::json;
///
/// let merged = deduplicate_entries(vec![
///     ("k".to_string(), json!(1)),
///     ("j".to_string(), json!("x")),
///     ("k".to_string(), json!(2)),
///     ("k".to_string(), json!(3)),
/// ]);
/// assert_eq!(serde_json::Value::Object(merged), json!({"k": [1, 2, 3], "j": "x"}));
/// ```
pub fn deduplicate_entries<I>(entries: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut merged = Map::new();
    for (key, value) in entries {
        let value = deduplicate(value);
        match merged.get_mut(&key) {
            None => {
                merged.insert(key, value);
            }
            Some(Value::Array(stored)) => stored.push(value),
            Some(stored) => {
                let first = stored.take();
                *stored = Value::Array(vec![first, value]);
            }
        }
    }
    merged
}

// ---------------------------------------------------------------------------
// Batch processing
// ---------------------------------------------------------------------------

/// A payload that made it through decode, flatten and deduplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub document: Map<String, Value>,
    /// `document` serialized to JSON and base64-encoded.
    pub data: String,
}

/// Decode, flatten, deduplicate and re-encode one payload.
pub fn transform_payload(data: &str) -> Result<Transformed, RecordError> {
    let bytes = STANDARD.decode(data.trim())?;
    let text = String::from_utf8(bytes)?;
    let parsed: Value = serde_json::from_str(&text)?;

    let document = deduplicate_entries(flatten(&parsed));
    let encoded = STANDARD.encode(serde_json::to_vec(&document)?);

    Ok(Transformed {
        document,
        data: encoded,
    })
}

/// The stream transform: one output record per input record, in order.
#[derive(Debug, Clone)]
pub struct Normalizer<C = SystemClock> {
    settings: NormalizerConfig,
    clock: C,
}

impl Normalizer<SystemClock> {
    pub fn new(settings: NormalizerConfig) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> Normalizer<C> {
    pub fn with_clock(settings: NormalizerConfig, clock: C) -> Self {
        Self { settings, clock }
    }

    /// Transform every record of `batch`.
    ///
    /// Failures are per record: the output always has the same length and
    /// record-id order as the input.
    pub fn process_batch(&self, batch: &RecordBatch) -> OutputBatch {
        let records: Vec<OutputRecord> = batch
            .records
            .iter()
            .map(|record| match self.process_record(record) {
                Ok(output) => output,
                Err(e) => {
                    tracing::warn!(record_id = %record.record_id, error = %e, "record transform failed");
                    OutputRecord::failed(record)
                }
            })
            .collect();

        let output = OutputBatch { records };
        tracing::info!(
            ok = output.count(RecordResult::Ok),
            failed = output.count(RecordResult::ProcessingFailed),
            "processed {} records",
            output.records.len()
        );
        output
    }

    /// Transform a single record, stamping it with the current time.
    pub fn process_record(&self, record: &InputRecord) -> Result<OutputRecord, RecordError> {
        let transformed = transform_payload(&record.data)?;
        let dataset = self.dataset_for(&transformed.document)?;
        let partition_keys = PartitionKeys::new(dataset, self.clock.now());

        tracing::debug!(
            record_id = %record.record_id,
            dataset = %partition_keys.dataset,
            fields = transformed.document.len(),
            "record transformed"
        );

        Ok(OutputRecord {
            record_id: record.record_id.clone(),
            result: RecordResult::Ok,
            data: transformed.data,
            metadata: Some(RecordMetadata { partition_keys }),
        })
    }

    fn dataset_for(&self, document: &Map<String, Value>) -> Result<String, RecordError> {
        let field = &self.settings.call_type_field;
        match document.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Null) | None => match self.settings.missing_dataset {
                MissingDatasetPolicy::Fail => Err(RecordError::MissingField(field.clone())),
                MissingDatasetPolicy::Default => Ok(self.settings.default_dataset.clone()),
            },
            Some(other) => Ok(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
