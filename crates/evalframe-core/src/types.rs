//! Record envelopes for the stream transform.
//!
//! This module defines the wire shapes exchanged with the delivery stream: the
//! incoming [`RecordBatch`], the outgoing [`OutputBatch`], the per-record
//! [`RecordResult`] status, and the [`PartitionKeys`] attached as routing
//! metadata.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A batch of encoded records handed to the transform.
///
/// Fields other than `records` (invocation id, stream ARN, region) are
/// accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBatch {
    pub records: Vec<InputRecord>,
}

/// One incoming record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    /// Opaque identifier, echoed back unchanged.
    pub record_id: String,
    /// Base64-encoded UTF-8 JSON payload.
    pub data: String,
}

/// The transformed batch, one [`OutputRecord`] per input record in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBatch {
    pub records: Vec<OutputRecord>,
}

impl OutputBatch {
    /// Number of records that carry the given status.
    pub fn count(&self, result: RecordResult) -> usize {
        self.records.iter().filter(|r| r.result == result).count()
    }
}

/// One transformed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub record_id: String,
    pub result: RecordResult,
    /// Base64-encoded payload. For `ProcessingFailed` records this is the
    /// original, untransformed input payload.
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecordMetadata>,
}

impl OutputRecord {
    /// A record the transform could not handle. The original payload is
    /// passed through so the stream can route it to its error output.
    pub fn failed(input: &InputRecord) -> Self {
        Self {
            record_id: input.record_id.clone(),
            result: RecordResult::ProcessingFailed,
            data: input.data.clone(),
            metadata: None,
        }
    }

    /// Partition keys for a successfully transformed record.
    pub fn partition_keys(&self) -> Option<&PartitionKeys> {
        self.metadata.as_ref().map(|m| &m.partition_keys)
    }
}

/// Per-record transform status as understood by the delivery stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordResult {
    Ok,
    Dropped,
    ProcessingFailed,
}

impl std::fmt::Display for RecordResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordResult::Ok => write!(f, "Ok"),
            RecordResult::Dropped => write!(f, "Dropped"),
            RecordResult::ProcessingFailed => write!(f, "ProcessingFailed"),
        }
    }
}

/// Routing metadata attached to every successfully transformed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub partition_keys: PartitionKeys,
}

/// Storage partition for a transformed record.
///
/// `dataset` comes from the record's declared call type; the time components
/// come from the moment the record was processed, never from the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKeys {
    pub dataset: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl PartitionKeys {
    pub fn new(dataset: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            dataset: dataset.into(),
            year: at.year(),
            month: at.month(),
            day: at.day(),
            hour: at.hour(),
        }
    }
}
