//! Domain-specific assertion macros for evalframe harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* record or score row broke an invariant.

use evalframe_core::{OutputBatch, RecordBatch};

// ---------------------------------------------------------------------------
// Record assertions
// ---------------------------------------------------------------------------

/// Assert that an output record has the expected status.
///
/// ```rust
/// assert_result!(output.records[1], RecordResult::ProcessingFailed);
/// ```
#[macro_export]
macro_rules! assert_result {
    ($record:expr, $expected:expr) => {{
        let record: &evalframe_core::OutputRecord = &$record;
        let expected: evalframe_core::RecordResult = $expected;
        if record.result != expected {
            panic!(
                "assert_result! failed for record {:?}:\n  expected: {}\n  actual:   {}",
                record.record_id, expected, record.result
            );
        }
    }};
}

/// Assert that an output record was partitioned under `dataset`.
///
/// ```rust
/// assert_dataset!(output.records[0], "chat");
/// ```
#[macro_export]
macro_rules! assert_dataset {
    ($record:expr, $dataset:expr) => {{
        let record: &evalframe_core::OutputRecord = &$record;
        let expected: &str = $dataset;
        match record.partition_keys() {
            Some(keys) if keys.dataset == expected => {}
            Some(keys) => panic!(
                "assert_dataset! failed for record {:?}:\n  expected: {:?}\n  actual:   {:?}",
                record.record_id, expected, keys.dataset
            ),
            None => panic!(
                "assert_dataset! failed: record {:?} has no partition keys (result {})",
                record.record_id, record.result
            ),
        }
    }};
}

// ---------------------------------------------------------------------------
// Batch invariants
// ---------------------------------------------------------------------------

/// Output must have one record per input record, with ids in input order.
pub fn assert_order_preserved(input: &RecordBatch, output: &OutputBatch) {
    assert_eq!(
        input.records.len(),
        output.records.len(),
        "output batch must have one record per input record"
    );
    for (i, (inp, out)) in input.records.iter().zip(&output.records).enumerate() {
        assert_eq!(
            inp.record_id, out.record_id,
            "record id mismatch at position {i}"
        );
    }
}

/// No flattened key may contain a dash.
pub fn assert_dash_free_keys(document: &serde_json::Map<String, serde_json::Value>) {
    if let Some(key) = document.keys().find(|k| k.contains('-')) {
        panic!("flattened key {key:?} still contains a dash");
    }
}
