//! evalframe-core — record normalization, RAG evaluation, and threshold gating.
//!
//! This crate holds the three request/response handlers plus the shared types
//! and collaborator traits they are built on.
//!
//! # Architecture
//!
//! ```text
//! telemetry records ──► normalizer ──► partitioned storage
//!
//! ground truth ──┐
//! parameters ────┼──► evaluation ──► score rows ──► threshold ──► Yes / No
//! evaluator ─────┘        │
//!                         └──► observability (invocation logs)
//! ```
//!
//! Every handler runs synchronously on the calling thread. Collaborators
//! (parameter store, blob store, evaluator, log sink, clock) are passed in
//! explicitly so tests can substitute the in-memory fakes defined here.

pub mod clock;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod ground_truth;
pub mod normalizer;
pub mod observability;
pub mod store;
pub mod threshold;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{EvalError, RecordError, StoreError};
pub use types::{
    InputRecord, OutputBatch, OutputRecord, PartitionKeys, RecordBatch, RecordMetadata,
    RecordResult,
};
