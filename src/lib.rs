//! evalframe — record normalization, RAG evaluation, and threshold gating.
//!
//! This crate wires the handlers from [`evalframe_core`] to the adapters in
//! [`evalframe_stores`] and exposes one entry point per command in [`app`] so
//! that integration tests can drive them without spawning the binary.
//!
//! # Architecture
//!
//! ```text
//! stdin / --input ──► app::{transform, evaluate, check_thresholds} ──► stdout
//!                          │
//!                          ├──► evalframe-core   (handlers, traits)
//!                          └──► evalframe-stores (filesystem, scorer process)
//! ```
//!
//! Logs go to stderr; stdout only ever carries the handler's JSON response.

pub mod app;

pub use evalframe_core::*;
pub use evalframe_stores as stores;
