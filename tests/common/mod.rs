//! Shared test utilities for evalframe integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Everything here is deterministic: clocks are fixed and
//! stores are in memory unless a harness asks for a temp directory.

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod workspace;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use workspace::*;
