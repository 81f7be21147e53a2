//! Deterministic, pure logic for reconciliation.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! snapshots and desired sets and return plans suitable for tests.

pub mod ignore;
pub mod plan;
pub mod snapshot;
pub mod types;
