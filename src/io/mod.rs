//! Batch input/output.
//!
//! - point-list CSV ingest with row-level errors (`ingest`)
//! - result CSV export (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
