//! `swiss-reframe` library crate.
//!
//! Converts coordinates between the Swiss legacy and modern reference frames:
//!
//! - planimetric: LV03 (civil or military origin) <-> LV95
//! - altimetric: LN02 <-> LHN95
//!
//! Corrections come from a versioned grid dataset (embedded by default) that
//! is loaded once and shared read-only. Positions outside the supported
//! perimeter are either translated with an explicit flag or rejected.
//!
//! The binary (`reframe`) is a thin wrapper around this library.

pub mod app;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod engine;
pub mod error;
pub mod grid;
pub mod io;
pub mod perimeter;
pub mod report;
pub mod transform;

pub use config::EngineConfig;
pub use domain::{AltimetricFrame, PerimeterZone, PlanimetricFrame, Point3D, TransformResult};
pub use engine::{Engine, compute_transform, load_grids};
pub use error::{DatasetError, ErrorCategory, TransformError};
