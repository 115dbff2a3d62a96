//! Domain types shared by the engine, the CLI and the batch pipeline.
//!
//! This module defines:
//!
//! - the caller-facing point (`Point3D`) and result (`TransformResult`)
//! - the closed frame sets (`PlanimetricFrame`, `AltimetricFrame`)
//! - the perimeter classification (`PerimeterZone`) and error field tags (`Field`)

pub mod types;

pub use types::*;
