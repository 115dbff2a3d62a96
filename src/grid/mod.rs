//! Regular correction grids and bilinear interpolation.
//!
//! - grid geometry and storage (`correction`)
//! - bilinear lookup, strict and edge-clamped (`interpolate`)

pub mod correction;
pub mod interpolate;

pub use correction::*;
pub use interpolate::*;
