//! Supported perimeter and the inside / fallback / reject policy.

pub mod policy;
pub mod polygon;

pub use policy::*;
pub use polygon::*;
