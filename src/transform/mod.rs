//! Frame conversions.
//!
//! - horizontal: legacy civil / legacy military / modern (`planimetric`)
//! - vertical: legacy levelling / modern levelling (`altimetric`)
//!
//! Both work in the legacy military coordinate space ("anchor" positions),
//! which is where the correction grids and the perimeter are defined.

pub mod altimetric;
pub mod planimetric;

pub use altimetric::*;
pub use planimetric::*;
