//! Process-wide engine behind the free functions.
//!
//! The environment is read once. An invalid configuration is kept and
//! reported by every call; it is never replaced by defaults, since that would
//! silently transform against a dataset the caller did not ask for.

use std::sync::{Arc, OnceLock};

use tracing::error;

use crate::config::EngineConfig;
use crate::dataset::Dataset;
use crate::domain::{AltimetricFrame, PlanimetricFrame, Point3D, TransformResult};
use crate::error::{DatasetError, TransformError};

use super::Engine;

static DEFAULT_ENGINE: OnceLock<Result<Engine, String>> = OnceLock::new();

/// Engine configured from the environment on first use.
///
/// Fails with `DatasetUnavailable` on every call when the environment holds
/// an invalid configuration.
pub fn default_engine() -> Result<&'static Engine, TransformError> {
    let slot = DEFAULT_ENGINE.get_or_init(|| match EngineConfig::from_env() {
        Ok(config) => Ok(Engine::new(config)),
        Err(err) => {
            error!("{}", err.message());
            Err(err.message().to_string())
        }
    });
    slot.as_ref()
        .map_err(|message| TransformError::DatasetUnavailable(DatasetError::Invalid(message.clone())))
}

/// Transform a point with the process-wide engine.
pub fn compute_transform(
    point: Point3D,
    source_planimetric: PlanimetricFrame,
    target_planimetric: PlanimetricFrame,
    source_altimetric: AltimetricFrame,
    target_altimetric: AltimetricFrame,
) -> Result<TransformResult, TransformError> {
    default_engine()?.compute_transform(
        point,
        source_planimetric,
        target_planimetric,
        source_altimetric,
        target_altimetric,
    )
}

/// Load the process-wide dataset ahead of the first transformation.
pub fn load_grids() -> Result<Arc<Dataset>, TransformError> {
    default_engine()?.load_grids()
}
