//! Engine configuration.
//!
//! Defaults work out of the box (embedded dataset, tolerance from the dataset
//! metadata). Deployments override them through the environment or a `.env`
//! file:
//!
//! - `REFRAME_DATASET`: path to a correction dataset file
//! - `REFRAME_FALLBACK_TOLERANCE`: fallback band in metres

use std::path::PathBuf;

use crate::dataset::DatasetSource;
use crate::error::AppError;
use crate::transform::InverseSettings;

pub const ENV_DATASET: &str = "REFRAME_DATASET";
pub const ENV_FALLBACK_TOLERANCE: &str = "REFRAME_FALLBACK_TOLERANCE";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    pub dataset: DatasetSource,
    /// Overrides the dataset's fallback tolerance when set.
    pub fallback_tolerance: Option<f64>,
    pub inverse: InverseSettings,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATASET).filter(|v| !v.trim().is_empty()) {
            config.dataset = DatasetSource::File(PathBuf::from(path.trim()));
        }

        if let Some(raw) = lookup(ENV_FALLBACK_TOLERANCE).filter(|v| !v.trim().is_empty()) {
            let tolerance = raw.trim().parse::<f64>().map_err(|e| {
                AppError::new(2, format!("Invalid {ENV_FALLBACK_TOLERANCE} '{raw}': {e}"))
            })?;
            config = config.with_fallback_tolerance(tolerance)?;
        }

        Ok(config)
    }

    pub fn with_dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset = DatasetSource::File(path.into());
        self
    }

    pub fn with_fallback_tolerance(mut self, tolerance: f64) -> Result<Self, AppError> {
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(AppError::new(
                2,
                format!("Fallback tolerance must be a finite value >= 0, got {tolerance}."),
            ));
        }
        self.fallback_tolerance = Some(tolerance);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_use_embedded_dataset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.dataset, DatasetSource::Embedded);
        assert_eq!(config.fallback_tolerance, None);
    }

    #[test]
    fn environment_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_DATASET, "/opt/reframe/chenyx.rfg"),
            (ENV_FALLBACK_TOLERANCE, " 2500 "),
        ]))
        .unwrap();
        assert_eq!(config.dataset, DatasetSource::File(PathBuf::from("/opt/reframe/chenyx.rfg")));
        assert_eq!(config.fallback_tolerance, Some(2500.0));
    }

    #[test]
    fn invalid_tolerance_is_a_config_error() {
        let err = EngineConfig::from_lookup(lookup(&[(ENV_FALLBACK_TOLERANCE, "wide")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = EngineConfig::from_lookup(lookup(&[(ENV_FALLBACK_TOLERANCE, "-1")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
