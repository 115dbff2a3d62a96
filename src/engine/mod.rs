//! Transformation engine.
//!
//! An `Engine` owns a configuration and a lazily loaded dataset. All calls are
//! synchronous and touch only the shared read-only dataset, so one engine can
//! serve any number of threads. `compute_transform` at the crate root uses a
//! process-wide engine configured from the environment (`default`).

use std::sync::Arc;

use nalgebra::Point2;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::dataset::{Dataset, DatasetCache};
use crate::domain::{AltimetricFrame, PerimeterZone, PlanimetricFrame, Point3D, TransformResult};
use crate::error::TransformError;
use crate::perimeter::PerimeterPolicy;
use crate::transform::{
    PlanimetricOutcome, ShiftModel, applied_translation, transform_altimetric, transform_planimetric,
};

pub mod default;

pub use default::{compute_transform, default_engine, load_grids};

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    cache: DatasetCache,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let cache = DatasetCache::new(config.dataset.clone());
        Self { config, cache }
    }

    /// Engine over an in-memory dataset; the configured source is never read.
    pub fn with_dataset(config: EngineConfig, dataset: Dataset) -> Self {
        Self {
            config,
            cache: DatasetCache::preloaded(dataset),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Load (once) and return the correction dataset.
    pub fn load_grids(&self) -> Result<Arc<Dataset>, TransformError> {
        Ok(self.cache.get_or_load()?)
    }

    /// Fallback band in metres: the configured override, else the dataset value.
    pub fn fallback_tolerance(&self, dataset: &Dataset) -> f64 {
        self.config
            .fallback_tolerance
            .unwrap_or(dataset.metadata.fallback_tolerance)
    }

    /// Transform a 3-D point between frames.
    ///
    /// The dataset is loaded before any range check, so a broken installation
    /// always surfaces as `DatasetUnavailable`.
    pub fn compute_transform(
        &self,
        point: Point3D,
        source_planimetric: PlanimetricFrame,
        target_planimetric: PlanimetricFrame,
        source_altimetric: AltimetricFrame,
        target_altimetric: AltimetricFrame,
    ) -> Result<TransformResult, TransformError> {
        let dataset = self.load_grids()?;
        let model = ShiftModel::from_dataset(&dataset);
        let policy = PerimeterPolicy::new(&dataset.perimeter, self.fallback_tolerance(&dataset));

        let planimetric = transform_planimetric(
            &model,
            &policy,
            &point,
            source_planimetric,
            target_planimetric,
            self.config.inverse,
        )?;
        let height = transform_altimetric(
            &dataset.altimetric,
            &policy,
            point.height,
            planimetric.anchor,
            source_altimetric,
            target_altimetric,
        )?;

        if planimetric.zone == PerimeterZone::Fallback {
            if let Some(applied) = applied_translation(model.translation(), source_planimetric, target_planimetric) {
                warn!(
                    easting = point.easting,
                    northing = point.northing,
                    translation_e = applied.x,
                    translation_n = applied.y,
                    "position outside the perimeter: nearest-edge correction and translation applied"
                );
            }
        }

        let result = TransformResult::new(Point3D::from_planar(planimetric.position, height), planimetric.zone);
        debug!(
            from = source_planimetric.display_name(),
            to = target_planimetric.display_name(),
            from_h = source_altimetric.display_name(),
            to_h = target_altimetric.display_name(),
            inside = result.inside_perimeter,
            "transformed E {:.3} / N {:.3} / H {:.3} -> E {:.3} / N {:.3} / H {:.3}",
            point.easting,
            point.northing,
            point.height,
            result.point.easting,
            result.point.northing,
            result.point.height
        );
        Ok(result)
    }

    /// Horizontal conversion only; returns the converted position and the
    /// inside-perimeter flag.
    pub fn transform_planimetric(
        &self,
        position: Point2<f64>,
        source: PlanimetricFrame,
        target: PlanimetricFrame,
    ) -> Result<(Point2<f64>, bool), TransformError> {
        let outcome = self.planimetric_outcome(position, source, target)?;
        Ok((outcome.position, outcome.inside_perimeter()))
    }

    /// Height conversion at a horizontal position given in `position_frame`.
    pub fn transform_altimetric(
        &self,
        height: f64,
        position: Point2<f64>,
        position_frame: PlanimetricFrame,
        source: AltimetricFrame,
        target: AltimetricFrame,
    ) -> Result<f64, TransformError> {
        let dataset = self.load_grids()?;
        let policy = PerimeterPolicy::new(&dataset.perimeter, self.fallback_tolerance(&dataset));
        let anchor = self
            .planimetric_outcome(position, position_frame, PlanimetricFrame::LegacyMilitary)?
            .anchor;
        transform_altimetric(&dataset.altimetric, &policy, height, anchor, source, target)
    }

    fn planimetric_outcome(
        &self,
        position: Point2<f64>,
        source: PlanimetricFrame,
        target: PlanimetricFrame,
    ) -> Result<PlanimetricOutcome, TransformError> {
        let dataset = self.load_grids()?;
        let model = ShiftModel::from_dataset(&dataset);
        let policy = PerimeterPolicy::new(&dataset.perimeter, self.fallback_tolerance(&dataset));
        let input = Point3D::from_planar(position, 0.0);
        transform_planimetric(&model, &policy, &input, source, target, self.config.inverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::synthetic;
    use crate::domain::Field;
    use crate::error::ErrorCategory;

    fn engine() -> Engine {
        Engine::with_dataset(EngineConfig::default(), synthetic::build().unwrap())
    }

    #[test]
    fn sample_client_point_is_inside() {
        let result = engine()
            .compute_transform(
                Point3D::new(600_100.0, 200_100.0, 500.0),
                PlanimetricFrame::LegacyMilitary,
                PlanimetricFrame::Modern,
                AltimetricFrame::LegacyLeveling,
                AltimetricFrame::ModernLeveling,
            )
            .unwrap();
        assert!(result.inside_perimeter);
        assert!((result.point.easting - 2_600_100.0).abs() < 2.0);
        assert!((result.point.northing - 1_200_100.0).abs() < 2.0);
        assert!((result.point.height - 500.0).abs() < 1.0);
        assert_ne!(result.point.height, 500.0);
    }

    #[test]
    fn fallback_translates_plan_but_rejects_height() {
        let e = engine();
        let point = Point3D::new(860_000.0, 200_000.0, 800.0);

        let plan_only = e
            .compute_transform(
                point,
                PlanimetricFrame::LegacyMilitary,
                PlanimetricFrame::Modern,
                AltimetricFrame::LegacyLeveling,
                AltimetricFrame::LegacyLeveling,
            )
            .unwrap();
        assert!(!plan_only.inside_perimeter);
        assert_eq!(plan_only.zone, PerimeterZone::Fallback);
        assert_eq!(plan_only.point.height, 800.0);

        let err = e
            .compute_transform(
                point,
                PlanimetricFrame::LegacyMilitary,
                PlanimetricFrame::Modern,
                AltimetricFrame::LegacyLeveling,
                AltimetricFrame::ModernLeveling,
            )
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Range);
        assert_eq!(err.zone(), Some(PerimeterZone::Fallback));
        assert!(matches!(err, TransformError::OutOfRange { field: Field::Height, .. }));
    }

    #[test]
    fn tolerance_override_changes_zone() {
        let config = EngineConfig::default().with_fallback_tolerance(1_000.0).unwrap();
        let e = Engine::with_dataset(config, synthetic::build().unwrap());
        let err = e
            .transform_planimetric(
                Point2::new(860_000.0, 200_000.0),
                PlanimetricFrame::LegacyMilitary,
                PlanimetricFrame::Modern,
            )
            .unwrap_err();
        assert_eq!(err.zone(), Some(PerimeterZone::Rejected));
    }

    #[test]
    fn altimetric_accepts_modern_positions() {
        let e = engine();
        let legacy = Point2::new(650_000.0, 180_000.0);
        let (modern, inside) = e
            .transform_planimetric(legacy, PlanimetricFrame::LegacyMilitary, PlanimetricFrame::Modern)
            .unwrap();
        assert!(inside);

        let via_legacy = e
            .transform_altimetric(
                400.0,
                legacy,
                PlanimetricFrame::LegacyMilitary,
                AltimetricFrame::LegacyLeveling,
                AltimetricFrame::ModernLeveling,
            )
            .unwrap();
        let via_modern = e
            .transform_altimetric(
                400.0,
                modern,
                PlanimetricFrame::Modern,
                AltimetricFrame::LegacyLeveling,
                AltimetricFrame::ModernLeveling,
            )
            .unwrap();
        assert!((via_legacy - via_modern).abs() < 1e-9);
    }
}
