use std::fs;
use std::sync::Arc;
use std::thread;

use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swiss_reframe::dataset::{DatasetSource, decode, encode, synthetic};
use swiss_reframe::domain::Field;
use swiss_reframe::grid::interpolate_clamped;
use swiss_reframe::{
    AltimetricFrame, DatasetError, Engine, EngineConfig, ErrorCategory, PerimeterZone, PlanimetricFrame, Point3D,
    TransformError,
};

fn embedded_engine() -> Engine {
    Engine::new(EngineConfig::default())
}

fn to_modern(engine: &Engine, point: Point3D) -> Result<swiss_reframe::TransformResult, TransformError> {
    engine.compute_transform(
        point,
        PlanimetricFrame::LegacyMilitary,
        PlanimetricFrame::Modern,
        AltimetricFrame::LegacyLeveling,
        AltimetricFrame::ModernLeveling,
    )
}

#[test]
fn client_scenario_inside_perimeter() {
    let result = to_modern(&embedded_engine(), Point3D::new(600_100.0, 200_100.0, 500.0)).unwrap();

    assert!(result.inside_perimeter);
    assert_eq!(result.zone, PerimeterZone::Inside);
    // Translation plus a shift of well under a few metres.
    assert!((result.point.easting - 2_600_100.0).abs() < 3.0);
    assert!((result.point.northing - 1_200_100.0).abs() < 3.0);
    assert!((result.point.height - 500.0).abs() < 1.0);
}

#[test]
fn embedded_asset_matches_generator() {
    let generated = synthetic::build().unwrap();
    let embedded = DatasetSource::Embedded.load().unwrap();

    assert_eq!(embedded.metadata, generated.metadata);
    assert_eq!(embedded.perimeter, generated.perimeter);
    assert_eq!(embedded.planimetric.geometry(), generated.planimetric.geometry());
    assert_eq!(embedded.altimetric.geometry(), generated.altimetric.geometry());
    assert!(embedded.checksum.is_some());

    let plan = embedded.planimetric.values().iter().zip(generated.planimetric.values());
    for (a, b) in plan {
        assert!((a - b).norm() < 1e-6);
    }
    let alt = embedded.altimetric.values().iter().zip(generated.altimetric.values());
    for (a, b) in alt {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn round_trip_inside_perimeter() {
    let engine = embedded_engine();
    let dataset = engine.load_grids().unwrap();
    let (min, max) = dataset.perimeter.bounding_box();
    let mut rng = StdRng::seed_from_u64(0x5EED);

    let mut checked = 0;
    while checked < 200 {
        let e = rng.gen_range(min.x..max.x);
        let n = rng.gen_range(min.y..max.y);
        if !dataset.perimeter.contains(Point2::new(e, n)) {
            continue;
        }
        let h = rng.gen_range(200.0..4_500.0);
        let start = Point3D::new(e, n, h);

        let modern = to_modern(&engine, start).unwrap();
        assert!(modern.inside_perimeter);
        let back = engine
            .compute_transform(
                modern.point,
                PlanimetricFrame::Modern,
                PlanimetricFrame::LegacyMilitary,
                AltimetricFrame::ModernLeveling,
                AltimetricFrame::LegacyLeveling,
            )
            .unwrap();

        assert!((back.point.easting - e).abs() < 1e-6, "easting {e} -> {}", back.point.easting);
        assert!((back.point.northing - n).abs() < 1e-6, "northing {n} -> {}", back.point.northing);
        assert!((back.point.height - h).abs() < 1e-6, "height {h} -> {}", back.point.height);
        checked += 1;
    }
}

#[test]
fn civil_round_trip_returns_to_input() {
    let engine = embedded_engine();
    let dataset = engine.load_grids().unwrap();
    let (min, max) = dataset.perimeter.bounding_box();
    let mut rng = StdRng::seed_from_u64(0xC1F1);

    let mut checked = 0;
    while checked < 100 {
        let e = rng.gen_range(min.x..max.x);
        let n = rng.gen_range(min.y..max.y);
        if !dataset.perimeter.contains(Point2::new(e, n)) {
            continue;
        }
        let h = rng.gen_range(200.0..4_500.0);
        let start = Point3D::new(e - 600_000.0, n - 200_000.0, h);

        let modern = engine
            .compute_transform(
                start,
                PlanimetricFrame::LegacyCivilian,
                PlanimetricFrame::Modern,
                AltimetricFrame::LegacyLeveling,
                AltimetricFrame::ModernLeveling,
            )
            .unwrap();
        assert!(modern.inside_perimeter);
        let back = engine
            .compute_transform(
                modern.point,
                PlanimetricFrame::Modern,
                PlanimetricFrame::LegacyCivilian,
                AltimetricFrame::ModernLeveling,
                AltimetricFrame::LegacyLeveling,
            )
            .unwrap();

        assert!(back.inside_perimeter);
        assert!((back.point.easting - start.easting).abs() < 1e-6, "easting {} -> {}", start.easting, back.point.easting);
        assert!((back.point.northing - start.northing).abs() < 1e-6, "northing {} -> {}", start.northing, back.point.northing);
        assert!((back.point.height - h).abs() < 1e-6, "height {h} -> {}", back.point.height);
        checked += 1;
    }
}

#[test]
fn civil_and_military_agree() {
    let engine = embedded_engine();
    let military = to_modern(&engine, Point3D::new(612_000.0, 187_500.0, 800.0)).unwrap();
    let civil = engine
        .compute_transform(
            Point3D::new(12_000.0, -12_500.0, 800.0),
            PlanimetricFrame::LegacyCivilian,
            PlanimetricFrame::Modern,
            AltimetricFrame::LegacyLeveling,
            AltimetricFrame::ModernLeveling,
        )
        .unwrap();
    assert_eq!(military, civil);
}

#[test]
fn fallback_zone_translates_and_flags() {
    let engine = embedded_engine();
    let dataset = engine.load_grids().unwrap();
    let input = Point3D::new(450_000.0, 150_000.0, 600.0);

    let result = engine
        .compute_transform(
            input,
            PlanimetricFrame::LegacyMilitary,
            PlanimetricFrame::Modern,
            AltimetricFrame::LegacyLeveling,
            AltimetricFrame::LegacyLeveling,
        )
        .unwrap();
    assert!(!result.inside_perimeter);
    assert_eq!(result.zone, PerimeterZone::Fallback);

    let edge_shift = interpolate_clamped(&dataset.planimetric, input_planar(&input)).unwrap();
    let expected = input_planar(&input) + dataset.metadata.translation + edge_shift;
    assert!((result.point.easting - expected.x).abs() < 1e-9);
    assert!((result.point.northing - expected.y).abs() < 1e-9);
    assert_eq!(result.point.height, 600.0);

    // Asking for the height as well fails on the height field.
    match to_modern(&engine, input) {
        Err(TransformError::OutOfRange { field, value, zone }) => {
            assert_eq!(field, Field::Height);
            assert_eq!(value, 600.0);
            assert_eq!(zone, PerimeterZone::Fallback);
        }
        other => panic!("expected height range error, got {other:?}"),
    }
}

fn input_planar(p: &Point3D) -> Point2<f64> {
    Point2::new(p.easting, p.northing)
}

#[test]
fn far_positions_are_rejected() {
    let engine = embedded_engine();
    let err = to_modern(&engine, Point3D::new(100_000.0, 100_000.0, 500.0)).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Range);
    assert_eq!(err.zone(), Some(PerimeterZone::Rejected));

    let err = engine
        .compute_transform(
            Point3D::new(900_000.0, 200_000.0, 500.0),
            PlanimetricFrame::LegacyMilitary,
            PlanimetricFrame::LegacyMilitary,
            AltimetricFrame::LegacyLeveling,
            AltimetricFrame::LegacyLeveling,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        TransformError::OutOfRange {
            field: Field::Easting,
            zone: PerimeterZone::Rejected,
            ..
        }
    ));
}

#[test]
fn missing_dataset_fails_every_call() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::default().with_dataset_path(dir.path().join("absent.rfg"));
    let engine = Engine::new(config);

    for point in [
        Point3D::new(600_100.0, 200_100.0, 500.0),
        Point3D::new(100_000.0, 100_000.0, 500.0),
    ] {
        let err = to_modern(&engine, point).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Dataset);
        assert!(matches!(err, TransformError::DatasetUnavailable(DatasetError::Missing(_))));
    }
    assert!(!engine.cache().is_loaded());
}

#[test]
fn corrupt_dataset_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.rfg");
    let mut bytes = encode(&synthetic::build().unwrap());
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x40;
    fs::write(&path, &bytes).unwrap();

    let engine = Engine::new(EngineConfig::default().with_dataset_path(&path));
    let err = to_modern(&engine, Point3D::new(600_100.0, 200_100.0, 500.0)).unwrap_err();
    assert!(matches!(err, TransformError::DatasetUnavailable(DatasetError::ChecksumMismatch)));
    assert!(matches!(decode(&bytes), Err(DatasetError::ChecksumMismatch)));
}

#[test]
fn concurrent_calls_share_one_load() {
    let engine = Arc::new(embedded_engine());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let offset = i as f64 * 1_000.0;
                to_modern(&engine, Point3D::new(600_000.0 + offset, 200_000.0, 500.0)).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().inside_perimeter);
    }
    assert_eq!(engine.cache().load_count(), 1);
}
