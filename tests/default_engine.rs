use std::sync::Arc;

use swiss_reframe::{AltimetricFrame, PlanimetricFrame, Point3D, compute_transform, load_grids};

#[test]
fn process_wide_engine_uses_embedded_dataset_by_default() {
    // Single test: the environment is read once per process.
    unsafe {
        std::env::remove_var("REFRAME_DATASET");
        std::env::remove_var("REFRAME_FALLBACK_TOLERANCE");
    }

    let first = load_grids().unwrap();
    let result = compute_transform(
        Point3D::new(600_100.0, 200_100.0, 500.0),
        PlanimetricFrame::LegacyMilitary,
        PlanimetricFrame::Modern,
        AltimetricFrame::LegacyLeveling,
        AltimetricFrame::ModernLeveling,
    )
    .unwrap();
    assert!(result.inside_perimeter);
    assert!((result.point.easting - 2_600_100.0).abs() < 3.0);
    assert!((result.point.northing - 1_200_100.0).abs() < 3.0);

    let second = load_grids().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}
