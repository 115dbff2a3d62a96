use swiss_reframe::{
    AltimetricFrame, DatasetError, ErrorCategory, PlanimetricFrame, Point3D, TransformError, compute_transform,
    load_grids,
};

#[test]
fn invalid_environment_fails_every_call() {
    // Single test: the environment is read once per process.
    unsafe {
        std::env::set_var("REFRAME_DATASET", "/nonexistent/reframe.rfg");
        std::env::set_var("REFRAME_FALLBACK_TOLERANCE", "wide");
    }

    for _ in 0..2 {
        let err = compute_transform(
            Point3D::new(600_100.0, 200_100.0, 500.0),
            PlanimetricFrame::LegacyMilitary,
            PlanimetricFrame::Modern,
            AltimetricFrame::LegacyLeveling,
            AltimetricFrame::ModernLeveling,
        )
        .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Dataset);
        match err {
            TransformError::DatasetUnavailable(DatasetError::Invalid(message)) => {
                assert!(message.contains("REFRAME_FALLBACK_TOLERANCE"), "{message}");
            }
            other => panic!("expected a configuration failure, got {other:?}"),
        }
    }

    let err = load_grids().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Dataset);
}
