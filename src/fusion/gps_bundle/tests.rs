//! Cluster assembly, restart and plausibility checks of the GPS bundle.
use super::*;
use crate::protocol::messages::n2k::GNSS_MODE_1D;

#[test]
fn test_state_transitions() {
    let state = BundleState::EMPTY;
    let Transition::Collecting(state) = state.next(GpsPart::CourseSpeed) else {
        panic!("expected collecting");
    };
    assert_eq!(state.mask(), 0b010);
    let Transition::Collecting(state) = state.next(GpsPart::Position) else {
        panic!("expected collecting");
    };
    assert_eq!(state.mask(), 0b011);
    assert_eq!(state.next(GpsPart::FixQuality), Transition::Complete);
    assert_eq!(
        state.next(GpsPart::Position),
        Transition::Restart(BundleState(0b001))
    );
}

#[test]
/// Position, course/speed then a 3D fix yields one accepted fix.
fn test_complete_bundle_is_accepted() {
    let mut bundle = GpsBundle::new();
    assert_eq!(bundle.position(476_442_500, -31_234_000), BundleEvent::Pending);
    assert_eq!(bundle.course_speed(1.2, 3.4), BundleEvent::Pending);
    let BundleEvent::Accepted(fix) = bundle.fix_quality(GNSS_MODE_3D, 0.9, 1.3) else {
        panic!("bundle should complete");
    };
    assert_eq!(fix.latitude, 476_442_500);
    assert_eq!(fix.longitude, -31_234_000);
    assert_eq!(fix.sog, 3.4);
    assert!(bundle.state().is_empty());
}

#[test]
/// A second position before completion restarts the cluster with only the
/// position part.
fn test_duplicate_part_restarts_bundle() {
    let mut bundle = GpsBundle::new();
    bundle.position(1, 1);
    bundle.course_speed(0.5, 1.0);
    assert_eq!(bundle.position(2, 2), BundleEvent::Restarted);
    assert_eq!(bundle.state().mask(), 0b001);
    assert!(!bundle.state().contains(GpsPart::CourseSpeed));

    // The stale course/speed is not reused: the cluster needs a new one.
    assert_eq!(bundle.fix_quality(GNSS_MODE_2D, 1.0, 1.0), BundleEvent::Pending);
    let BundleEvent::Accepted(fix) = bundle.course_speed(0.7, 2.0) else {
        panic!("bundle should complete");
    };
    assert_eq!(fix.latitude, 2);
    assert_eq!(fix.cog, 0.7);
}

#[test]
/// Complete bundles without a 2D/3D fix, or at 0/0, are dropped and the mask
/// is cleared anyway.
fn test_implausible_bundle_is_discarded() {
    let mut bundle = GpsBundle::new();
    bundle.position(10, 10);
    bundle.course_speed(0.0, 0.0);
    assert_eq!(
        bundle.fix_quality(GNSS_MODE_1D, 1.0, 1.0),
        BundleEvent::Discarded
    );
    assert!(bundle.state().is_empty());

    bundle.fix_quality(GNSS_MODE_3D, 1.0, 1.0);
    bundle.course_speed(0.0, 0.0);
    assert_eq!(bundle.position(0, 0), BundleEvent::Discarded);
    assert!(bundle.state().is_empty());
}

#[test]
/// Either coordinate being non-zero passes the null-position check.
fn test_fix_plausibility() {
    let fix = GpsFix {
        latitude: 0,
        longitude: 5,
        mode: GNSS_MODE_2D,
        ..Default::default()
    };
    assert!(fix.is_plausible());
    let on_meridian = GpsFix {
        latitude: 5,
        longitude: 0,
        ..fix
    };
    assert!(on_meridian.is_plausible());
    let null_island = GpsFix {
        latitude: 0,
        longitude: 0,
        ..fix
    };
    assert!(!null_island.is_plausible());
    let fix = GpsFix { mode: 3, ..fix };
    assert!(!fix.is_plausible());
}
