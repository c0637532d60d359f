//! Test to verify test infrastructure works correctly

mod common;

use common::builders::{MoveStepBuilder, ScriptBuilder};
use mousecontrol::config::PlaybackConfig;
use mousecontrol::{EasingKind, MouseButton, Point};

#[test]
fn test_infrastructure_setup() {
    // Test that builders work
    let step = MoveStepBuilder::new()
        .to(300, 40)
        .easing(EasingKind::EaseInOut)
        .build();

    assert_eq!(step.start, Point::new(0, 0));
    assert_eq!(step.end, Point::new(300, 40));
    assert_eq!(step.easing, EasingKind::EaseInOut);

    let script = ScriptBuilder::new("smoke")
        .move_to(5, 5, 16)
        .click(5, 5, MouseButton::Left, 0)
        .build();
    assert_eq!(script.len(), 2);
    assert!(script.resolve_all(&PlaybackConfig::default()).is_ok());
}

#[test]
fn test_float_comparison() {
    common::assert_float_eq(1.0, 1.0000001, 0.001);
}

#[test]
#[should_panic]
fn test_float_comparison_fails() {
    common::assert_float_eq(1.0, 2.0, 0.001);
}
