use serde_json::json;
use steptween_core::{
    Ease, Position, TargetHandle, Timeline, TimelineConfig, TimelineError, TweenVars,
};
use steptween_test_fixtures::SimWorld;

fn setup(cfg: TimelineConfig) -> (Timeline<SimWorld>, TargetHandle, TargetHandle) {
    let mut world = SimWorld::new();
    let a = world.spawn("A");
    let b = world.spawn("B");
    (Timeline::new(world, cfg).unwrap(), a, b)
}

fn angle(duration: f64) -> TweenVars {
    TweenVars::new().angle(1.0).duration(duration)
}

#[test]
fn overlapping_windows_on_one_target_fail() {
    let (mut tl, a, _) = setup(TimelineConfig::default());
    tl.to_at(a, angle(2.0), 0.0).unwrap();
    let err = tl.to_at(a, angle(2.0), 1.0).err().unwrap();
    match err {
        TimelineError::Overlap {
            start,
            end,
            other_start,
            other_end,
            ..
        } => {
            assert_eq!((start, end), (1.0, 3.0));
            assert_eq!((other_start, other_end), (0.0, 2.0));
        }
        other => panic!("expected overlap, got {other}"),
    }
}

#[test]
fn touching_windows_do_not_conflict() {
    let (mut tl, a, _) = setup(TimelineConfig::default());
    tl.to_at(a, angle(2.0), 0.0).unwrap();
    tl.to_at(a, angle(1.0), 2.0).unwrap();
    assert_eq!(tl.events().len(), 2);
    assert_eq!(tl.duration(), 3.0);
}

#[test]
fn other_targets_may_overlap() {
    let (mut tl, a, b) = setup(TimelineConfig::default());
    tl.to_at(a, angle(2.0), 0.0).unwrap();
    tl.to_at(b, angle(2.0), "<").unwrap();
    assert_eq!(tl.events()[1].start, 0.0);
}

#[test]
fn retroactive_tween_is_checked_against_all_earlier_ones() {
    let (mut tl, a, b) = setup(TimelineConfig::default());
    tl.to_at(a, angle(1.0), 0.0).unwrap();
    tl.to_at(a, angle(1.0), 4.0).unwrap();
    tl.to_at(b, angle(1.0), 0.0).unwrap();
    // Fits the gap between the two tweens on `a`.
    tl.to_at(a, angle(1.0), 2.0).unwrap();
    assert!(matches!(
        tl.to_at(a, angle(1.0), 0.5),
        Err(TimelineError::Overlap { .. })
    ));
}

#[test]
fn resolver_tracks_the_previous_tween() {
    let (mut tl, a, b) = setup(TimelineConfig::default());
    tl.to(a, angle(2.0))
        .unwrap()
        .to_at(b, angle(1.0), "<50%")
        .unwrap()
        .to_at(a, angle(1.0), ">")
        .unwrap()
        .to_at(b, angle(1.0), "+=1")
        .unwrap();
    let spans: Vec<(f64, f64)> = tl.events().iter().map(|e| (e.start, e.end)).collect();
    assert_eq!(spans, vec![(0.0, 2.0), (1.0, 2.0), (2.0, 3.0), (4.0, 5.0)]);
}

#[test]
fn failed_registration_leaves_state_untouched() {
    let (mut tl, a, b) = setup(TimelineConfig::default());
    tl.to(a, angle(2.0)).unwrap();
    assert!(tl.to_at(b, angle(1.0), "<-1").is_err());
    assert!(tl.to(b, TweenVars::new().duration(-1.0)).is_err());
    // The cursor still points at the first tween.
    tl.to_at(b, angle(1.0), ">").unwrap();
    assert_eq!(tl.events()[1].start, 2.0);
}

#[test]
fn empty_parameters_are_rejected() {
    let (mut tl, a, _) = setup(TimelineConfig::default());
    let err = tl.to(a, TweenVars::new()).err().unwrap();
    assert!(matches!(err, TimelineError::Parameter { ref key, .. } if key == "vars"));
}

#[test]
fn defaults_alone_satisfy_the_key_check() {
    let (tl, a, _) = setup(TimelineConfig::default());
    let mut tl = tl.with_defaults(TweenVars::new().duration(0.5).ease(Ease::Linear));
    tl.to(a, TweenVars::new()).unwrap();
    let event = &tl.events()[0];
    assert_eq!(event.duration, 0.5);
    assert!(event.vars.targets.is_empty());
    assert!(matches!(event.vars.ease, Ease::Linear));
}

#[test]
fn json_parameters_and_positions() {
    let (mut tl, a, b) = setup(TimelineConfig::default());
    tl.to_json(a, &json!({ "position": [1, 2, 3], "duration": 2 }), &json!(null))
        .unwrap()
        .to_json(b, &json!({ "rotation": 0.5, "ease": null }), &json!(">-50%"))
        .unwrap();
    let second = &tl.events()[1];
    assert_eq!(second.start, 1.0);
    assert_eq!(second.vars.targets.rotation, Some(0.5));
    assert!(matches!(second.vars.ease, Ease::Linear));

    let err = tl
        .to_json(a, &json!({ "angle": 1 }), &json!(true))
        .err()
        .unwrap();
    assert!(matches!(err, TimelineError::InvalidPosition { .. }));
}

#[test]
fn unknown_json_key_is_an_error_outside_debug() {
    let (mut tl, a, _) = setup(TimelineConfig::default());
    let err = tl
        .to_json(a, &json!({ "angle": 1, "speed": 3 }), &json!(null))
        .err()
        .unwrap();
    assert!(matches!(err, TimelineError::Parameter { ref key, .. } if key == "speed"));
    assert!(tl.events().is_empty());
}

#[test]
fn unknown_json_key_is_ignored_in_debug() {
    let cfg = TimelineConfig {
        debug: true,
        ..Default::default()
    };
    let (mut tl, a, _) = setup(cfg);
    tl.to_json(a, &json!({ "angle": 1, "speed": 3 }), &json!(null))
        .unwrap();
    assert_eq!(tl.events()[0].vars.targets.angle, Some(1.0));

    // Unknown keys alone still leave nothing to animate.
    let err = tl
        .to_json(a, &json!({ "speed": 3 }), &json!(null))
        .err()
        .unwrap();
    assert!(matches!(err, TimelineError::Parameter { ref key, .. } if key == "vars"));
}

#[test]
fn json_defaults() {
    let (tl, a, _) = setup(TimelineConfig::default());
    let mut tl = tl
        .with_json_defaults(&json!({ "duration": 2, "ease": "easeOut" }))
        .unwrap();
    tl.to_at(a, TweenVars::new().angle(0.3), Position::Append)
        .unwrap();
    assert_eq!(tl.events()[0].end, 2.0);
    assert!(matches!(tl.events()[0].vars.ease, Ease::EaseOut));

    let (tl, _, _) = setup(TimelineConfig::default());
    assert!(tl.with_json_defaults(&json!({ "loop": true })).is_err());
}

#[test]
fn registration_does_not_touch_world_state() {
    let (mut tl, a, _) = setup(TimelineConfig::default());
    tl.to(a, TweenVars::new().position([1.0, 1.0, 1.0])).unwrap();
    assert_eq!(tl.world().steps(), 0);
    assert_eq!(tl.world().writes().count(), 0);
}
