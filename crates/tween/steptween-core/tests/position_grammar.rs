use steptween_core::{Position, PositionContext, TimelineError};

fn ctx(previous_start: f64, previous_end: f64, total_duration: f64) -> PositionContext {
    PositionContext {
        previous_start,
        previous_end,
        previous_duration: previous_end - previous_start,
        total_duration,
    }
}

fn resolve(p: impl Into<Position>, ctx: &PositionContext) -> Result<f64, TimelineError> {
    p.into().resolve(ctx)
}

fn approx(a: f64, b: f64) {
    assert!((a - b).abs() <= 1e-12, "left={a} right={b}");
}

#[test]
fn non_negative_numbers_are_returned_as_is() {
    let c = ctx(1.0, 3.0, 7.0);
    for p in [0.0, 0.25, 3.0, 12.5, 1e6] {
        assert_eq!(resolve(p, &c).unwrap(), p);
    }
    assert_eq!(resolve("3", &c).unwrap(), 3.0);
    assert_eq!(resolve("0.5", &c).unwrap(), 0.5);
}

#[test]
fn absent_and_empty_append_at_end() {
    let c = ctx(1.0, 3.0, 7.0);
    assert_eq!(resolve(Position::Append, &c).unwrap(), 7.0);
    assert_eq!(resolve("", &c).unwrap(), 7.0);
    assert_eq!(resolve(None::<f64>, &c).unwrap(), 7.0);
}

#[test]
fn bare_anchors() {
    let c = ctx(2.0, 6.0, 10.0);
    assert_eq!(resolve("<", &c).unwrap(), 2.0);
    assert_eq!(resolve(">", &c).unwrap(), 6.0);
}

#[test]
fn anchored_offsets() {
    let c = ctx(2.0, 6.0, 10.0);
    // percentage of the previous duration (4)
    approx(resolve("<50%", &c).unwrap(), 4.0);
    approx(resolve(">-25%", &c).unwrap(), 5.0);
    approx(resolve("<1.5", &c).unwrap(), 3.5);
    approx(resolve(">-6", &c).unwrap(), 0.0);
    approx(resolve("<+1", &c).unwrap(), 3.0);
}

#[test]
fn total_relative_offsets() {
    approx(resolve("+=2", &ctx(0.0, 5.0, 5.0)).unwrap(), 7.0);
    approx(resolve("-=50%", &ctx(0.0, 10.0, 10.0)).unwrap(), 5.0);
    approx(resolve("+=10%", &ctx(0.0, 10.0, 10.0)).unwrap(), 11.0);
    approx(resolve("-=1", &ctx(0.0, 10.0, 10.0)).unwrap(), 9.0);
}

#[test]
fn plain_percentage_scales_by_total() {
    approx(resolve("40%", &ctx(0.0, 5.0, 5.0)).unwrap(), 2.0);
    approx(resolve("100%", &ctx(0.0, 5.0, 5.0)).unwrap(), 5.0);
}

#[test]
fn negative_results_fail() {
    let c = ctx(2.0, 6.0, 3.0);
    for bad in [
        Position::from(-1.0),
        Position::from("<-3"),
        Position::from(">-200%"),
        Position::from("-=4"),
        Position::from("-=150%"),
        Position::from("+=-1"),
        Position::from("-=-1"),
        Position::from("-2"),
        Position::from("-10%"),
    ] {
        let err = bad.resolve(&c).unwrap_err();
        assert!(
            matches!(err, TimelineError::InvalidPosition { .. }),
            "{bad:?} -> {err}"
        );
    }
}

#[test]
fn malformed_expressions_fail() {
    let c = ctx(2.0, 6.0, 10.0);
    for bad in ["abc", "<x", ">1s", "+=", "-=%", "5%%", "1e2", "=+2", "NaN"] {
        assert!(
            matches!(
                resolve(bad, &c),
                Err(TimelineError::InvalidPosition { ref expression, .. }) if expression == bad
            ),
            "{bad}"
        );
    }
    assert!(resolve(f64::NAN, &c).is_err());
    assert!(resolve(f64::INFINITY, &c).is_err());
}
