//! Easing curves mapping normalized time in [0,1] to eased progress.
//!
//! Bezier curves with overshooting control points may leave [0,1]; the
//! others stay inside it.

use std::fmt;
use std::rc::Rc;

/// Newton iterations used to invert the Bezier x(t) parameterization.
const BEZIER_NEWTON_ITERATIONS: usize = 8;
/// Accept a parameter once |x(t) - x| drops below this.
const BEZIER_EPSILON: f64 = 1e-3;
/// Give up on Newton when the slope is flatter than this and keep the last iterate.
const BEZIER_MIN_SLOPE: f64 = 1e-3;

#[inline]
pub fn linear(t: f64) -> f64 {
    t
}

/// Cubic ease-in: t³
#[inline]
pub fn ease_in(t: f64) -> f64 {
    t * t * t
}

/// Cubic ease-out: (t-1)³ + 1
#[inline]
pub fn ease_out(t: f64) -> f64 {
    let u = t - 1.0;
    u * u * u + 1.0
}

/// Piecewise cubic, symmetric around t = 0.5.
#[inline]
pub fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        return 4.0 * t * t * t;
    }
    let u = 2.0 * t - 2.0;
    0.5 * u * u * u + 1.0
}

/// CSS-style cubic-bezier timing function with control points (p1x, p1y) and (p2x, p2y).
///
/// Solves x(s) = t for the curve parameter s with Newton's method, then returns y(s).
pub fn cubic_bezier(t: f64, p1x: f64, p1y: f64, p2x: f64, p2y: f64) -> f64 {
    let cx = 3.0 * p1x;
    let bx = 3.0 * (p2x - p1x) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * p1y;
    let by = 3.0 * (p2y - p1y) - cy;
    let ay = 1.0 - cy - by;

    let sample_x = |s: f64| ((ax * s + bx) * s + cx) * s;
    let sample_y = |s: f64| ((ay * s + by) * s + cy) * s;
    let slope_x = |s: f64| (3.0 * ax * s + 2.0 * bx) * s + cx;

    let mut s = t;
    for _ in 0..BEZIER_NEWTON_ITERATIONS {
        let err = sample_x(s) - t;
        if err.abs() < BEZIER_EPSILON {
            break;
        }
        let d = slope_x(s);
        if d.abs() < BEZIER_MIN_SLOPE {
            break;
        }
        s -= err / d;
    }
    sample_y(s)
}

/// Time-warp applied to an event's normalized progress.
#[derive(Clone, Default)]
pub enum Ease {
    /// Identity; also what an explicit "no ease" resolves to.
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    CubicBezier(f64, f64, f64, f64),
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl Ease {
    pub fn custom(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Ease::Custom(Rc::new(f))
    }

    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Ease::Linear => linear(t),
            Ease::EaseIn => ease_in(t),
            Ease::EaseOut => ease_out(t),
            Ease::EaseInOut => ease_in_out(t),
            Ease::CubicBezier(p1x, p1y, p2x, p2y) => cubic_bezier(t, *p1x, *p1y, *p2x, *p2y),
            Ease::Custom(f) => f(t),
        }
    }

    /// Name as accepted by the JSON parameter form.
    pub fn name(&self) -> &'static str {
        match self {
            Ease::Linear => "linear",
            Ease::EaseIn => "easeIn",
            Ease::EaseOut => "easeOut",
            Ease::EaseInOut => "easeInOut",
            Ease::CubicBezier(..) => "cubicBezier",
            Ease::Custom(_) => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(Ease::Linear),
            "easeIn" => Some(Ease::EaseIn),
            "easeOut" => Some(Ease::EaseOut),
            "easeInOut" => Some(Ease::EaseInOut),
            _ => None,
        }
    }
}

impl fmt::Debug for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ease::CubicBezier(a, b, c, d) => write!(f, "CubicBezier({a}, {b}, {c}, {d})"),
            Ease::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name()),
        }
    }
}
