//! Per-tween parameters.
//!
//! A [`TweenVars`] is the typed form of the `{ position, rotation, angle,
//! duration, ease, delay, onStart, onUpdate, onEnd }` bag. Every field is optional;
//! the timeline merges it over its defaults, validates it, and fills in
//! duration/ease/delay before scheduling.
//!
//! JSON keys use the camelCase names above. Anything else is reported back as an
//! [`UnknownKey`] so the caller can decide whether it is fatal.

use std::fmt;
use std::rc::Rc;

use serde_json::Value as JsonValue;
use steptween_api_core::{Channel, TargetHandle, Value};

use crate::error::{Result, TimelineError};
use crate::interp::Ease;

/// Per-tween lifecycle hook. Receives the tween's target.
pub type TargetCallback = Rc<dyn Fn(TargetHandle)>;

pub const DEFAULT_DURATION: f64 = 1.0;
pub const DEFAULT_DELAY: f64 = 0.0;

/// Every key the parameter bag understands.
pub const RECOGNIZED_KEYS: [&str; 9] = [
    "position", "rotation", "angle", "duration", "ease", "delay", "onStart", "onUpdate", "onEnd",
];

/// A key in a JSON parameter bag that is not in [`RECOGNIZED_KEYS`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" is not a valid variable", self.0)
    }
}

#[derive(Clone, Default)]
pub struct TweenVars {
    pub position: Option<[f64; 3]>,
    pub rotation: Option<f64>,
    pub angle: Option<f64>,
    pub duration: Option<f64>,
    /// `Some(Ease::Linear)` is also how "explicitly no ease" is spelled.
    pub ease: Option<Ease>,
    pub delay: Option<f64>,
    pub on_start: Option<TargetCallback>,
    pub on_update: Option<TargetCallback>,
    pub on_end: Option<TargetCallback>,
}

impl TweenVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: [f64; 3]) -> Self {
        self.position = Some(position);
        self
    }

    pub fn rotation(mut self, heading: f64) -> Self {
        self.rotation = Some(heading);
        self
    }

    pub fn angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    pub fn delay(mut self, seconds: f64) -> Self {
        self.delay = Some(seconds);
        self
    }

    pub fn on_start(mut self, f: impl Fn(TargetHandle) + 'static) -> Self {
        self.on_start = Some(Rc::new(f));
        self
    }

    pub fn on_update(mut self, f: impl Fn(TargetHandle) + 'static) -> Self {
        self.on_update = Some(Rc::new(f));
        self
    }

    pub fn on_end(mut self, f: impl Fn(TargetHandle) + 'static) -> Self {
        self.on_end = Some(Rc::new(f));
        self
    }

    /// True when no recognized key is set.
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.rotation.is_none()
            && self.angle.is_none()
            && self.duration.is_none()
            && self.ease.is_none()
            && self.delay.is_none()
            && self.on_start.is_none()
            && self.on_update.is_none()
            && self.on_end.is_none()
    }

    /// Fields set on `self` win; unset fields fall back to `defaults`.
    pub fn merged_over(&self, defaults: &TweenVars) -> TweenVars {
        TweenVars {
            position: self.position.or(defaults.position),
            rotation: self.rotation.or(defaults.rotation),
            angle: self.angle.or(defaults.angle),
            duration: self.duration.or(defaults.duration),
            ease: self.ease.clone().or_else(|| defaults.ease.clone()),
            delay: self.delay.or(defaults.delay),
            on_start: self.on_start.clone().or_else(|| defaults.on_start.clone()),
            on_update: self.on_update.clone().or_else(|| defaults.on_update.clone()),
            on_end: self.on_end.clone().or_else(|| defaults.on_end.clone()),
        }
    }

    /// Range-check every present key.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(TimelineError::parameter(
                "vars",
                format!("must set at least one of {}", RECOGNIZED_KEYS.join(", ")),
            ));
        }
        if let Some(p) = self.position {
            if p.iter().any(|c| !c.is_finite()) {
                return Err(TimelineError::parameter("position", "values must be finite numbers"));
            }
        }
        if let Some(r) = self.rotation {
            finite("rotation", r)?;
        }
        if let Some(a) = self.angle {
            finite("angle", a)?;
        }
        if let Some(d) = self.duration {
            non_negative("duration", d)?;
        }
        if let Some(d) = self.delay {
            non_negative("delay", d)?;
        }
        if let Some(Ease::CubicBezier(a, b, c, d)) = &self.ease {
            if [a, b, c, d].iter().any(|v| !v.is_finite()) {
                return Err(TimelineError::parameter(
                    "ease",
                    "bezier control points must be finite numbers",
                ));
            }
        }
        Ok(())
    }

    /// Fill duration, ease and delay with their built-in defaults.
    pub fn completed(self) -> CompleteVars {
        CompleteVars {
            duration: self.duration.unwrap_or(DEFAULT_DURATION),
            ease: self.ease.unwrap_or_default(),
            delay: self.delay.unwrap_or(DEFAULT_DELAY),
            targets: ChannelValues {
                position: self.position,
                rotation: self.rotation,
                angle: self.angle,
            },
            callbacks: Callbacks {
                on_start: self.on_start,
                on_update: self.on_update,
                on_end: self.on_end,
            },
        }
    }

    /// Parse the dynamic JSON form of a parameter bag.
    ///
    /// Returns the typed vars and every unrecognized key (in key order).
    /// Callback keys are recognized but cannot be expressed in JSON.
    pub fn from_json(value: &JsonValue) -> Result<(TweenVars, Vec<UnknownKey>)> {
        let obj = value
            .as_object()
            .ok_or_else(|| TimelineError::parameter("vars", "must be a JSON object"))?;

        let mut vars = TweenVars::new();
        let mut unknown = Vec::new();
        for (key, v) in obj {
            match key.as_str() {
                "position" => vars.position = Some(json_vec3(v)?),
                "rotation" => vars.rotation = Some(json_number("rotation", v)?),
                "angle" => vars.angle = Some(json_number("angle", v)?),
                "duration" => vars.duration = Some(json_number("duration", v)?),
                "delay" => vars.delay = Some(json_number("delay", v)?),
                "ease" => vars.ease = Some(json_ease(v)?),
                "onStart" | "onUpdate" | "onEnd" => {
                    return Err(TimelineError::parameter(key, "must be a function"));
                }
                other => unknown.push(UnknownKey(other.to_string())),
            }
        }
        Ok((vars, unknown))
    }
}

impl fmt::Debug for TweenVars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenVars")
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("angle", &self.angle)
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("delay", &self.delay)
            .field("on_start", &self.on_start.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Destination value per channel; `None` means the channel is not animated.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChannelValues {
    pub position: Option<[f64; 3]>,
    pub rotation: Option<f64>,
    pub angle: Option<f64>,
}

impl ChannelValues {
    pub fn get(&self, channel: Channel) -> Option<Value> {
        match channel {
            Channel::Position => self.position.map(Value::Vec3),
            Channel::Rotation => self.rotation.map(Value::Scalar),
            Channel::Angle => self.angle.map(Value::Scalar),
        }
    }

    /// Store `value` under `channel`; values of the wrong kind are ignored.
    pub fn set(&mut self, channel: Channel, value: Value) {
        match (channel, value) {
            (Channel::Position, Value::Vec3(p)) => self.position = Some(p),
            (Channel::Rotation, Value::Scalar(h)) => self.rotation = Some(h),
            (Channel::Angle, Value::Scalar(a)) => self.angle = Some(a),
            _ => {}
        }
    }

    /// Animated channels in fixed order: position, rotation, angle.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL
            .into_iter()
            .filter(move |c| self.get(*c).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.angle.is_none()
    }
}

#[derive(Clone, Default)]
pub struct Callbacks {
    pub on_start: Option<TargetCallback>,
    pub on_update: Option<TargetCallback>,
    pub on_end: Option<TargetCallback>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_start", &self.on_start.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Validated vars with every timing field filled in.
#[derive(Clone, Debug)]
pub struct CompleteVars {
    pub duration: f64,
    pub ease: Ease,
    pub delay: f64,
    pub targets: ChannelValues,
    pub callbacks: Callbacks,
}

fn finite(key: &str, v: f64) -> Result<()> {
    if !v.is_finite() {
        return Err(TimelineError::parameter(key, "must be a finite number"));
    }
    Ok(())
}

fn non_negative(key: &str, v: f64) -> Result<()> {
    finite(key, v)?;
    if v < 0.0 {
        return Err(TimelineError::parameter(key, "cannot be negative"));
    }
    Ok(())
}

fn json_number(key: &str, v: &JsonValue) -> Result<f64> {
    v.as_f64()
        .ok_or_else(|| TimelineError::parameter(key, "must be a number"))
}

fn json_vec3(v: &JsonValue) -> Result<[f64; 3]> {
    let arr = v
        .as_array()
        .ok_or_else(|| TimelineError::parameter("position", "must be a list"))?;
    if arr.len() != 3 {
        return Err(TimelineError::parameter("position", "must have 3 values"));
    }
    let mut out = [0.0; 3];
    for (slot, item) in out.iter_mut().zip(arr) {
        *slot = item
            .as_f64()
            .ok_or_else(|| TimelineError::parameter("position", "values must be numbers"))?;
    }
    Ok(out)
}

fn json_ease(v: &JsonValue) -> Result<Ease> {
    match v {
        JsonValue::Null => Ok(Ease::Linear),
        JsonValue::String(name) => Ease::from_name(name)
            .ok_or_else(|| TimelineError::parameter("ease", format!("unknown curve \"{name}\""))),
        JsonValue::Array(points) if points.len() == 4 => {
            let mut p = [0.0; 4];
            for (slot, item) in p.iter_mut().zip(points) {
                *slot = item.as_f64().ok_or_else(|| {
                    TimelineError::parameter("ease", "bezier control points must be numbers")
                })?;
            }
            Ok(Ease::CubicBezier(p[0], p[1], p[2], p[3]))
        }
        _ => Err(TimelineError::parameter(
            "ease",
            "must be a curve name, four bezier control points or null",
        )),
    }
}
