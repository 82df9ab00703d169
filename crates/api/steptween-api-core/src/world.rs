//! The external world a timeline animates.
//!
//! A [`World`] is whatever owns the targets: a simulator connection, a robot
//! controller, an in-memory test double. The engine only needs to advance it
//! one discrete step, read and write three kinds of target state, and resolve
//! a target's display name for diagnostics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::{Channel, Value, ValueKind};

/// Opaque handle to an object owned by the world (simulators hand out integers).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetHandle(pub i64);

impl std::fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failures raised by a world implementation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorldError {
    #[error("unknown target {0}")]
    UnknownTarget(TargetHandle),
    #[error("{channel} expects a {expected:?} value, got {found:?}")]
    KindMismatch {
        channel: Channel,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("transport error: {0}")]
    Transport(String),
}

/// Capability surface consumed by the timeline engine.
///
/// `step` is expected to block until the world acknowledges the tick.
pub trait World {
    fn step(&mut self) -> Result<(), WorldError>;

    fn position(&mut self, target: TargetHandle) -> Result<[f64; 3], WorldError>;
    fn set_position(&mut self, target: TargetHandle, position: [f64; 3])
        -> Result<(), WorldError>;

    fn orientation(&mut self, target: TargetHandle) -> Result<f64, WorldError>;
    fn set_orientation(&mut self, target: TargetHandle, heading: f64) -> Result<(), WorldError>;

    fn joint_value(&mut self, target: TargetHandle) -> Result<f64, WorldError>;
    fn set_joint_value(&mut self, target: TargetHandle, angle: f64) -> Result<(), WorldError>;

    fn object_name(&mut self, target: TargetHandle) -> Result<String, WorldError>;
}

impl<W: World + ?Sized> World for &mut W {
    fn step(&mut self) -> Result<(), WorldError> {
        (**self).step()
    }
    fn position(&mut self, target: TargetHandle) -> Result<[f64; 3], WorldError> {
        (**self).position(target)
    }
    fn set_position(
        &mut self,
        target: TargetHandle,
        position: [f64; 3],
    ) -> Result<(), WorldError> {
        (**self).set_position(target, position)
    }
    fn orientation(&mut self, target: TargetHandle) -> Result<f64, WorldError> {
        (**self).orientation(target)
    }
    fn set_orientation(&mut self, target: TargetHandle, heading: f64) -> Result<(), WorldError> {
        (**self).set_orientation(target, heading)
    }
    fn joint_value(&mut self, target: TargetHandle) -> Result<f64, WorldError> {
        (**self).joint_value(target)
    }
    fn set_joint_value(&mut self, target: TargetHandle, angle: f64) -> Result<(), WorldError> {
        (**self).set_joint_value(target, angle)
    }
    fn object_name(&mut self, target: TargetHandle) -> Result<String, WorldError> {
        (**self).object_name(target)
    }
}

/// Read the current value of `channel` on `target`.
pub fn read_channel<W: World + ?Sized>(
    world: &mut W,
    target: TargetHandle,
    channel: Channel,
) -> Result<Value, WorldError> {
    Ok(match channel {
        Channel::Position => Value::Vec3(world.position(target)?),
        Channel::Rotation => Value::Scalar(world.orientation(target)?),
        Channel::Angle => Value::Scalar(world.joint_value(target)?),
    })
}

/// Write `value` to `channel` on `target`. The value kind must match the channel.
pub fn write_channel<W: World + ?Sized>(
    world: &mut W,
    target: TargetHandle,
    channel: Channel,
    value: Value,
) -> Result<(), WorldError> {
    match (channel, value) {
        (Channel::Position, Value::Vec3(p)) => world.set_position(target, p),
        (Channel::Rotation, Value::Scalar(h)) => world.set_orientation(target, h),
        (Channel::Angle, Value::Scalar(a)) => world.set_joint_value(target, a),
        (channel, value) => Err(WorldError::KindMismatch {
            channel,
            expected: channel.kind(),
            found: value.kind(),
        }),
    }
}

/// Advance the world by `ceil(seconds * steps_per_second)` steps and return the count.
/// Negative or non-finite durations step zero times.
pub fn wait<W: World + ?Sized>(
    world: &mut W,
    seconds: f64,
    steps_per_second: u32,
) -> Result<u64, WorldError> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Ok(0);
    }
    let steps = (seconds * f64::from(steps_per_second)).ceil() as u64;
    for _ in 0..steps {
        world.step()?;
    }
    Ok(steps)
}
