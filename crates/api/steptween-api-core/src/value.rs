//! Channels and the values that flow through them.
//! All numeric types use f64; hosts typically talk doubles over the wire.

use serde::{Deserialize, Serialize};

/// Coarse kind of a [`Value`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Scalar,
    Vec3,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Heading or joint value (radians)
    Scalar(f64),
    /// World-space position
    Vec3([f64; 3]),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Vec3(_) => ValueKind::Vec3,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Vec3(_) => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f64; 3]> {
        match self {
            Value::Vec3(v) => Some(*v),
            Value::Scalar(_) => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Value::Vec3(v)
    }
}

/// An independently interpolated property of a target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Position,
    Rotation,
    Angle,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Position, Channel::Rotation, Channel::Angle];

    #[inline]
    pub fn kind(self) -> ValueKind {
        match self {
            Channel::Position => ValueKind::Vec3,
            Channel::Rotation | Channel::Angle => ValueKind::Scalar,
        }
    }

    /// Angular channels are reported in degrees and radians.
    #[inline]
    pub fn is_angular(self) -> bool {
        !matches!(self, Channel::Position)
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Position => "position",
            Channel::Rotation => "rotation",
            Channel::Angle => "angle",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
