//! Write operations describing one change to one target channel.
//!
//! WriteOp serializes to JSON as:
//!   { "target": 7, "channel": "angle", "value": { "type": "scalar", "data": 1.57 } }

use serde::{Deserialize, Serialize};

use crate::value::{Channel, Value};
use crate::world::{write_channel, TargetHandle, World, WorldError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WriteOp {
    pub target: TargetHandle,
    pub channel: Channel,
    pub value: Value,
}

impl WriteOp {
    pub fn new(target: TargetHandle, channel: Channel, value: impl Into<Value>) -> Self {
        Self {
            target,
            channel,
            value: value.into(),
        }
    }

    /// Apply this write to a world through the matching capability.
    pub fn apply<W: World + ?Sized>(&self, world: &mut W) -> Result<(), WorldError> {
        write_channel(world, self.target, self.channel, self.value)
    }
}
