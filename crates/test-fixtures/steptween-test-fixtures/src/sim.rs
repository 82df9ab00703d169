//! Deterministic in-memory world that records every capability call.

use serde::Deserialize;
use steptween_api_core::{Channel, TargetHandle, Value, World, WorldError, WriteOp};

/// First handle handed out by [`SimWorld::spawn`]. Simulators rarely start at zero.
const FIRST_HANDLE: i64 = 16;

#[derive(Clone, Debug, PartialEq)]
pub struct SimObject {
    pub handle: TargetHandle,
    pub name: String,
    pub position: [f64; 3],
    pub orientation: f64,
    pub joint: f64,
}

/// One recorded interaction, tagged with the step counter at the time it happened.
#[derive(Clone, Debug, PartialEq)]
pub enum SimOp {
    Step { index: u64 },
    Read { step: u64, target: TargetHandle, channel: Channel },
    Write { step: u64, op: WriteOp },
    Name { step: u64, target: TargetHandle },
}

/// Scene description used by JSON fixtures.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub orientation: f64,
    #[serde(default)]
    pub joint: f64,
}

#[derive(Debug, Default)]
pub struct SimWorld {
    objects: Vec<SimObject>,
    steps: u64,
    history: Vec<SimOp>,
    fail_at_step: Option<u64>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_scene(scene: &Scene) -> Self {
        let mut world = Self::new();
        for obj in &scene.objects {
            let handle = world.spawn(&obj.name);
            if let Some(o) = world.object_mut(handle) {
                o.position = obj.position;
                o.orientation = obj.orientation;
                o.joint = obj.joint;
            }
        }
        world
    }

    /// Add an object at the origin with zero heading and joint value.
    pub fn spawn(&mut self, name: &str) -> TargetHandle {
        let handle = TargetHandle(FIRST_HANDLE + self.objects.len() as i64);
        self.objects.push(SimObject {
            handle,
            name: name.to_string(),
            position: [0.0; 3],
            orientation: 0.0,
            joint: 0.0,
        });
        handle
    }

    pub fn spawn_at(&mut self, name: &str, position: [f64; 3]) -> TargetHandle {
        let handle = self.spawn(name);
        if let Some(o) = self.object_mut(handle) {
            o.position = position;
        }
        handle
    }

    /// Make the step with this index (0-based) fail with a transport error.
    pub fn fail_at_step(&mut self, index: u64) {
        self.fail_at_step = Some(index);
    }

    pub fn handle(&self, name: &str) -> Option<TargetHandle> {
        self.objects.iter().find(|o| o.name == name).map(|o| o.handle)
    }

    pub fn object(&self, handle: TargetHandle) -> Option<&SimObject> {
        self.objects.iter().find(|o| o.handle == handle)
    }

    fn object_mut(&mut self, handle: TargetHandle) -> Option<&mut SimObject> {
        self.objects.iter_mut().find(|o| o.handle == handle)
    }

    fn existing(&mut self, handle: TargetHandle) -> Result<&mut SimObject, WorldError> {
        self.object_mut(handle)
            .ok_or(WorldError::UnknownTarget(handle))
    }

    /// Number of completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn history(&self) -> &[SimOp] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// All writes in order, paired with the step index they happened in.
    pub fn writes(&self) -> impl Iterator<Item = (u64, &WriteOp)> {
        self.history.iter().filter_map(|op| match op {
            SimOp::Write { step, op } => Some((*step, op)),
            _ => None,
        })
    }

    /// Writes to one channel of one target, as (step, value).
    pub fn writes_to(&self, target: TargetHandle, channel: Channel) -> Vec<(u64, Value)> {
        self.writes()
            .filter(|(_, op)| op.target == target && op.channel == channel)
            .map(|(step, op)| (step, op.value))
            .collect()
    }

    pub fn reads_of(&self, target: TargetHandle, channel: Channel) -> usize {
        self.history
            .iter()
            .filter(|op| {
                matches!(op, SimOp::Read { target: t, channel: c, .. } if *t == target && *c == channel)
            })
            .count()
    }

    fn record_read(&mut self, target: TargetHandle, channel: Channel) {
        let step = self.steps;
        self.history.push(SimOp::Read {
            step,
            target,
            channel,
        });
    }

    fn record_write(&mut self, target: TargetHandle, channel: Channel, value: Value) {
        let step = self.steps;
        self.history.push(SimOp::Write {
            step,
            op: WriteOp::new(target, channel, value),
        });
    }
}

impl World for SimWorld {
    fn step(&mut self) -> Result<(), WorldError> {
        if self.fail_at_step == Some(self.steps) {
            return Err(WorldError::Transport(format!(
                "connection dropped at step {}",
                self.steps
            )));
        }
        self.history.push(SimOp::Step { index: self.steps });
        self.steps += 1;
        Ok(())
    }

    fn position(&mut self, target: TargetHandle) -> Result<[f64; 3], WorldError> {
        let p = self.existing(target)?.position;
        self.record_read(target, Channel::Position);
        Ok(p)
    }

    fn set_position(
        &mut self,
        target: TargetHandle,
        position: [f64; 3],
    ) -> Result<(), WorldError> {
        self.existing(target)?.position = position;
        self.record_write(target, Channel::Position, Value::Vec3(position));
        Ok(())
    }

    fn orientation(&mut self, target: TargetHandle) -> Result<f64, WorldError> {
        let h = self.existing(target)?.orientation;
        self.record_read(target, Channel::Rotation);
        Ok(h)
    }

    fn set_orientation(&mut self, target: TargetHandle, heading: f64) -> Result<(), WorldError> {
        self.existing(target)?.orientation = heading;
        self.record_write(target, Channel::Rotation, Value::Scalar(heading));
        Ok(())
    }

    fn joint_value(&mut self, target: TargetHandle) -> Result<f64, WorldError> {
        let a = self.existing(target)?.joint;
        self.record_read(target, Channel::Angle);
        Ok(a)
    }

    fn set_joint_value(&mut self, target: TargetHandle, angle: f64) -> Result<(), WorldError> {
        self.existing(target)?.joint = angle;
        self.record_write(target, Channel::Angle, Value::Scalar(angle));
        Ok(())
    }

    fn object_name(&mut self, target: TargetHandle) -> Result<String, WorldError> {
        let name = self.existing(target)?.name.clone();
        let step = self.steps;
        self.history.push(SimOp::Name { step, target });
        Ok(name)
    }
}
