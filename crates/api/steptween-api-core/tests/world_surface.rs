use std::collections::HashMap;

use steptween_api_core::{
    read_channel, wait, write_channel, Channel, TargetHandle, Value, ValueKind, World, WorldError,
    WriteOp,
};

/// Minimal world: one map per capability, plus a step counter.
#[derive(Default)]
struct MapWorld {
    steps: u64,
    names: HashMap<TargetHandle, String>,
    positions: HashMap<TargetHandle, [f64; 3]>,
    headings: HashMap<TargetHandle, f64>,
    joints: HashMap<TargetHandle, f64>,
}

impl MapWorld {
    fn with(handle: i64, name: &str) -> (Self, TargetHandle) {
        let t = TargetHandle(handle);
        let mut w = Self::default();
        w.names.insert(t, name.to_string());
        w.positions.insert(t, [0.0; 3]);
        w.headings.insert(t, 0.0);
        w.joints.insert(t, 0.0);
        (w, t)
    }

    fn known(&self, t: TargetHandle) -> Result<(), WorldError> {
        if self.names.contains_key(&t) {
            Ok(())
        } else {
            Err(WorldError::UnknownTarget(t))
        }
    }
}

impl World for MapWorld {
    fn step(&mut self) -> Result<(), WorldError> {
        self.steps += 1;
        Ok(())
    }
    fn position(&mut self, t: TargetHandle) -> Result<[f64; 3], WorldError> {
        self.known(t)?;
        Ok(self.positions[&t])
    }
    fn set_position(&mut self, t: TargetHandle, p: [f64; 3]) -> Result<(), WorldError> {
        self.known(t)?;
        self.positions.insert(t, p);
        Ok(())
    }
    fn orientation(&mut self, t: TargetHandle) -> Result<f64, WorldError> {
        self.known(t)?;
        Ok(self.headings[&t])
    }
    fn set_orientation(&mut self, t: TargetHandle, h: f64) -> Result<(), WorldError> {
        self.known(t)?;
        self.headings.insert(t, h);
        Ok(())
    }
    fn joint_value(&mut self, t: TargetHandle) -> Result<f64, WorldError> {
        self.known(t)?;
        Ok(self.joints[&t])
    }
    fn set_joint_value(&mut self, t: TargetHandle, a: f64) -> Result<(), WorldError> {
        self.known(t)?;
        self.joints.insert(t, a);
        Ok(())
    }
    fn object_name(&mut self, t: TargetHandle) -> Result<String, WorldError> {
        self.known(t)?;
        Ok(self.names[&t].clone())
    }
}

#[test]
fn channel_dispatch_round_trips_through_the_world() {
    let (mut w, t) = MapWorld::with(3, "Arm");
    write_channel(&mut w, t, Channel::Position, Value::Vec3([1.0, 2.0, 3.0])).unwrap();
    write_channel(&mut w, t, Channel::Rotation, Value::Scalar(0.5)).unwrap();
    write_channel(&mut w, t, Channel::Angle, Value::Scalar(-0.25)).unwrap();

    assert_eq!(w.positions[&t], [1.0, 2.0, 3.0]);
    assert_eq!(
        read_channel(&mut w, t, Channel::Rotation).unwrap(),
        Value::Scalar(0.5)
    );
    assert_eq!(
        read_channel(&mut w, t, Channel::Angle).unwrap(),
        Value::Scalar(-0.25)
    );
}

#[test]
fn wrong_value_kind_is_rejected() {
    let (mut w, t) = MapWorld::with(3, "Arm");
    let err = write_channel(&mut w, t, Channel::Angle, Value::Vec3([0.0; 3])).unwrap_err();
    assert_eq!(
        err,
        WorldError::KindMismatch {
            channel: Channel::Angle,
            expected: ValueKind::Scalar,
            found: ValueKind::Vec3,
        }
    );
}

#[test]
fn write_op_applies_and_serializes() {
    let (mut w, t) = MapWorld::with(7, "Joint1");
    let op = WriteOp::new(t, Channel::Angle, 1.5);
    op.apply(&mut w).unwrap();
    assert_eq!(w.joints[&t], 1.5);

    let json = serde_json::to_value(op).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "target": 7,
            "channel": "angle",
            "value": { "type": "scalar", "data": 1.5 }
        })
    );
}

#[test]
fn unknown_targets_surface_as_errors() {
    let (mut w, _) = MapWorld::with(1, "A");
    let ghost = TargetHandle(42);
    assert_eq!(
        w.object_name(ghost).unwrap_err(),
        WorldError::UnknownTarget(ghost)
    );
    assert!(WriteOp::new(ghost, Channel::Position, [0.0; 3])
        .apply(&mut w)
        .is_err());
}

#[test]
fn wait_rounds_up_to_whole_steps() {
    let (mut w, _) = MapWorld::with(1, "A");
    assert_eq!(wait(&mut w, 1.0, 240).unwrap(), 240);
    assert_eq!(wait(&mut w, 0.01, 30).unwrap(), 1);
    assert_eq!(wait(&mut w, 0.0, 30).unwrap(), 0);
    assert_eq!(wait(&mut w, -1.0, 30).unwrap(), 0);
    assert_eq!(wait(&mut w, f64::NAN, 30).unwrap(), 0);
    assert_eq!(w.steps, 241);
}

#[test]
fn mutable_references_are_worlds_too() {
    fn drive<W: World>(mut world: W, t: TargetHandle) -> String {
        world.set_orientation(t, 1.0).unwrap();
        world.step().unwrap();
        world.object_name(t).unwrap()
    }
    let (mut w, t) = MapWorld::with(2, "Base");
    assert_eq!(drive(&mut w, t), "Base");
    assert_eq!(w.headings[&t], 1.0);
    assert_eq!(w.steps, 1);
}
