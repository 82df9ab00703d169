//! Playback executor: walks a compiled [`Schedule`] one world step at a time.
//!
//! Per step and per event, in schedule order:
//! - start step: capture the interpolation base (or take it from the mirrored
//!   forward event under yoyo), then `onStart`
//! - strictly between start and end: ease, interpolate, write, then `onUpdate`
//! - end step: write the destination, then `onUpdate` and `onEnd`
//!
//! After the events, the timeline-level `on_update` hook runs and the world steps.
//! The only mutable state is a per-run table of captured values.

use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};
use steptween_api_core::{rad_to_deg, read_channel, Channel, Value, World, WriteOp};

use crate::error::Result;
use crate::interp::lerp_value;
use crate::schedule::{Schedule, ScheduledEvent};
use crate::vars::ChannelValues;

/// Timeline-level lifecycle hook.
pub type Hook = Box<dyn FnMut()>;

#[derive(Default)]
pub struct TimelineHooks {
    /// Before the first step.
    pub on_start: Option<Hook>,
    /// After every step's events, before the world steps.
    pub on_update: Option<Hook>,
    /// After the last step.
    pub on_complete: Option<Hook>,
}

impl fmt::Debug for TimelineHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineHooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

fn fire(hook: &mut Option<Hook>) {
    if let Some(f) = hook.as_mut() {
        f();
    }
}

/// What a finished playback did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSummary {
    /// World steps taken (`total_steps + 1`).
    pub steps_executed: u64,
    /// Events played, mirrored ones included.
    pub events_played: usize,
    pub total_seconds: f64,
    pub yoyo: bool,
}

/// Interpolation endpoints of one event, fixed at its start step.
#[derive(Clone, Copy, Debug, Default)]
struct Segment {
    from: ChannelValues,
    to: ChannelValues,
}

impl Schedule {
    /// Play every step from 0 to `total_steps` inclusive against `world`.
    ///
    /// World errors abort playback immediately; `on_complete` does not run in that case.
    pub fn run<W: World + ?Sized>(
        &self,
        world: &mut W,
        hooks: &mut TimelineHooks,
    ) -> Result<PlaybackSummary> {
        if self.debug {
            self.log_table();
        }

        let mut segments = vec![Segment::default(); self.events.len()];
        // Start values read from the world, by event index; mirrored events return to these.
        let mut captured: Vec<Option<ChannelValues>> = vec![None; self.events.len()];

        fire(&mut hooks.on_start);
        for step in 0..=self.total_steps {
            let report = self.debug && step % self.debug_interval == 0;
            for (k, event) in self.events.iter().enumerate() {
                if step == event.start_step {
                    let segment = begin(event, world, &captured)?;
                    if !event.is_mirror() {
                        captured[k] = Some(segment.from);
                    }
                    segments[k] = segment;
                    if self.debug {
                        log_values(event, &segment.from, "has started at");
                    }
                    if let Some(cb) = &event.vars.callbacks.on_start {
                        cb(event.target);
                    }
                }

                if event.is_running(step) {
                    let t = event.vars.ease.apply(event.progress(step));
                    let segment = &segments[k];
                    for channel in event.vars.targets.channels() {
                        let (Some(from), Some(to)) =
                            (segment.from.get(channel), segment.to.get(channel))
                        else {
                            continue;
                        };
                        let value = lerp_value(&from, &to, t);
                        if report {
                            info!("{} {channel} is: {}", event.name, describe(channel, value));
                        }
                        WriteOp::new(event.target, channel, value).apply(world)?;
                    }
                    if let Some(cb) = &event.vars.callbacks.on_update {
                        cb(event.target);
                    }
                }

                if step == event.end_step {
                    let destination = &segments[k].to;
                    for channel in destination.channels() {
                        if let Some(value) = destination.get(channel) {
                            WriteOp::new(event.target, channel, value).apply(world)?;
                        }
                    }
                    if let Some(cb) = &event.vars.callbacks.on_update {
                        cb(event.target);
                    }
                    if let Some(cb) = &event.vars.callbacks.on_end {
                        cb(event.target);
                    }
                    if self.debug {
                        log_values(event, destination, "has ended at");
                    }
                }
            }
            fire(&mut hooks.on_update);
            world.step()?;
        }
        fire(&mut hooks.on_complete);

        Ok(PlaybackSummary {
            steps_executed: self.total_steps + 1,
            events_played: self.events.len(),
            total_seconds: self.total_duration,
            yoyo: self.yoyo,
        })
    }

    fn log_table(&self) {
        for (k, e) in self.events.iter().enumerate() {
            info!(
                "Event {}: {} -> Start: {:.2}, End: {:.2}, Duration: {:.2}",
                k + 1,
                e.name,
                self.seconds(e.start),
                self.seconds(e.end),
                self.seconds(e.duration)
            );
        }
    }
}

/// Endpoints for `event` at its start step.
fn begin<W: World + ?Sized>(
    event: &ScheduledEvent,
    world: &mut W,
    captured: &[Option<ChannelValues>],
) -> Result<Segment> {
    let declared = event.vars.targets;
    let returning = event
        .mirror_of
        .and_then(|j| captured.get(j).copied().flatten());
    if let Some(origin) = returning {
        return Ok(Segment {
            from: declared,
            to: origin,
        });
    }

    let mut from = ChannelValues::default();
    for channel in declared.channels() {
        from.set(channel, read_channel(world, event.target, channel)?);
    }
    Ok(Segment { from, to: declared })
}

fn log_values(event: &ScheduledEvent, values: &ChannelValues, what: &str) {
    for channel in values.channels() {
        if let Some(value) = values.get(channel) {
            info!("{} {channel} {what}: {}", event.name, describe(channel, value));
        }
    }
}

/// Linear values to 2 decimals; angular ones in degrees and radians.
fn describe(channel: Channel, value: Value) -> String {
    match value {
        Value::Vec3([x, y, z]) => format!("{x:.2}, {y:.2}, {z:.2}"),
        Value::Scalar(v) if channel.is_angular() => {
            format!("{:.2}° ({v:.4} rad)", rad_to_deg(v))
        }
        Value::Scalar(v) => format!("{v:.2}"),
    }
}
