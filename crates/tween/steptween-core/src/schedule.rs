//! Compiled, immutable playback plan.
//!
//! Compiling sorts the registered tweens by start (stable), appends the mirrored
//! yoyo half when enabled, and converts seconds to steps. The yoyo value flow is
//! recorded as data: a mirrored event names the forward event whose captured
//! start values become its destination.

use log::debug;
use steptween_api_core::TargetHandle;

use crate::config::TimelineConfig;
use crate::error::Result;
use crate::ids::TweenId;
use crate::timeline::TweenEvent;
use crate::vars::CompleteVars;

/// Scaled times closer than this to an integer are treated as that integer.
const STEP_SNAP_EPSILON: f64 = 1e-9;

#[derive(Clone, Debug)]
pub struct ScheduledEvent {
    pub tween: TweenId,
    pub target: TargetHandle,
    pub name: String,
    pub vars: CompleteVars,
    /// Start, end and duration in steps, unrounded.
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    /// Step on which the start phase runs.
    pub start_step: u64,
    /// Step on which the end phase runs.
    pub end_step: u64,
    /// Forward event whose captured start values this mirrored event returns to.
    pub mirror_of: Option<usize>,
}

impl ScheduledEvent {
    pub fn is_mirror(&self) -> bool {
        self.mirror_of.is_some()
    }

    /// Running phase: strictly between the boundary steps.
    #[inline]
    pub(crate) fn is_running(&self, step: u64) -> bool {
        step > self.start_step && step < self.end_step
    }

    /// Normalized progress at `step`, measured on the unrounded times.
    #[inline]
    pub(crate) fn progress(&self, step: u64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((step as f64 - self.start) / self.duration).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug)]
pub struct Schedule {
    pub events: Vec<ScheduledEvent>,
    /// Seconds, doubled under yoyo.
    pub total_duration: f64,
    /// `ceil(total_duration * steps_per_second)`; playback visits steps `0..=total_steps`.
    pub total_steps: u64,
    pub steps_per_second: u32,
    pub yoyo: bool,
    pub debug: bool,
    pub(crate) debug_interval: u64,
}

/// Seconds-based span before scaling.
struct Span<'a> {
    event: &'a TweenEvent,
    start: f64,
    end: f64,
    mirror_of: Option<usize>,
}

impl Schedule {
    /// Compile `events` under `cfg`, rejecting invalid engine options.
    pub fn compile(events: &[TweenEvent], duration: f64, cfg: &TimelineConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::build(events, duration, cfg))
    }

    /// Compile against an already validated config.
    pub(crate) fn build(events: &[TweenEvent], duration: f64, cfg: &TimelineConfig) -> Self {
        let registered = events.len();
        let mut spans: Vec<Span<'_>> = events
            .iter()
            .map(|event| Span {
                event,
                start: event.start,
                end: event.end,
                mirror_of: None,
            })
            .collect();
        // `sort_by` is stable: ties keep registration order.
        spans.sort_by(|a, b| a.start.total_cmp(&b.start));

        let total_duration = if cfg.yoyo {
            mirror(&mut spans, duration)
        } else {
            duration
        };

        let sps = f64::from(cfg.steps_per_second);
        let events: Vec<ScheduledEvent> = spans
            .into_iter()
            .map(|span| {
                let start = span.start * sps;
                let end = span.end * sps;
                ScheduledEvent {
                    tween: span.event.id,
                    target: span.event.target,
                    name: span.event.name.clone(),
                    vars: span.event.vars.clone(),
                    start,
                    end,
                    duration: end - start,
                    start_step: boundary_step(start),
                    end_step: boundary_step(end),
                    mirror_of: span.mirror_of,
                }
            })
            .collect();
        let total_steps = boundary_step(total_duration * sps);

        debug!(
            "compiled {} events ({} registered), {total_duration:.3}s -> {total_steps} steps{}",
            events.len(),
            registered,
            if cfg.yoyo { ", yoyo" } else { "" }
        );

        Schedule {
            events,
            total_duration,
            total_steps,
            steps_per_second: cfg.steps_per_second,
            yoyo: cfg.yoyo,
            debug: cfg.debug,
            debug_interval: cfg.debug_interval(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Seconds for a step-scaled time.
    pub fn seconds(&self, steps: f64) -> f64 {
        steps / f64::from(self.steps_per_second)
    }
}

/// Append the time-reversed copy of `spans` and return the doubled duration.
///
/// In the resulting list of `2n` spans, span `2n - 1 - j` mirrors span `j`.
fn mirror(spans: &mut Vec<Span<'_>>, duration: f64) -> f64 {
    let doubled = duration * 2.0;
    let n = spans.len();
    let mirrored: Vec<Span<'_>> = (0..n)
        .rev()
        .map(|j| {
            let forward = &spans[j];
            Span {
                event: forward.event,
                start: doubled - forward.end,
                end: doubled - forward.start,
                mirror_of: Some(j),
            }
        })
        .collect();
    spans.extend(mirrored);
    doubled
}

/// First whole step at or after `scaled`.
fn boundary_step(scaled: f64) -> u64 {
    let nearest = scaled.round();
    let snapped = if (scaled - nearest).abs() < STEP_SNAP_EPSILON {
        nearest
    } else {
        scaled
    };
    snapped.ceil().max(0.0) as u64
}
