//! Timeline builder: registers tweens, resolves their start times and rejects
//! overlapping work on the same target.
//!
//! Methods:
//! - new, with_defaults, with_json_defaults, on_start/on_update/on_complete
//! - to, to_at, to_json (registration)
//! - compile (freeze into a [`Schedule`]), play (compile + run)

use hashbrown::HashMap;
use log::{debug, warn};
use serde_json::Value as JsonValue;
use steptween_api_core::{TargetHandle, World};

use crate::config::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::ids::{IdAllocator, TweenId};
use crate::playback::{PlaybackSummary, TimelineHooks};
use crate::position::{Position, PositionContext};
use crate::schedule::Schedule;
use crate::vars::{CompleteVars, TweenVars, UnknownKey};

/// One registered tween. Times are in seconds.
#[derive(Clone, Debug)]
pub struct TweenEvent {
    pub id: TweenId,
    pub target: TargetHandle,
    /// Display name reported by the world at registration time.
    pub name: String,
    pub vars: CompleteVars,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

/// Mutable builder over a world. Nothing touches the world's state until [`play`](Self::play).
pub struct Timeline<W: World> {
    world: W,
    cfg: TimelineConfig,
    defaults: TweenVars,
    hooks: TimelineHooks,
    ids: IdAllocator,
    events: Vec<TweenEvent>,
    // Indices into `events`, per target.
    by_target: HashMap<TargetHandle, Vec<usize>>,
    cursor: PositionContext,
}

impl<W: World> Timeline<W> {
    pub fn new(world: W, cfg: TimelineConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            world,
            cfg,
            defaults: TweenVars::default(),
            hooks: TimelineHooks::default(),
            ids: IdAllocator::new(),
            events: Vec::new(),
            by_target: HashMap::new(),
            cursor: PositionContext::default(),
        })
    }

    /// Parameters merged under every tween's own vars.
    pub fn with_defaults(mut self, defaults: TweenVars) -> Self {
        self.defaults = defaults;
        self
    }

    /// JSON form of [`with_defaults`](Self::with_defaults); unknown keys follow the same
    /// policy as [`to_json`](Self::to_json).
    pub fn with_json_defaults(mut self, defaults: &JsonValue) -> Result<Self> {
        let (vars, unknown) = TweenVars::from_json(defaults)?;
        self.check_unknown(&unknown, "defaults")?;
        self.defaults = vars;
        Ok(self)
    }

    pub fn on_start(mut self, f: impl FnMut() + 'static) -> Self {
        self.hooks.on_start = Some(Box::new(f));
        self
    }

    /// Called once per step, after every tween has been processed and before the world steps.
    pub fn on_update(mut self, f: impl FnMut() + 'static) -> Self {
        self.hooks.on_update = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.hooks.on_complete = Some(Box::new(f));
        self
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.cfg
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn into_world(self) -> W {
        self.world
    }

    /// Registered tweens in registration order.
    pub fn events(&self) -> &[TweenEvent] {
        &self.events
    }

    /// Latest end time over all tweens, in seconds.
    pub fn duration(&self) -> f64 {
        self.cursor.total_duration
    }

    /// Append a tween at the end of the timeline.
    pub fn to(&mut self, target: TargetHandle, vars: TweenVars) -> Result<&mut Self> {
        self.to_at(target, vars, Position::Append)
    }

    /// Register a tween starting at `position` (plus its delay).
    pub fn to_at(
        &mut self,
        target: TargetHandle,
        vars: TweenVars,
        position: impl Into<Position>,
    ) -> Result<&mut Self> {
        let name = self.world.object_name(target)?;
        let merged = vars.merged_over(&self.defaults);
        merged.validate()?;
        let vars = merged.completed();

        let start = position.into().resolve(&self.cursor)? + vars.delay;
        let duration = vars.duration;
        let end = start + duration;
        self.check_overlap(target, &name, start, end)?;

        let id = self.ids.alloc_tween();
        debug!(
            "tween {} on {name}: [{start:.3}, {end:.3}) channels={:?}",
            id.0,
            vars.targets.channels().collect::<Vec<_>>()
        );
        self.by_target
            .entry(target)
            .or_default()
            .push(self.events.len());
        self.events.push(TweenEvent {
            id,
            target,
            name,
            vars,
            start,
            end,
            duration,
        });
        self.cursor.previous_start = start;
        self.cursor.previous_end = end;
        self.cursor.previous_duration = duration;
        self.cursor.total_duration = self.cursor.total_duration.max(end);
        Ok(self)
    }

    /// Register a tween from its JSON parameter bag and JSON position (`null`, number or string).
    pub fn to_json(
        &mut self,
        target: TargetHandle,
        vars: &JsonValue,
        position: &JsonValue,
    ) -> Result<&mut Self> {
        let (parsed, unknown) = TweenVars::from_json(vars)?;
        self.check_unknown(&unknown, "vars")?;
        let position = Position::from_json(position)?;
        self.to_at(target, parsed, position)
    }

    /// Freeze the registered tweens into a step-indexed schedule.
    pub fn compile(&self) -> Schedule {
        Schedule::build(&self.events, self.cursor.total_duration, &self.cfg)
    }

    /// Compile and run against the owned world.
    ///
    /// Tweens registered after this call returns belong to the next playback only.
    pub fn play(&mut self) -> Result<PlaybackSummary> {
        let schedule = self.compile();
        schedule.run(&mut self.world, &mut self.hooks)
    }

    fn check_overlap(&self, target: TargetHandle, name: &str, start: f64, end: f64) -> Result<()> {
        let Some(previous) = self.by_target.get(&target) else {
            return Ok(());
        };
        for &k in previous {
            let other = &self.events[k];
            if end > other.start && start < other.end {
                return Err(TimelineError::Overlap {
                    target: name.to_string(),
                    start,
                    end,
                    other_start: other.start,
                    other_end: other.end,
                });
            }
        }
        Ok(())
    }

    fn check_unknown(&self, unknown: &[UnknownKey], context: &str) -> Result<()> {
        if !self.cfg.debug {
            if let Some(first) = unknown.first() {
                return Err(TimelineError::parameter(&first.0, "is not a valid variable"));
            }
        }
        for key in unknown {
            warn!("{context}: {key}, ignoring it");
        }
        Ok(())
    }
}

impl<W: World + std::fmt::Debug> std::fmt::Debug for Timeline<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("world", &self.world)
            .field("cfg", &self.cfg)
            .field("defaults", &self.defaults)
            .field("events", &self.events)
            .field("duration", &self.cursor.total_duration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steptween_test_fixtures::SimWorld;

    fn timeline() -> (Timeline<SimWorld>, TargetHandle, TargetHandle) {
        let mut world = SimWorld::new();
        let a = world.spawn("A");
        let b = world.spawn("B");
        let tl = Timeline::new(world, TimelineConfig::default()).unwrap();
        (tl, a, b)
    }

    #[test]
    fn append_chains_end_to_end() {
        let (mut tl, a, b) = timeline();
        tl.to(a, TweenVars::new().angle(1.0).duration(2.0))
            .unwrap()
            .to(b, TweenVars::new().angle(1.0))
            .unwrap();
        let spans: Vec<(f64, f64)> = tl.events().iter().map(|e| (e.start, e.end)).collect();
        assert_eq!(spans, vec![(0.0, 2.0), (2.0, 3.0)]);
        assert_eq!(tl.duration(), 3.0);
        assert_eq!(tl.events()[0].name, "A");
    }

    #[test]
    fn delay_shifts_start() {
        let (mut tl, a, _) = timeline();
        tl.to_at(a, TweenVars::new().angle(1.0).delay(0.5), 1.0).unwrap();
        assert_eq!(tl.events()[0].start, 1.5);
        assert_eq!(tl.events()[0].end, 2.5);
    }

    #[test]
    fn overlap_is_checked_against_every_previous_tween() {
        let (mut tl, a, b) = timeline();
        tl.to(a, TweenVars::new().angle(1.0).duration(2.0)).unwrap();
        tl.to(b, TweenVars::new().angle(1.0).duration(2.0)).unwrap();
        // Not the previous tween, but the first one on `a`.
        let err = tl
            .to_at(a, TweenVars::new().angle(0.0), 1.5)
            .err()
            .unwrap();
        assert!(matches!(err, TimelineError::Overlap { ref target, .. } if target == "A"));
        assert_eq!(tl.events().len(), 2);
    }

    #[test]
    fn duration_never_shrinks() {
        let (mut tl, a, b) = timeline();
        tl.to(a, TweenVars::new().angle(1.0).duration(4.0)).unwrap();
        tl.to_at(b, TweenVars::new().angle(1.0), 0.0).unwrap();
        assert_eq!(tl.duration(), 4.0);
    }

    #[test]
    fn defaults_fill_missing_keys() {
        let (tl, a, _) = timeline();
        let mut tl = tl.with_defaults(TweenVars::new().duration(3.0));
        tl.to(a, TweenVars::new().angle(1.0)).unwrap();
        assert_eq!(tl.events()[0].duration, 3.0);
    }

    #[test]
    fn unknown_target_is_a_world_error() {
        let (mut tl, _, _) = timeline();
        let err = tl
            .to(TargetHandle(999), TweenVars::new().angle(1.0))
            .err()
            .unwrap();
        assert!(matches!(err, TimelineError::World(_)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = TimelineConfig {
            steps_per_second: 0,
            ..Default::default()
        };
        assert!(matches!(
            Timeline::new(SimWorld::new(), cfg),
            Err(TimelineError::Configuration(_))
        ));
    }
}
