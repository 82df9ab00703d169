//! steptween-core: step-driven tween timelines (world-agnostic).
//!
//! Register tweens on a [`Timeline`] with `to`-style calls, then `play` it. Playback
//! advances the [`World`] one discrete step at a time, interpolating position,
//! heading and joint values and firing lifecycle callbacks along the way.
//!
//! ```ignore
//! let mut tl = Timeline::new(world, TimelineConfig::default())?;
//! tl.to(arm, TweenVars::new().angle(deg_to_rad(90.0)).duration(2.0))?
//!   .to_at(pad, TweenVars::new().position([0.0, 0.0, 0.8]), "<50%")?;
//! tl.play()?;
//! ```

pub mod config;
pub mod error;
pub mod ids;
pub mod interp;
pub mod playback;
pub mod position;
pub mod schedule;
pub mod timeline;
pub mod vars;

// Re-exports for consumers
pub use config::TimelineConfig;
pub use error::{Result, TimelineError};
pub use ids::{IdAllocator, TweenId};
pub use interp::Ease;
pub use playback::{Hook, PlaybackSummary, TimelineHooks};
pub use position::{Position, PositionContext, PositionExpr};
pub use schedule::{Schedule, ScheduledEvent};
pub use timeline::{Timeline, TweenEvent};
pub use vars::{Callbacks, ChannelValues, CompleteVars, TargetCallback, TweenVars, UnknownKey};
pub use steptween_api_core::{
    deg_to_rad, rad_to_deg, Channel, TargetHandle, Value, ValueKind, World, WorldError, WriteOp,
};
