//! Engine options for steptween-core.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};

/// Fixed-before-playback engine options.
///
/// Callbacks and the default parameter set are not data and are attached on
/// the [`Timeline`](crate::Timeline) instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimelineConfig {
    /// Log captured, interpolated and final values while playing.
    pub debug: bool,
    /// Append a mirrored, time-reversed copy of the timeline.
    pub yoyo: bool,
    /// Simulation rate; one playback step per world step.
    pub steps_per_second: u32,
    /// How many interpolation reports per simulated second in debug mode.
    pub debugs_per_second: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            yoyo: false,
            steps_per_second: 240,
            debugs_per_second: 2,
        }
    }
}

impl TimelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.steps_per_second == 0 {
            return Err(TimelineError::Configuration(
                "\"steps_per_second\" must be a positive integer".into(),
            ));
        }
        if self.debugs_per_second == 0 {
            return Err(TimelineError::Configuration(
                "\"debugs_per_second\" must be a positive integer".into(),
            ));
        }
        if self.debugs_per_second > self.steps_per_second {
            return Err(TimelineError::Configuration(format!(
                "\"debugs_per_second\" cannot be greater than \"steps_per_second\" (<= {})",
                self.steps_per_second
            )));
        }
        Ok(())
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: TimelineConfig =
            serde_json::from_str(s).map_err(|e| TimelineError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Same as [`from_json`](Self::from_json) for an already-parsed value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let cfg: TimelineConfig = serde_json::from_value(value)
            .map_err(|e| TimelineError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Steps between two debug reports.
    pub(crate) fn debug_interval(&self) -> u64 {
        let interval = self
            .steps_per_second
            .checked_div(self.debugs_per_second)
            .unwrap_or(1);
        u64::from(interval.max(1))
    }
}
