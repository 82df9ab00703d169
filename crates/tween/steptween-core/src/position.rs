//! Position expressions: where a tween starts on the timeline.
//!
//! Grammar (seconds, timeline-local):
//! - absent or `""`: append at the current end of the timeline
//! - `2.5`: absolute start
//! - `"<"` / `">"`: exactly the previous tween's start / end
//! - `"<0.5"`, `">-1"`, `"<50%"`: offset from the previous tween's start / end,
//!   `%` scaling by the previous tween's duration
//! - `"+=1"`, `"-=25%"`: offset from the timeline's total duration, `%` scaling by it
//! - `"3"`, `"50%"`: absolute, `%` scaling by the total duration
//!
//! Every resolved start must be non-negative.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TimelineError};

/// Running totals the resolver measures relative expressions against.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionContext {
    pub previous_start: f64,
    pub previous_end: f64,
    pub previous_duration: f64,
    pub total_duration: f64,
}

/// A start position as supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Position {
    #[default]
    Append,
    At(f64),
    Expr(String),
}

impl Position {
    /// Resolve to an absolute start time in seconds.
    pub fn resolve(&self, ctx: &PositionContext) -> Result<f64> {
        match self {
            Position::Append => Ok(ctx.total_duration),
            Position::At(v) => {
                if !v.is_finite() {
                    return Err(TimelineError::position(v.to_string(), "must be a finite number"));
                }
                if *v < 0.0 {
                    return Err(TimelineError::position(v.to_string(), "cannot be negative"));
                }
                Ok(*v)
            }
            Position::Expr(s) if s.is_empty() => Ok(ctx.total_duration),
            Position::Expr(s) => s.parse::<PositionExpr>()?.resolve(ctx),
        }
    }

    /// Accepts `null`, a number or a string.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value as Json;
        match value {
            Json::Null => Ok(Position::Append),
            Json::Number(n) => n
                .as_f64()
                .map(Position::At)
                .ok_or_else(|| TimelineError::position(n.to_string(), "must be a number")),
            Json::String(s) => Ok(Position::Expr(s.clone())),
            other => Err(TimelineError::position(
                other.to_string(),
                "must be a number or a string",
            )),
        }
    }
}

impl From<f64> for Position {
    fn from(v: f64) -> Self {
        Position::At(v)
    }
}

impl From<&str> for Position {
    fn from(s: &str) -> Self {
        Position::Expr(s.to_string())
    }
}

impl From<String> for Position {
    fn from(s: String) -> Self {
        Position::Expr(s)
    }
}

impl<T: Into<Position>> From<Option<T>> for Position {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}

/// Which edge of the previous tween an anchored expression hangs off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    PreviousStart,
    PreviousEnd,
}

/// A signed number, optionally a percentage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Amount {
    pub value: f64,
    pub percent: bool,
}

impl Amount {
    fn scaled(self, basis: f64) -> f64 {
        if self.percent {
            self.value / 100.0 * basis
        } else {
            self.value
        }
    }
}

/// Parsed form of a non-empty string position.
#[derive(Clone, Debug, PartialEq)]
pub enum PositionExpr {
    /// `<`, `>`, `<1`, `>-50%`
    Anchored {
        anchor: Anchor,
        offset: Option<Amount>,
        source: String,
    },
    /// `+=2`, `-=50%`
    FromTotal {
        subtract: bool,
        amount: Amount,
        source: String,
    },
    /// `3`, `40%`
    Absolute { amount: Amount, source: String },
}

impl PositionExpr {
    fn source(&self) -> &str {
        match self {
            PositionExpr::Anchored { source, .. }
            | PositionExpr::FromTotal { source, .. }
            | PositionExpr::Absolute { source, .. } => source,
        }
    }

    pub fn resolve(&self, ctx: &PositionContext) -> Result<f64> {
        let start = match self {
            PositionExpr::Anchored { anchor, offset, .. } => {
                let base = match anchor {
                    Anchor::PreviousStart => ctx.previous_start,
                    Anchor::PreviousEnd => ctx.previous_end,
                };
                match offset {
                    None => return Ok(base),
                    Some(amount) => base + amount.scaled(ctx.previous_duration),
                }
            }
            PositionExpr::FromTotal {
                subtract, amount, ..
            } => {
                let delta = amount.scaled(ctx.total_duration);
                if *subtract {
                    ctx.total_duration - delta
                } else {
                    ctx.total_duration + delta
                }
            }
            PositionExpr::Absolute { amount, .. } => amount.scaled(ctx.total_duration),
        };
        if start < 0.0 {
            return Err(TimelineError::position(self.source(), "cannot be negative"));
        }
        Ok(start)
    }
}

impl FromStr for PositionExpr {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self> {
        let source = s.to_string();
        if let Some(rest) = s.strip_prefix('<').or_else(|| s.strip_prefix('>')) {
            let anchor = if s.starts_with('<') {
                Anchor::PreviousStart
            } else {
                Anchor::PreviousEnd
            };
            let offset = if rest.is_empty() {
                None
            } else {
                Some(parse_amount(rest, s)?)
            };
            return Ok(PositionExpr::Anchored {
                anchor,
                offset,
                source,
            });
        }

        if let Some(rest) = s.strip_prefix("+=").or_else(|| s.strip_prefix("-=")) {
            let subtract = s.starts_with('-');
            let amount = parse_amount(rest, s)?;
            if amount.value < 0.0 {
                return Err(TimelineError::position(s, "cannot be negative"));
            }
            return Ok(PositionExpr::FromTotal {
                subtract,
                amount,
                source,
            });
        }

        let amount = parse_amount(s, s)?;
        if amount.value < 0.0 {
            return Err(TimelineError::position(s, "cannot be negative"));
        }
        Ok(PositionExpr::Absolute { amount, source })
    }
}

impl fmt::Display for PositionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

/// Parse `[-+]digits[.digits][%]`.
fn parse_amount(text: &str, source: &str) -> Result<Amount> {
    let (number, percent) = match text.strip_suffix('%') {
        Some(n) => (n, true),
        None => (text, false),
    };
    if number.is_empty() {
        let reason = if percent {
            "needs a digit when using percentage"
        } else {
            "is missing a number"
        };
        return Err(TimelineError::position(source, reason));
    }
    if !is_plain_number(number) {
        return Err(TimelineError::position(source, "must be a number"));
    }
    let value = number
        .parse::<f64>()
        .map_err(|_| TimelineError::position(source, "must be a number"))?;
    Ok(Amount { value, percent })
}

/// Digits after dropping leading signs and decimal points; rejects `inf`, `1e3` and friends.
fn is_plain_number(s: &str) -> bool {
    let unsigned = s.trim_start_matches(|c: char| c == '+' || c == '-');
    let mut digits = unsigned.chars().filter(|c| *c != '.').peekable();
    digits.peek().is_some() && digits.all(|c| c.is_ascii_digit())
}
