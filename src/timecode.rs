use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReframeError, ReframeResult};

/// A wall-clock position in the source media, stored as seconds.
///
/// Parses from a bare seconds literal (`"95"`, `"95.5"`) or from
/// `MM:SS` / `HH:MM:SS` with an optional fractional part on the last
/// component, which covers both timestamp shapes the external tools accept.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp(f64);

impl Timestamp {
    pub fn from_seconds(seconds: f64) -> ReframeResult<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ReframeError::validation(format!(
                "timestamp must be a finite non-negative number of seconds, got {seconds}"
            )));
        }
        Ok(Self(seconds))
    }

    pub fn as_seconds(&self) -> f64 {
        self.0
    }

    /// Fixed-point seconds form used on tool command lines.
    ///
    /// Both input shapes reach ffmpeg/yt-dlp identically through this.
    pub fn to_arg(&self) -> String {
        format!("{:.3}", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl FromStr for Timestamp {
    type Err = ReframeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(ReframeError::validation("timestamp is empty"));
        }

        let parts: Vec<&str> = value.split(':').collect();
        if parts.len() > 3 {
            return Err(ReframeError::validation(format!(
                "timestamp '{raw}' has too many ':' separators (expected SS, MM:SS or HH:MM:SS)"
            )));
        }

        let mut seconds = 0.0f64;
        for (idx, part) in parts.iter().enumerate() {
            let is_last = idx == parts.len() - 1;
            let component = if is_last {
                part.parse::<f64>().ok().filter(|v| v.is_finite())
            } else {
                // Only the seconds component may carry a fraction.
                part.parse::<u64>().ok().map(|v| v as f64)
            };
            let Some(component) = component else {
                return Err(ReframeError::validation(format!(
                    "timestamp '{raw}' has a malformed component '{part}'"
                )));
            };
            if component < 0.0 {
                return Err(ReframeError::validation(format!(
                    "timestamp '{raw}' must not be negative"
                )));
            }
            if parts.len() > 1 && is_last && component >= 60.0 {
                return Err(ReframeError::validation(format!(
                    "timestamp '{raw}': seconds component must be below 60"
                )));
            }
            if parts.len() == 3 && idx == 1 && component >= 60.0 {
                return Err(ReframeError::validation(format!(
                    "timestamp '{raw}': minutes component must be below 60"
                )));
            }
            seconds = seconds * 60.0 + component;
        }

        Timestamp::from_seconds(seconds)
    }
}

/// The time-bounded sub-range of a source video requested for processing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    start: Timestamp,
    end: Timestamp,
}

impl TimeRange {
    /// Construct a range, rejecting `end <= start`.
    pub fn new(start: Timestamp, end: Timestamp) -> ReframeResult<Self> {
        if end.as_seconds() <= start.as_seconds() {
            return Err(ReframeError::validation(format!(
                "time range end ({end}) must be after start ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both endpoints from their textual forms.
    pub fn parse(start: &str, end: &str) -> ReframeResult<Self> {
        Self::new(start.parse()?, end.parse()?)
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn duration_seconds(&self) -> f64 {
        self.end.as_seconds() - self.start.as_seconds()
    }
}
