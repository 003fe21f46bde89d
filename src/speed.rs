//! The closed set of reading speeds.
//!
//! Speed is not an arbitrary integer: the selection surface offers exactly
//! four presets, so the core models them as an enum and rejects anything else
//! at the conversion boundary ([`Speed::try_from`]). Inside the library an
//! invalid speed is unrepresentable.

use crate::error::FocusReadError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Words-per-minute preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Speed {
    #[default]
    Wpm300,
    Wpm500,
    Wpm700,
    Wpm900,
}

impl Speed {
    /// Every preset, slowest first.
    pub const ALL: [Speed; 4] = [Speed::Wpm300, Speed::Wpm500, Speed::Wpm700, Speed::Wpm900];

    pub const fn wpm(self) -> u32 {
        match self {
            Speed::Wpm300 => 300,
            Speed::Wpm500 => 500,
            Speed::Wpm700 => 700,
            Speed::Wpm900 => 900,
        }
    }

    /// Milliseconds per word before any punctuation pause: `60000 / wpm`.
    pub fn base_delay_ms(self) -> f64 {
        60_000.0 / f64::from(self.wpm())
    }
}

impl TryFrom<u32> for Speed {
    type Error = FocusReadError;

    fn try_from(wpm: u32) -> Result<Self, Self::Error> {
        Speed::ALL
            .into_iter()
            .find(|s| s.wpm() == wpm)
            .ok_or(FocusReadError::InvalidSpeed { wpm })
    }
}

impl From<Speed> for u32 {
    fn from(speed: Speed) -> u32 {
        speed.wpm()
    }
}

impl std::str::FromStr for Speed {
    type Err = FocusReadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix("wpm")
            .or_else(|| trimmed.strip_suffix("WPM"))
            .unwrap_or(trimmed)
            .trim();
        let wpm: u32 = digits
            .parse()
            .map_err(|_| FocusReadError::InvalidConfig(format!("'{s}' is not a WPM value")))?;
        Speed::try_from(wpm)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} WPM", self.wpm())
    }
}
