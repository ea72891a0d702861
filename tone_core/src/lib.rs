//! Shared types for EvenTone.
//!
//! Everything the analysis, advisor and audio crates need to agree on lives
//! here: the band/action/skill vocabulary, the frequency snapshot, the frame
//! source seam and the unified error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unified error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown skill level: {0}")]
    UnknownSkillLevel(String),

    #[error("Invalid pitch: {0} Hz")]
    InvalidPitch(f32),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error), // Catch-all for other errors
}

// Basic audio format definitions
pub const SAMPLE_RATE: u32 = 48000;
pub const FFT_SIZE: usize = 2048;
/// Number of frequency bins in a snapshot produced from an `FFT_SIZE` frame.
pub const BIN_COUNT: usize = FFT_SIZE / 2;

/// Cadence of the analysis loop.
pub const TICK_INTERVAL_MS: u64 = 500;

/// Maximum number of notes kept in the rolling history.
pub const NOTE_HISTORY_CAPACITY: usize = 10;

/// Represents a buffer of mono audio samples.
pub type AudioBuffer = Vec<f32>;

/// One of the three analysed frequency bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Mid,
    High,
}

impl Band {
    /// All bands, in evaluation order.
    pub const ALL: [Band; 3] = [Band::Low, Band::Mid, Band::High];

    pub fn name(self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Mid => "mid",
            Band::High => "high",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The corrective action suggested for a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EqAction {
    Boost,
    Reduce,
}

impl EqAction {
    pub const ALL: [EqAction; 2] = [EqAction::Boost, EqAction::Reduce];

    pub fn name(self) -> &'static str {
        match self {
            EqAction::Boost => "boost",
            EqAction::Reduce => "reduce",
        }
    }
}

impl fmt::Display for EqAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operator-selected experience tier that picks the wording of suggestions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    #[default]
    Novice,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 5] = [
        SkillLevel::Novice,
        SkillLevel::Beginner,
        SkillLevel::Intermediate,
        SkillLevel::Advanced,
        SkillLevel::Expert,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SkillLevel::Novice => "novice",
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
            SkillLevel::Expert => "expert",
        }
    }

    /// The next tier, wrapping from expert back to novice.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// The previous tier, wrapping from novice to expert.
    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SkillLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownSkillLevel(s.to_string()))
    }
}

/// A single band imbalance detected in one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImbalanceFinding {
    pub band: Band,
    pub action: EqAction,
}

impl ImbalanceFinding {
    pub fn new(band: Band, action: EqAction) -> Self {
        Self { band, action }
    }
}

/// Byte magnitudes (0-255), one per frequency bin, captured once per tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrequencySnapshot(Vec<u8>);

impl FrequencySnapshot {
    pub fn new(bins: Vec<u8>) -> Self {
        Self(bins)
    }

    /// An all-zero snapshot with `bin_count` bins.
    pub fn silent(bin_count: usize) -> Self {
        Self(vec![0; bin_count])
    }

    pub fn bins(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for FrequencySnapshot {
    fn from(bins: Vec<u8>) -> Self {
        Self(bins)
    }
}

/// Everything one analysis pass consumes.
#[derive(Debug, Clone, Default)]
pub struct AnalysisFrame {
    pub spectrum: FrequencySnapshot,
    pub samples: AudioBuffer,
    pub sample_rate: u32,
}

/// Supplier of analysis frames; owns the capture device and the EQ chain.
pub trait FrameSource: Send {
    /// Capture a fresh frequency snapshot and time-domain buffer.
    fn next_frame(&mut self) -> Result<AnalysisFrame, Error>;

    /// Number of bins in the snapshots this source produces.
    fn bin_count(&self) -> usize;

    /// Set the gain of one EQ band, returning the value actually applied.
    fn set_eq_gain(&mut self, band: Band, gain_db: f32) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_level_parsing() {
        assert_eq!("novice".parse::<SkillLevel>().unwrap(), SkillLevel::Novice);
        assert_eq!(" Expert ".parse::<SkillLevel>().unwrap(), SkillLevel::Expert);

        let err = "guru".parse::<SkillLevel>().unwrap_err();
        assert!(matches!(err, Error::UnknownSkillLevel(ref s) if s == "guru"));
    }

    #[test]
    fn skill_level_cycles() {
        assert_eq!(SkillLevel::Novice.next(), SkillLevel::Beginner);
        assert_eq!(SkillLevel::Expert.next(), SkillLevel::Novice);
        assert_eq!(SkillLevel::Novice.previous(), SkillLevel::Expert);
    }

    #[test]
    fn band_display() {
        let names: Vec<String> = Band::ALL.iter().map(|b| b.to_string()).collect();
        assert_eq!(names, vec!["low", "mid", "high"]);
        assert_eq!(EqAction::Reduce.to_string(), "reduce");
    }

    #[test]
    fn silent_snapshot() {
        let snapshot = FrequencySnapshot::silent(BIN_COUNT);
        assert_eq!(snapshot.len(), 1024);
        assert!(snapshot.bins().iter().all(|&b| b == 0));
    }

    #[test]
    fn error_display() {
        let io_err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert!(format!("{}", io_err).contains("I/O error: file not found"));

        let config_err = Error::Config("Invalid setting".to_string());
        assert!(format!("{}", config_err).contains("Configuration error: Invalid setting"));

        let anyhow_err = Error::Other(anyhow::anyhow!("Something went wrong"));
        assert!(format!("{}", anyhow_err).contains("Something went wrong"));
    }
}
