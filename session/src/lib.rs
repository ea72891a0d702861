//! Analysis session state for EvenTone
//!
//! This crate owns everything that persists between ticks: the enabled
//! flag, the skill level, the advisory table and the note history. A pass
//! over one frame is the plain synchronous [`AnalysisSession::run_pass`];
//! [`AnalysisHandler`] drives it from a tokio interval.

pub mod commands;
pub mod handler;

#[cfg(test)]
mod mocks;

pub use commands::{AnalysisCommand, AnalysisEvent};
pub use handler::AnalysisHandler;

use advisor::AdvisoryTable;
use analysis::{BandEnergies, NoteHistory, PitchDetector, PitchReading, PitchTracker};
use log::{debug, info};
use tone_core::{AnalysisFrame, AudioBuffer, FrequencySnapshot, ImbalanceFinding, SkillLevel};

/// Everything one pass produced, ready for display.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub energies: Option<BandEnergies>,
    pub findings: Vec<ImbalanceFinding>,
    pub advice: String,
    pub pitch: Option<PitchReading>,
    /// `None` leaves the previous pitch text on screen.
    pub pitch_display: Option<String>,
    pub note_history: String,
    pub spectrum: FrequencySnapshot,
    pub samples: AudioBuffer,
}

/// Analysis session state container
pub struct AnalysisSession {
    enabled: bool,
    skill_level: SkillLevel,
    table: AdvisoryTable,
    tracker: PitchTracker,
    detector: Box<dyn PitchDetector>,
}

impl AnalysisSession {
    /// Create a stopped session with an empty note history.
    pub fn new(
        table: AdvisoryTable,
        skill_level: SkillLevel,
        detector: Box<dyn PitchDetector>,
    ) -> Self {
        Self {
            enabled: false,
            skill_level,
            table,
            tracker: PitchTracker::new(),
            detector,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the enabled flag. Returns true if it changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        info!(
            "Analysis {}",
            if enabled { "started" } else { "stopped" }
        );
        true
    }

    /// Flip the enabled flag, returning the new value.
    pub fn toggle(&mut self) -> bool {
        let enabled = !self.enabled;
        self.set_enabled(enabled);
        enabled
    }

    pub fn skill_level(&self) -> SkillLevel {
        self.skill_level
    }

    /// Change the skill level and recompose advice against a silent
    /// snapshot of `bin_count` bins, returning the text to publish.
    pub fn set_skill_level(&mut self, skill_level: SkillLevel, bin_count: usize) -> String {
        info!("Skill level set to {}", skill_level);
        self.skill_level = skill_level;

        let report = analysis::analyze(&FrequencySnapshot::silent(bin_count));
        advisor::compose(&self.table, self.skill_level, &report.findings)
    }

    pub fn history(&self) -> &NoteHistory {
        self.tracker.history()
    }

    /// Run the band analyzer, composer and pitch tracker over one frame.
    pub fn run_pass(&mut self, frame: &AnalysisFrame) -> TickReport {
        let report = analysis::analyze(&frame.spectrum);
        let advice = advisor::compose(&self.table, self.skill_level, &report.findings);

        let estimate = self.detector.detect(&frame.samples, frame.sample_rate);
        let pitch = self.tracker.observe(estimate);

        debug!(
            "Pass: {} finding(s), pitch {:?}",
            report.findings.len(),
            pitch.map(|p| p.frequency)
        );

        TickReport {
            energies: report.energies,
            findings: report.findings,
            advice,
            pitch_display: pitch.map(|p| p.display()),
            pitch,
            note_history: self.tracker.history().joined(),
            spectrum: frame.spectrum.clone(),
            samples: frame.samples.clone(),
        }
    }
}
