//! Terminal application state.

use analysis::BandEnergies;
use audio::eq::MAX_GAIN_DB;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use log::{debug, warn};
use session::{AnalysisCommand, AnalysisEvent};
use settings_manager::{ConfigManager, EqSettings};
use std::time::{Duration, Instant};
use tone_core::{Band, SkillLevel};
use visualization::SpectrogramHistory;

/// How long a status notification stays on screen.
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

pub const MIC_CONNECTED: &str = "Microphone connected successfully for EvenTone.";
pub const MIC_ERROR: &str = "Error accessing microphone. Please check permissions.";

/// One step of an EQ key press, in dB.
const EQ_STEP_DB: f32 = 1.0;

/// Snapshots kept for the spectrogram.
const SPECTROGRAM_COLUMNS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    shown_at: Instant,
}

/// App state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Config manager instance
    pub config: ConfigManager,
    /// Name of the input shown in the header
    pub source_label: String,
    pub enabled: bool,
    pub advice: String,
    pub pitch_display: String,
    pub note_history: String,
    pub energies: Option<BandEnergies>,
    pub spectrum: Vec<u8>,
    pub samples: Vec<f32>,
    pub spectrogram: SpectrogramHistory,
    /// Gains sent to the handler, ahead of its confirmations
    requested_eq: EqSettings,
    notification: Option<Notification>,
}

impl App {
    pub fn new(config: ConfigManager, source_label: String) -> Self {
        let requested_eq = config.settings().eq;
        Self {
            should_quit: false,
            config,
            source_label,
            enabled: false,
            advice: String::new(),
            pitch_display: String::new(),
            note_history: String::new(),
            energies: None,
            spectrum: Vec::new(),
            samples: Vec::new(),
            spectrogram: SpectrogramHistory::new(SPECTROGRAM_COLUMNS),
            requested_eq,
            notification: None,
        }
    }

    pub fn skill_level(&self) -> SkillLevel {
        self.config.settings().skill_level
    }

    pub fn eq_gain(&self, band: Band) -> f32 {
        self.config.settings().eq.gain(band)
    }

    /// Label of the start/stop control.
    pub fn toggle_label(&self) -> &'static str {
        if self.enabled {
            "Stop EvenTone Analysis"
        } else {
            "Start EvenTone Analysis"
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) {
        self.notify_at(message, kind, Instant::now());
    }

    fn notify_at(&mut self, message: impl Into<String>, kind: NotificationKind, now: Instant) {
        self.notification = Some(Notification {
            message: message.into(),
            kind,
            shown_at: now,
        });
    }

    /// The notification to show at `now`, if it has not expired.
    pub fn notification(&self, now: Instant) -> Option<&Notification> {
        self.notification
            .as_ref()
            .filter(|n| now.duration_since(n.shown_at) < NOTIFICATION_TIMEOUT)
    }

    /// Handle input events, returning a command for the analysis handler
    pub fn handle_event(&mut self, event: Event) -> Option<AnalysisCommand> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<AnalysisCommand> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Char(' ') => Some(AnalysisCommand::Toggle),
            KeyCode::Char('s') => self.change_skill(self.skill_level().next()),
            KeyCode::Char('S') => self.change_skill(self.skill_level().previous()),
            KeyCode::Char('1') => self.nudge_eq(Band::Low, EQ_STEP_DB),
            KeyCode::Char('!') => self.nudge_eq(Band::Low, -EQ_STEP_DB),
            KeyCode::Char('2') => self.nudge_eq(Band::Mid, EQ_STEP_DB),
            KeyCode::Char('@') => self.nudge_eq(Band::Mid, -EQ_STEP_DB),
            KeyCode::Char('3') => self.nudge_eq(Band::High, EQ_STEP_DB),
            KeyCode::Char('#') => self.nudge_eq(Band::High, -EQ_STEP_DB),
            _ => None,
        }
    }

    fn change_skill(&mut self, level: SkillLevel) -> Option<AnalysisCommand> {
        self.config.settings_mut().skill_level = level;
        Some(AnalysisCommand::SetSkillLevel(level))
    }

    fn nudge_eq(&mut self, band: Band, step: f32) -> Option<AnalysisCommand> {
        let gain_db = (self.requested_eq.gain(band) + step).clamp(-MAX_GAIN_DB, MAX_GAIN_DB);
        self.requested_eq.set_gain(band, gain_db);
        Some(AnalysisCommand::SetEqGain { band, gain_db })
    }

    /// Apply an event from the analysis handler
    pub fn handle_analysis_event(&mut self, event: AnalysisEvent) {
        match event {
            AnalysisEvent::Tick(report) => {
                self.advice = report.advice;
                if let Some(pitch) = report.pitch_display {
                    self.pitch_display = pitch;
                }
                self.note_history = report.note_history;
                self.energies = report.energies;
                self.spectrogram.push(report.spectrum.bins());
                self.spectrum = report.spectrum.bins().to_vec();
                self.samples = report.samples;
            }
            AnalysisEvent::AdviceUpdated(advice) => self.advice = advice,
            AnalysisEvent::StateChanged { enabled } => {
                debug!("Analysis enabled: {}", enabled);
                self.enabled = enabled;
            }
            AnalysisEvent::EqGainChanged { band, gain_db } => {
                self.config.settings_mut().eq.set_gain(band, gain_db);
                self.requested_eq.set_gain(band, gain_db);
            }
            AnalysisEvent::SourceError(message) => {
                warn!("Audio source error: {}", message);
                self.notify(MIC_ERROR, NotificationKind::Error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor::BALANCED_MESSAGE;
    use crossterm::event::KeyModifiers;
    use session::TickReport;
    use tempfile::TempDir;
    use tone_core::FrequencySnapshot;

    fn test_app() -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::with_file(dir.path().join("config.toml")).unwrap();
        (App::new(config, "Demo tone".to_string()), dir)
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_quit_event_handling() {
        let (mut app, _dir) = test_app();

        assert!(app.handle_event(key('q')).is_none());
        assert!(app.should_quit);

        app.should_quit = false;
        app.handle_event(Event::Key(KeyEvent::from(KeyCode::Esc)));
        assert!(app.should_quit);

        app.should_quit = false;
        app.handle_event(key('x'));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_space_toggles() {
        let (mut app, _dir) = test_app();
        assert_eq!(app.toggle_label(), "Start EvenTone Analysis");
        assert_eq!(app.handle_event(key(' ')), Some(AnalysisCommand::Toggle));

        app.handle_analysis_event(AnalysisEvent::StateChanged { enabled: true });
        assert_eq!(app.toggle_label(), "Stop EvenTone Analysis");
    }

    #[test]
    fn test_skill_keys_cycle() {
        let (mut app, _dir) = test_app();

        assert_eq!(
            app.handle_event(key('s')),
            Some(AnalysisCommand::SetSkillLevel(SkillLevel::Beginner))
        );
        assert_eq!(app.skill_level(), SkillLevel::Beginner);

        app.handle_event(key('S'));
        app.handle_event(key('S'));
        assert_eq!(app.skill_level(), SkillLevel::Expert);
    }

    #[test]
    fn test_eq_keys_step_from_applied_gain() {
        let (mut app, _dir) = test_app();

        assert_eq!(
            app.handle_event(key('2')),
            Some(AnalysisCommand::SetEqGain {
                band: Band::Mid,
                gain_db: 1.0
            })
        );
        // Gains only change once the handler confirms them
        assert_eq!(app.eq_gain(Band::Mid), 0.0);

        app.handle_analysis_event(AnalysisEvent::EqGainChanged {
            band: Band::High,
            gain_db: 12.0,
        });
        assert_eq!(
            app.handle_event(key('#')),
            Some(AnalysisCommand::SetEqGain {
                band: Band::High,
                gain_db: 11.0
            })
        );
    }

    #[test]
    fn test_eq_presses_accumulate_before_confirmation() {
        let (mut app, _dir) = test_app();

        app.handle_event(key('1'));
        assert_eq!(
            app.handle_event(key('1')),
            Some(AnalysisCommand::SetEqGain {
                band: Band::Low,
                gain_db: 2.0
            })
        );

        app.handle_analysis_event(AnalysisEvent::EqGainChanged {
            band: Band::Low,
            gain_db: 1.0,
        });
        app.handle_analysis_event(AnalysisEvent::EqGainChanged {
            band: Band::Low,
            gain_db: 2.0,
        });
        assert_eq!(app.eq_gain(Band::Low), 2.0);

        // Requests stop at the clamp instead of running past it
        for _ in 0..20 {
            app.handle_event(key('!'));
        }
        assert_eq!(
            app.handle_event(key('!')),
            Some(AnalysisCommand::SetEqGain {
                band: Band::Low,
                gain_db: -MAX_GAIN_DB
            })
        );
    }

    #[test]
    fn test_tick_updates_displays() {
        let (mut app, _dir) = test_app();
        let report = TickReport {
            energies: None,
            findings: Vec::new(),
            advice: BALANCED_MESSAGE.to_string(),
            pitch: None,
            pitch_display: Some("Pitch: 440.00 Hz (A4)".to_string()),
            note_history: "A4".to_string(),
            spectrum: FrequencySnapshot::silent(8),
            samples: vec![0.0; 16],
        };
        app.handle_analysis_event(AnalysisEvent::Tick(report.clone()));

        // A tick without a pitch keeps the last reading
        let mut quiet = report;
        quiet.pitch_display = None;
        app.handle_analysis_event(AnalysisEvent::Tick(quiet));

        assert_eq!(app.advice, BALANCED_MESSAGE);
        assert_eq!(app.pitch_display, "Pitch: 440.00 Hz (A4)");
        assert_eq!(app.note_history, "A4");
        assert_eq!(app.spectrum.len(), 8);
        assert_eq!(app.spectrogram.len(), 2);
    }

    #[test]
    fn test_notifications_expire() {
        let (mut app, _dir) = test_app();
        let start = Instant::now();
        app.notify_at(MIC_CONNECTED, NotificationKind::Success, start);

        let shown = app.notification(start + Duration::from_secs(4)).unwrap();
        assert_eq!(shown.message, MIC_CONNECTED);
        assert!(app.notification(start + NOTIFICATION_TIMEOUT).is_none());
    }

    #[test]
    fn test_source_error_notifies() {
        let (mut app, _dir) = test_app();
        app.handle_analysis_event(AnalysisEvent::SourceError("boom".to_string()));
        let shown = app.notification(Instant::now()).unwrap();
        assert_eq!(shown.kind, NotificationKind::Error);
        assert_eq!(shown.message, MIC_ERROR);
    }
}
