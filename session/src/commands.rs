use crate::TickReport;
use tone_core::{Band, SkillLevel};

/// Commands sent from the UI to the analysis handler
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisCommand {
    /// Begin periodic analysis passes
    Start,

    /// Stop after the pass in flight, if any
    Stop,

    /// Start if stopped, stop if running
    Toggle,

    /// Change the wording tier of suggestions
    SetSkillLevel(SkillLevel),

    /// Adjust one equalizer band
    SetEqGain { band: Band, gain_db: f32 },

    /// Shutdown the handler
    Shutdown,
}

/// Events sent from the analysis handler to the UI
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    /// A pass completed
    Tick(TickReport),

    /// Suggestion text to show right away, outside a pass
    AdviceUpdated(String),

    /// Analysis was started or stopped
    StateChanged { enabled: bool },

    /// An equalizer gain was applied (after clamping)
    EqGainChanged { band: Band, gain_db: f32 },

    /// The frame source failed this tick
    SourceError(String),
}
