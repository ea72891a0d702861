// EvenTone: live EQ suggestions and pitch tracking
// Expose the workspace crates for use in integration tests

pub use advisor;
pub use analysis;
pub use audio;
pub use audio_io;
pub use session;
pub use settings_manager;
pub use tone_core;

// Re-export commonly used types for convenience
pub use advisor::{compose, AdvisoryTable};
pub use analysis::{analyze, PitchTracker, YinDetector};
pub use audio::AudioEngine;
pub use session::{AnalysisCommand, AnalysisEvent, AnalysisHandler, AnalysisSession, TickReport};
pub use tone_core::{Band, EqAction, Error, FrameSource, ImbalanceFinding, SkillLevel};
