//! Per-tick analysis for EvenTone
//!
//! This crate reduces a frequency snapshot to band energies and imbalance
//! findings, and turns pitch estimates into notes with a rolling history.

pub mod bands;
pub mod detector;
pub mod pitch;

pub use bands::{analyze, band_energies, classify, BandEnergies, BandReport};
pub use detector::{PitchDetector, YinDetector};
pub use pitch::{note_from_frequency, NoteEvent, NoteHistory, PitchReading, PitchTracker};
