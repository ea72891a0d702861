//! Audio subsystem for EvenTone
//!
//! This crate turns raw input from `audio_io` into analysis frames: samples
//! pass through the three-band equalizer, then the spectrum analyser
//! produces the byte frequency snapshot.

pub mod analyser;
pub mod engine;
pub mod eq;

pub use analyser::SpectrumAnalyser;
pub use engine::AudioEngine;
pub use eq::ThreeBandEq;
