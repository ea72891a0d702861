//! Audio input handling for EvenTone
//!
//! This crate interfaces with audio hardware using cpal, and provides a
//! synthetic source for running without a microphone.

mod capture;
mod synth;

pub use capture::{list_input_devices, CaptureStream, MicrophoneCapture};
pub use synth::SyntheticSource;

use tone_core::{AudioBuffer, Error};

/// A stream of mono samples at a fixed rate.
pub trait SampleSource: Send {
    fn sample_rate(&self) -> u32;

    /// Append every sample available right now to `out`, returning how many
    /// were added.
    fn read(&mut self, out: &mut AudioBuffer) -> Result<usize, Error>;
}
