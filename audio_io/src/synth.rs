use crate::SampleSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;
use std::time::Instant;
use tone_core::{AudioBuffer, Error, FFT_SIZE, SAMPLE_RATE};

/// Sine tone over a faint noise floor, paced by wall-clock time.
///
/// Every read returns at least `min_block` samples so a caller always has a
/// full analysis window, even when polled faster than real time.
pub struct SyntheticSource {
    sample_rate: u32,
    frequency: f32,
    amplitude: f32,
    noise: f32,
    phase: f32,
    min_block: usize,
    last_read: Instant,
    rng: StdRng,
}

impl SyntheticSource {
    pub fn new(frequency: f32) -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            frequency,
            amplitude: 0.5,
            noise: 0.01,
            phase: 0.0,
            min_block: FFT_SIZE,
            last_read: Instant::now(),
            rng: StdRng::seed_from_u64(0x5eed),
        }
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Peak level of the uniform noise added to the tone.
    pub fn with_noise(mut self, noise: f32) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_min_block(mut self, min_block: usize) -> Self {
        self.min_block = min_block;
        self
    }

    fn next_sample(&mut self) -> f32 {
        let step = 2.0 * PI * self.frequency / self.sample_rate as f32;
        self.phase = (self.phase + step) % (2.0 * PI);

        let noise = if self.noise > 0.0 {
            self.rng.gen_range(-self.noise..self.noise)
        } else {
            0.0
        };
        self.phase.sin() * self.amplitude + noise
    }
}

impl SampleSource for SyntheticSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, out: &mut AudioBuffer) -> Result<usize, Error> {
        let elapsed = self.last_read.elapsed().as_secs_f32().min(1.0);
        self.last_read = Instant::now();

        let count = ((elapsed * self.sample_rate as f32) as usize).max(self.min_block);
        out.reserve(count);
        for _ in 0..count {
            let sample = self.next_sample();
            out.push(sample);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_at_least_a_window() {
        let mut source = SyntheticSource::new(440.0);
        let mut buffer = Vec::new();
        let read = source.read(&mut buffer).unwrap();
        assert!(read >= FFT_SIZE);
        assert_eq!(buffer.len(), read);
    }

    #[test]
    fn level_stays_within_amplitude_plus_noise() {
        let mut source = SyntheticSource::new(220.0)
            .with_amplitude(0.25)
            .with_noise(0.05);
        let mut buffer = Vec::new();
        source.read(&mut buffer).unwrap();

        let peak = buffer.iter().fold(0.0f32, |a, &b| a.max(b.abs()));
        assert!(peak <= 0.3 + 1e-6);
        assert!(peak > 0.2);
    }

    #[test]
    fn phase_is_continuous_between_reads() {
        let mut source = SyntheticSource::new(100.0).with_noise(0.0);
        let mut first = Vec::new();
        let mut second = Vec::new();
        source.read(&mut first).unwrap();
        source.read(&mut second).unwrap();

        // Adjacent samples of a 100 Hz tone at 48 kHz differ by well under 0.01.
        let last = first[first.len() - 1];
        assert!((second[0] - last).abs() < 0.01);
    }
}
