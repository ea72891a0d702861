//! Byte frequency snapshots from time-domain samples.
//!
//! Follows the usual real-time analyser recipe: Blackman window, FFT,
//! exponential smoothing across frames, then decibels mapped onto 0-255.

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;
use tone_core::{FrequencySnapshot, FFT_SIZE};

pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;
pub const SMOOTHING: f32 = 0.8;

pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: Vec<f32>,
    buffer: Vec<Complex32>,
    smoothed: Vec<f32>,
    smoothing: f32,
}

impl SpectrumAnalyser {
    pub fn new() -> Self {
        Self::with_fft_size(FFT_SIZE)
    }

    pub fn with_fft_size(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Self {
            fft,
            fft_size,
            window: blackman(fft_size),
            buffer: vec![Complex32::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
            smoothing: SMOOTHING,
        }
    }

    /// Smoothing time constant in `[0, 1)`; 0 disables smoothing.
    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing.clamp(0.0, 0.99);
        self
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Centre frequency of `bin` at the given sample rate.
    pub fn bin_frequency(&self, bin: usize, sample_rate: u32) -> f32 {
        bin as f32 * sample_rate as f32 / self.fft_size as f32
    }

    /// Analyse the most recent `fft_size` samples. Shorter input is treated
    /// as preceded by silence.
    pub fn process(&mut self, samples: &[f32]) -> FrequencySnapshot {
        let n = self.fft_size;
        let take = samples.len().min(n);
        let recent = &samples[samples.len() - take..];
        let pad = n - take;

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex32::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let scale = 1.0 / n as f32;
        let smoothing = self.smoothing;
        let range = MAX_DECIBELS - MIN_DECIBELS;
        let bins = self
            .smoothed
            .iter_mut()
            .zip(self.buffer.iter())
            .map(|(previous, value)| {
                let magnitude = value.norm() * scale;
                *previous = smoothing * *previous + (1.0 - smoothing) * magnitude;

                let db = 20.0 * previous.log10();
                let scaled = 255.0 / range * (db - MIN_DECIBELS);
                if scaled.is_nan() {
                    0
                } else {
                    scaled.clamp(0.0, 255.0) as u8
                }
            })
            .collect();

        FrequencySnapshot::new(bins)
    }
}

impl Default for SpectrumAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

fn blackman(n: usize) -> Vec<f32> {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;

    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 48000;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / RATE as f32).sin())
            .collect()
    }

    fn peak_bin(snapshot: &FrequencySnapshot) -> usize {
        snapshot
            .bins()
            .iter()
            .enumerate()
            .max_by_key(|(_, &v)| v)
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn silence_is_all_zero() {
        let mut analyser = SpectrumAnalyser::new();
        let snapshot = analyser.process(&vec![0.0; FFT_SIZE]);
        assert_eq!(snapshot.len(), 1024);
        assert!(snapshot.bins().iter().all(|&b| b == 0));
    }

    #[test]
    fn tone_peaks_at_its_bin() {
        let mut analyser = SpectrumAnalyser::new().with_smoothing(0.0);
        let tone: Vec<f32> = sine(1000.0, FFT_SIZE).iter().map(|s| s * 0.05).collect();
        let snapshot = analyser.process(&tone);

        // 1 kHz falls between bins 42 and 43 at 48 kHz / 2048.
        let peak = peak_bin(&snapshot);
        assert!((42..=43).contains(&peak), "peak at bin {}", peak);
        assert!(snapshot.bins()[peak] > 180);
        assert!((analyser.bin_frequency(peak, RATE) - 1000.0).abs() < 25.0);
    }

    #[test]
    fn smoothing_lags_a_sudden_tone() {
        // Quiet enough that neither frame clips at 255.
        let tone: Vec<f32> = sine(1000.0, FFT_SIZE).iter().map(|s| s * 0.01).collect();

        let mut smoothed = SpectrumAnalyser::new();
        let first = smoothed.process(&tone);
        let second = smoothed.process(&tone);

        let peak = peak_bin(&second);
        assert!(first.bins()[peak] < second.bins()[peak]);
    }

    #[test]
    fn short_input_is_padded() {
        let mut analyser = SpectrumAnalyser::new();
        let snapshot = analyser.process(&sine(440.0, 100));
        assert_eq!(snapshot.len(), analyser.bin_count());
    }
}
