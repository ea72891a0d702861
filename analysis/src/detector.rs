//! Pitch detection over a time-domain buffer.

/// Estimates the fundamental frequency of a buffer of mono samples.
pub trait PitchDetector: Send {
    /// Returns the pitch in Hz, or `None` when no pitch was found.
    fn detect(&mut self, samples: &[f32], sample_rate: u32) -> Option<f32>;
}

/// YIN pitch estimator (de Cheveigne and Kawahara, 2002).
#[derive(Debug, Clone)]
pub struct YinDetector {
    threshold: f32,
    min_freq: f32,
    max_freq: f32,
    /// Frames quieter than this RMS are treated as silence.
    silence_rms: f32,
    diff: Vec<f32>,
    cmnd: Vec<f32>,
}

impl Default for YinDetector {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            min_freq: 60.0,
            max_freq: 2000.0,
            silence_rms: 0.01,
            diff: Vec::new(),
            cmnd: Vec::new(),
        }
    }
}

impl YinDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the search to `[min_freq, max_freq]` Hz.
    pub fn with_range(mut self, min_freq: f32, max_freq: f32) -> Self {
        self.min_freq = min_freq;
        self.max_freq = max_freq;
        self
    }

    fn rms(samples: &[f32]) -> f32 {
        let energy: f32 = samples.iter().map(|s| s * s).sum();
        (energy / samples.len() as f32).sqrt()
    }
}

impl PitchDetector for YinDetector {
    fn detect(&mut self, samples: &[f32], sample_rate: u32) -> Option<f32> {
        let n = samples.len();
        if n < 4 || sample_rate == 0 || Self::rms(samples) < self.silence_rms {
            return None;
        }

        let rate = sample_rate as f32;
        let max_tau = ((rate / self.min_freq) as usize).min(n / 2);
        let min_tau = ((rate / self.max_freq) as usize).max(2);
        if min_tau >= max_tau {
            return None;
        }

        // Squared difference function
        self.diff.clear();
        self.diff.resize(max_tau + 1, 0.0);
        for tau in 1..=max_tau {
            let mut sum = 0.0f32;
            for i in 0..(n - tau) {
                let d = samples[i] - samples[i + tau];
                sum += d * d;
            }
            self.diff[tau] = sum;
        }

        // Cumulative mean normalized difference
        self.cmnd.clear();
        self.cmnd.resize(max_tau + 1, 1.0);
        let mut running = 0.0f32;
        for tau in 1..=max_tau {
            running += self.diff[tau];
            self.cmnd[tau] = self.diff[tau] * tau as f32 / running.max(1e-8);
        }

        // First dip under the threshold, followed down to its local minimum
        let mut tau = min_tau;
        while tau <= max_tau {
            if self.cmnd[tau] < self.threshold {
                while tau < max_tau && self.cmnd[tau + 1] < self.cmnd[tau] {
                    tau += 1;
                }
                break;
            }
            tau += 1;
        }
        if tau > max_tau {
            return None;
        }

        // Parabolic interpolation around the minimum
        let a = self.cmnd[tau - 1];
        let b = self.cmnd[tau];
        let c = self.cmnd.get(tau + 1).copied().unwrap_or(b);
        let denom = a - 2.0 * b + c;
        let refined = if denom.abs() < 1e-8 {
            tau as f32
        } else {
            tau as f32 + (a - c) / (2.0 * denom)
        };

        Some(rate / refined)
    }
}
