//! Three cascaded biquads: low shelf, mid peak and high shelf.

use log::debug;
use std::f32::consts::PI;
use tone_core::Band;

pub const LOW_SHELF_HZ: f32 = 320.0;
pub const MID_PEAK_HZ: f32 = 1000.0;
pub const HIGH_SHELF_HZ: f32 = 3200.0;
const MID_PEAK_Q: f32 = 1.0;

/// Gains are limited to +/- this many dB.
pub const MAX_GAIN_DB: f32 = 12.0;

#[derive(Debug, Clone, Copy)]
enum FilterKind {
    LowShelf,
    Peaking,
    HighShelf,
}

#[derive(Debug, Clone)]
struct BiquadFilter {
    b0: f32,
    b1: f32,
    b2: f32, // Numerator coefficients
    a1: f32,
    a2: f32, // Denominator coefficients

    x1: f32,
    x2: f32, // Previous inputs
    y1: f32,
    y2: f32, // Previous outputs
}

impl BiquadFilter {
    fn identity() -> Self {
        Self::from_coefficients((1.0, 0.0, 0.0, 0.0, 0.0))
    }

    fn from_coefficients((b0, b1, b2, a1, a2): (f32, f32, f32, f32, f32)) -> Self {
        Self {
            b0,
            b1,
            b2,
            a1,
            a2,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Swap coefficients while keeping the filter state, so gain changes
    /// do not click.
    fn set_coefficients(&mut self, (b0, b1, b2, a1, a2): (f32, f32, f32, f32, f32)) {
        self.b0 = b0;
        self.b1 = b1;
        self.b2 = b2;
        self.a1 = a1;
        self.a2 = a2;
    }

    fn process(&mut self, input: f32) -> f32 {
        // Direct Form 1
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Normalised (b0, b1, b2, a1, a2) after the Audio EQ Cookbook.
fn coefficients(
    kind: FilterKind,
    sample_rate: f32,
    frequency: f32,
    gain_db: f32,
) -> (f32, f32, f32, f32, f32) {
    let amp = 10.0f32.powf(gain_db / 40.0);
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = omega.cos();
    let sin_omega = omega.sin();

    let (b0, b1, b2, a0, a1, a2) = match kind {
        FilterKind::Peaking => {
            let alpha = sin_omega / (2.0 * MID_PEAK_Q);
            (
                1.0 + alpha * amp,
                -2.0 * cos_omega,
                1.0 - alpha * amp,
                1.0 + alpha / amp,
                -2.0 * cos_omega,
                1.0 - alpha / amp,
            )
        }
        FilterKind::LowShelf | FilterKind::HighShelf => {
            // Shelf slope of 1
            let alpha = sin_omega / 2.0 * 2.0f32.sqrt();
            let two_sqrt_amp_alpha = 2.0 * amp.sqrt() * alpha;
            let sign = if matches!(kind, FilterKind::LowShelf) { 1.0 } else { -1.0 };
            (
                amp * ((amp + 1.0) - sign * (amp - 1.0) * cos_omega + two_sqrt_amp_alpha),
                sign * 2.0 * amp * ((amp - 1.0) - sign * (amp + 1.0) * cos_omega),
                amp * ((amp + 1.0) - sign * (amp - 1.0) * cos_omega - two_sqrt_amp_alpha),
                (amp + 1.0) + sign * (amp - 1.0) * cos_omega + two_sqrt_amp_alpha,
                -sign * 2.0 * ((amp - 1.0) + sign * (amp + 1.0) * cos_omega),
                (amp + 1.0) + sign * (amp - 1.0) * cos_omega - two_sqrt_amp_alpha,
            )
        }
    };

    (b0 / a0, b1 / a0, b2 / a0, a1 / a0, a2 / a0)
}

/// Low shelf at 320 Hz, peak at 1 kHz and high shelf at 3.2 kHz in series.
#[derive(Debug, Clone)]
pub struct ThreeBandEq {
    sample_rate: f32,
    gains: [f32; 3],
    filters: [BiquadFilter; 3],
}

impl ThreeBandEq {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            gains: [0.0; 3],
            filters: [
                BiquadFilter::identity(),
                BiquadFilter::identity(),
                BiquadFilter::identity(),
            ],
        }
    }

    fn index(band: Band) -> usize {
        match band {
            Band::Low => 0,
            Band::Mid => 1,
            Band::High => 2,
        }
    }

    fn kind(band: Band) -> (FilterKind, f32) {
        match band {
            Band::Low => (FilterKind::LowShelf, LOW_SHELF_HZ),
            Band::Mid => (FilterKind::Peaking, MID_PEAK_HZ),
            Band::High => (FilterKind::HighShelf, HIGH_SHELF_HZ),
        }
    }

    pub fn gain(&self, band: Band) -> f32 {
        self.gains[Self::index(band)]
    }

    /// Set one band's gain in dB, clamped to +/-12 dB. Returns the gain applied.
    pub fn set_gain(&mut self, band: Band, gain_db: f32) -> f32 {
        let gain_db = if gain_db.is_finite() {
            gain_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB)
        } else {
            0.0
        };

        let idx = Self::index(band);
        self.gains[idx] = gain_db;

        let (kind, frequency) = Self::kind(band);
        self.filters[idx].set_coefficients(coefficients(kind, self.sample_rate, frequency, gain_db));

        debug!("EQ {} band set to {:+.1} dB", band, gain_db);
        gain_db
    }

    /// Change the sample rate, recomputing every filter.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        let sample_rate = sample_rate as f32;
        if (self.sample_rate - sample_rate).abs() > 0.1 {
            self.sample_rate = sample_rate;
            for band in Band::ALL {
                let gain = self.gain(band);
                self.set_gain(band, gain);
                self.filters[Self::index(band)].reset();
            }
        }
    }

    pub fn process(&mut self, sample: f32) -> f32 {
        self.filters
            .iter_mut()
            .fold(sample, |acc, filter| filter.process(acc))
    }

    pub fn process_in_place(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}
