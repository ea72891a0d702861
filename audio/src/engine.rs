use crate::{SpectrumAnalyser, ThreeBandEq};
use audio_io::SampleSource;
use log::{debug, trace};
use tone_core::{AnalysisFrame, AudioBuffer, Band, Error, FrameSource};

/// Pulls samples from a source, runs them through the equalizer and keeps a
/// rolling analysis window for the spectrum analyser.
pub struct AudioEngine {
    source: Box<dyn SampleSource>,
    eq: ThreeBandEq,
    analyser: SpectrumAnalyser,
    window: AudioBuffer,
    scratch: AudioBuffer,
}

impl AudioEngine {
    pub fn new(source: Box<dyn SampleSource>) -> Self {
        let eq = ThreeBandEq::new(source.sample_rate());
        let analyser = SpectrumAnalyser::new();
        let window = Vec::with_capacity(analyser.fft_size());

        Self {
            source,
            eq,
            analyser,
            window,
            scratch: Vec::new(),
        }
    }

    /// Start with the given low, mid and high gains in dB.
    pub fn with_gains(mut self, low_db: f32, mid_db: f32, high_db: f32) -> Self {
        self.eq.set_gain(Band::Low, low_db);
        self.eq.set_gain(Band::Mid, mid_db);
        self.eq.set_gain(Band::High, high_db);
        self
    }

    pub fn eq_gain(&self, band: Band) -> f32 {
        self.eq.gain(band)
    }
}

impl FrameSource for AudioEngine {
    fn next_frame(&mut self) -> Result<AnalysisFrame, Error> {
        let sample_rate = self.source.sample_rate();
        self.eq.set_sample_rate(sample_rate);

        self.scratch.clear();
        let read = self.source.read(&mut self.scratch)?;
        trace!("Engine pulled {} samples", read);

        self.eq.process_in_place(&mut self.scratch);

        let window_len = self.analyser.fft_size();
        self.window.extend_from_slice(&self.scratch);
        if self.window.len() > window_len {
            let excess = self.window.len() - window_len;
            self.window.drain(..excess);
        }

        let spectrum = self.analyser.process(&self.window);

        Ok(AnalysisFrame {
            spectrum,
            samples: self.window.clone(),
            sample_rate,
        })
    }

    fn bin_count(&self) -> usize {
        self.analyser.bin_count()
    }

    fn set_eq_gain(&mut self, band: Band, gain_db: f32) -> f32 {
        let applied = self.eq.set_gain(band, gain_db);
        debug!("Engine EQ now {:+.1} dB on {} band", applied, band);
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audio_io::SyntheticSource;
    use tone_core::{BIN_COUNT, FFT_SIZE, SAMPLE_RATE};

    /// Hands out a fixed block per read.
    struct FixedSource {
        block: Vec<f32>,
    }

    impl SampleSource for FixedSource {
        fn sample_rate(&self) -> u32 {
            SAMPLE_RATE
        }

        fn read(&mut self, out: &mut AudioBuffer) -> Result<usize, Error> {
            out.extend_from_slice(&self.block);
            Ok(self.block.len())
        }
    }

    struct FailingSource;

    impl SampleSource for FailingSource {
        fn sample_rate(&self) -> u32 {
            SAMPLE_RATE
        }

        fn read(&mut self, _out: &mut AudioBuffer) -> Result<usize, Error> {
            Err(Error::Audio("device unplugged".to_string()))
        }
    }

    #[test_log::test]
    fn frame_has_full_window_and_bins() {
        let mut engine = AudioEngine::new(Box::new(SyntheticSource::new(440.0)));
        let frame = engine.next_frame().unwrap();

        assert_eq!(frame.samples.len(), FFT_SIZE);
        assert_eq!(frame.spectrum.len(), BIN_COUNT);
        assert_eq!(frame.sample_rate, SAMPLE_RATE);
        assert_eq!(engine.bin_count(), BIN_COUNT);
    }

    #[test]
    fn window_rolls_over_small_blocks() {
        let mut engine = AudioEngine::new(Box::new(FixedSource {
            block: vec![0.1; 512],
        }));

        let lens: Vec<usize> = (0..6)
            .map(|_| engine.next_frame().unwrap().samples.len())
            .collect();
        assert_eq!(lens, vec![512, 1024, 1536, 2048, 2048, 2048]);
    }

    #[test]
    fn eq_gain_is_clamped_and_remembered() {
        let mut engine = AudioEngine::new(Box::new(SyntheticSource::new(440.0)));
        assert_eq!(engine.set_eq_gain(Band::High, 30.0), 12.0);
        assert_eq!(engine.eq_gain(Band::High), 12.0);

        let engine = engine.with_gains(-3.0, 0.0, 1.5);
        assert_eq!(engine.eq_gain(Band::Low), -3.0);
        assert_eq!(engine.eq_gain(Band::High), 1.5);
    }

    #[test]
    fn low_cut_lowers_bass_bins() {
        let source = || {
            SyntheticSource::new(100.0)
                .with_amplitude(0.01)
                .with_noise(0.0)
                .with_min_block(FFT_SIZE * 4)
        };

        let mut flat = AudioEngine::new(Box::new(source()));
        let mut cut = AudioEngine::new(Box::new(source())).with_gains(-12.0, 0.0, 0.0);

        // 100 Hz sits around bin 4.
        let flat_bass = flat.next_frame().unwrap().spectrum.bins()[4];
        let cut_bass = cut.next_frame().unwrap().spectrum.bins()[4];
        assert!(cut_bass < flat_bass, "{} !< {}", cut_bass, flat_bass);
    }

    #[test]
    fn source_errors_propagate() {
        let mut engine = AudioEngine::new(Box::new(FailingSource));
        assert!(matches!(engine.next_frame(), Err(Error::Audio(_))));
    }
}
