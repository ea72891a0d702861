use analysis::PitchDetector;
use mockall::mock;
use tone_core::{AnalysisFrame, Band, Error, FrameSource};

mock! {
    pub Detector {}
    impl PitchDetector for Detector {
        fn detect(&mut self, samples: &[f32], sample_rate: u32) -> Option<f32>;
    }
}

mock! {
    pub Source {}
    impl FrameSource for Source {
        fn next_frame(&mut self) -> Result<AnalysisFrame, Error>;
        fn bin_count(&self) -> usize;
        fn set_eq_gain(&mut self, band: Band, gain_db: f32) -> f32;
    }
}
