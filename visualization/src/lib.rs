//! Terminal visualizations for EvenTone
//!
//! ratatui widgets for the frequency bars, the waveform and the scrolling
//! spectrogram, plus the HSL colouring they share.

mod bars;
mod color;
mod spectrogram;
mod waveform;

pub use bars::FrequencyBars;
pub use color::{hsl_to_rgb, hue_color};
pub use spectrogram::{Spectrogram, SpectrogramHistory};
pub use waveform::Waveform;

/// Largest value in each of `columns` equal slices of `data`.
///
/// Returns fewer entries than `columns` when `data` is shorter.
pub(crate) fn downsample_max(data: &[u8], columns: usize) -> Vec<u8> {
    if data.is_empty() || columns == 0 {
        return Vec::new();
    }
    let columns = columns.min(data.len());
    (0..columns)
        .map(|c| {
            let start = c * data.len() / columns;
            let end = ((c + 1) * data.len() / columns).max(start + 1);
            data[start..end].iter().copied().max().unwrap_or(0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downsample_keeps_peaks() {
        let data = [0, 10, 0, 0, 200, 0, 5, 5];
        assert_eq!(downsample_max(&data, 4), vec![10, 0, 200, 5]);
    }

    #[test]
    fn downsample_never_stretches() {
        assert_eq!(downsample_max(&[1, 2, 3], 10), vec![1, 2, 3]);
        assert!(downsample_max(&[], 10).is_empty());
    }
}
