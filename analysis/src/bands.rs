//! Band energy computation and imbalance classification.

use log::debug;
use std::ops::Range;
use tone_core::{Band, EqAction, Error, FrequencySnapshot, ImbalanceFinding};

/// First bin of the mid band.
pub const MID_START: usize = 20;
/// First bin of the high band.
pub const HIGH_START: usize = 60;

/// A band louder than both partners by this factor should be reduced.
const REDUCE_RATIO: f32 = 1.5;
/// A band quieter than both partners by this factor should be boosted.
const BOOST_RATIO: f32 = 0.5;

/// Mean magnitude of each band in one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandEnergies {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl BandEnergies {
    pub fn new(low: f32, mid: f32, high: f32) -> Self {
        Self { low, mid, high }
    }

    pub fn get(&self, band: Band) -> f32 {
        match band {
            Band::Low => self.low,
            Band::Mid => self.mid,
            Band::High => self.high,
        }
    }

    /// Energies of the two bands other than `band`.
    fn partners(&self, band: Band) -> (f32, f32) {
        match band {
            Band::Low => (self.mid, self.high),
            Band::Mid => (self.low, self.high),
            Band::High => (self.low, self.mid),
        }
    }
}

/// Result of analysing one snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BandReport {
    /// `None` when the snapshot is too short to fill the high band.
    pub energies: Option<BandEnergies>,
    pub findings: Vec<ImbalanceFinding>,
}

/// Bin range covered by `band` in a snapshot of `bin_count` bins.
pub fn band_range(band: Band, bin_count: usize) -> Range<usize> {
    match band {
        Band::Low => 0..MID_START,
        Band::Mid => MID_START..HIGH_START,
        Band::High => HIGH_START..bin_count,
    }
}

fn mean(bins: &[u8]) -> f32 {
    let sum: u32 = bins.iter().map(|&b| b as u32).sum();
    sum as f32 / bins.len() as f32
}

/// Average each band of the snapshot.
///
/// Fails with [`Error::InvalidInput`] when the snapshot has no bins past the
/// mid band, since the high band average would be undefined.
pub fn band_energies(snapshot: &FrequencySnapshot) -> Result<BandEnergies, Error> {
    let n = snapshot.len();
    if n <= HIGH_START {
        return Err(Error::InvalidInput(format!(
            "snapshot has {} bins, need more than {}",
            n, HIGH_START
        )));
    }

    let bins = snapshot.bins();
    Ok(BandEnergies {
        low: mean(&bins[band_range(Band::Low, n)]),
        mid: mean(&bins[band_range(Band::Mid, n)]),
        high: mean(&bins[band_range(Band::High, n)]),
    })
}

/// Compare every band against the other two, in low/mid/high order.
pub fn classify(energies: &BandEnergies) -> Vec<ImbalanceFinding> {
    Band::ALL
        .iter()
        .filter_map(|&band| {
            let x = energies.get(band);
            let (y, z) = energies.partners(band);

            if x > y * REDUCE_RATIO && x > z * REDUCE_RATIO {
                Some(ImbalanceFinding::new(band, EqAction::Reduce))
            } else if x < y * BOOST_RATIO && x < z * BOOST_RATIO {
                Some(ImbalanceFinding::new(band, EqAction::Boost))
            } else {
                None
            }
        })
        .collect()
}

/// Energies and findings for one snapshot. A degenerate snapshot produces no
/// findings rather than an error.
pub fn analyze(snapshot: &FrequencySnapshot) -> BandReport {
    match band_energies(snapshot) {
        Ok(energies) => BandReport {
            findings: classify(&energies),
            energies: Some(energies),
        },
        Err(e) => {
            debug!("Skipping band classification: {}", e);
            BandReport::default()
        }
    }
}
