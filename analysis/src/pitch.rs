//! Pitch to note conversion and the rolling note history.

use log::{debug, trace};
use std::collections::VecDeque;
use std::fmt;
use tone_core::{Error, NOTE_HISTORY_CAPACITY};

/// Chromatic pitch class names, starting at C.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Reference pitch of A4.
const A4_HZ: f32 = 440.0;
/// MIDI note number of A4.
const A4_MIDI: i32 = 69;

/// A detected note: pitch class plus octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteEvent {
    pub name: &'static str,
    pub octave: i32,
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

/// Nearest equal-tempered note to `frequency`.
pub fn note_from_frequency(frequency: f32) -> Result<NoteEvent, Error> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(Error::InvalidPitch(frequency));
    }

    // Semitones away from A4, rounded to the nearest note.
    let semitones = 12.0 * (frequency / A4_HZ).log2();
    let midi = semitones.round() as i32 + A4_MIDI;

    Ok(NoteEvent {
        name: NOTE_NAMES[midi.rem_euclid(12) as usize],
        octave: midi.div_euclid(12) - 1,
    })
}

/// A successful detection for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchReading {
    pub frequency: f32,
    pub note: NoteEvent,
}

impl PitchReading {
    /// Text shown on the pitch display.
    pub fn display(&self) -> String {
        format!("Pitch: {:.2} Hz ({})", self.frequency, self.note)
    }
}

/// Most recent notes, oldest first.
#[derive(Debug, Clone)]
pub struct NoteHistory {
    notes: VecDeque<NoteEvent>,
    capacity: usize,
}

impl Default for NoteHistory {
    fn default() -> Self {
        Self::with_capacity(NOTE_HISTORY_CAPACITY)
    }
}

impl NoteHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            notes: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a note, dropping the oldest once over capacity.
    pub fn push(&mut self, note: NoteEvent) {
        self.notes.push_back(note);
        while self.notes.len() > self.capacity {
            self.notes.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Notes joined for display, e.g. `"A4, C5, E5"`.
    pub fn joined(&self) -> String {
        self.notes
            .iter()
            .map(|note| note.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Turns per-tick pitch estimates into notes and records them.
#[derive(Debug, Clone, Default)]
pub struct PitchTracker {
    history: NoteHistory,
}

impl PitchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one tick's estimate. `None` and invalid pitches leave the
    /// history untouched and produce no reading.
    pub fn observe(&mut self, pitch: Option<f32>) -> Option<PitchReading> {
        let frequency = pitch?;
        match note_from_frequency(frequency) {
            Ok(note) => {
                trace!("Detected {} at {:.2} Hz", note, frequency);
                self.history.push(note);
                Some(PitchReading { frequency, note })
            }
            Err(e) => {
                debug!("Ignoring pitch estimate: {}", e);
                None
            }
        }
    }

    pub fn history(&self) -> &NoteHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(frequency: f32) -> String {
        note_from_frequency(frequency).unwrap().to_string()
    }

    #[test]
    fn reference_notes() {
        assert_eq!(note(440.0), "A4");
        assert_eq!(note(466.16), "A#4");
        assert_eq!(note(220.0), "A3");
        assert_eq!(note(261.63), "C4");
        assert_eq!(note(523.25), "C5");
        assert_eq!(note(246.94), "B3");
    }

    #[test]
    fn low_pitches_wrap_pitch_class() {
        assert_eq!(note(27.5), "A0");
        assert_eq!(note(16.35), "C0");
        assert_eq!(note(15.43), "B-1");
    }

    #[test]
    fn rounds_to_nearest_semitone() {
        // A quarter tone above A4 still reads as A4, slightly more reads A#4.
        assert_eq!(note(440.0 * 2f32.powf(0.4 / 12.0)), "A4");
        assert_eq!(note(440.0 * 2f32.powf(0.6 / 12.0)), "A#4");
    }

    #[test]
    fn rejects_invalid_pitch() {
        for f in [0.0, -440.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                note_from_frequency(f),
                Err(Error::InvalidPitch(_))
            ));
        }
    }

    #[test]
    fn reading_display() {
        let reading = PitchReading {
            frequency: 440.0,
            note: note_from_frequency(440.0).unwrap(),
        };
        assert_eq!(reading.display(), "Pitch: 440.00 Hz (A4)");
    }

    #[test]
    fn history_keeps_ten_most_recent() {
        let mut tracker = PitchTracker::new();
        // C4 up through B4, twelve semitones.
        let freqs: Vec<f32> = (0..12)
            .map(|i| 261.63 * 2f32.powf(i as f32 / 12.0))
            .collect();
        for f in &freqs {
            assert!(tracker.observe(Some(*f)).is_some());
        }

        let history = tracker.history();
        assert_eq!(history.len(), 10);
        assert_eq!(
            history.joined(),
            "D4, D#4, E4, F4, F#4, G4, G#4, A4, A#4, B4"
        );
    }

    #[test_log::test]
    fn missing_or_invalid_pitch_is_a_no_op() {
        let mut tracker = PitchTracker::new();
        tracker.observe(Some(440.0));

        assert!(tracker.observe(None).is_none());
        assert!(tracker.observe(Some(-1.0)).is_none());
        assert!(tracker.observe(Some(f32::NAN)).is_none());
        assert_eq!(tracker.history().joined(), "A4");
    }
}
