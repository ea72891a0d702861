//! The skill × band × action advisory table.

use log::info;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tone_core::{Band, EqAction, Error, SkillLevel};

type Key = (SkillLevel, Band, EqAction);

/// Canonical recommendations, one per skill level, band and action.
const BUILTIN: [(SkillLevel, Band, EqAction, &str); 30] = [
    (SkillLevel::Novice, Band::Low, EqAction::Boost, "Try increasing the low knob slightly to add warmth to your mix. Consider boosting between 80-100Hz."),
    (SkillLevel::Novice, Band::Low, EqAction::Reduce, "The low frequencies are overpowering. Try reducing the low knob slightly."),
    (SkillLevel::Novice, Band::Mid, EqAction::Boost, "Consider boosting the mid knob slightly for better vocal clarity. Aim for around 1kHz."),
    (SkillLevel::Novice, Band::Mid, EqAction::Reduce, "The mid frequencies seem harsh. Reduce the mid knob slightly, focusing on 800-1000Hz."),
    (SkillLevel::Novice, Band::High, EqAction::Boost, "The high end could use a small increase for more brightness. Boost gently around 6-10kHz."),
    (SkillLevel::Novice, Band::High, EqAction::Reduce, "The high end might be too harsh. Reduce the high knob a bit, especially in the 8-12kHz range."),
    (SkillLevel::Beginner, Band::Low, EqAction::Boost, "Boost the low frequencies a bit (80-120Hz) for more warmth."),
    (SkillLevel::Beginner, Band::Low, EqAction::Reduce, "The low frequencies are muddy. Reduce them slightly, especially below 100Hz."),
    (SkillLevel::Beginner, Band::Mid, EqAction::Boost, "Increase the mids (800Hz - 1.5kHz) to add more presence, especially for vocals."),
    (SkillLevel::Beginner, Band::Mid, EqAction::Reduce, "The mids are too boxy. Reduce them in the 500-1000Hz range."),
    (SkillLevel::Beginner, Band::High, EqAction::Boost, "Boost the highs (6-10kHz) for more clarity."),
    (SkillLevel::Beginner, Band::High, EqAction::Reduce, "Reduce the highs to soften the sound, especially if they feel too sharp in the 8-12kHz range."),
    (SkillLevel::Intermediate, Band::Low, EqAction::Boost, "Try a gentle boost around 100Hz for more warmth, and consider using a wide Q for smoother transition."),
    (SkillLevel::Intermediate, Band::Low, EqAction::Reduce, "The low frequencies are overpowering the mix. Consider cutting around 150-300Hz to reduce muddiness."),
    (SkillLevel::Intermediate, Band::Mid, EqAction::Boost, "A slight boost around 1kHz can add presence, especially to vocals or guitars."),
    (SkillLevel::Intermediate, Band::Mid, EqAction::Reduce, "Try a small cut around 800Hz to reduce boxiness. This helps with clarity."),
    (SkillLevel::Intermediate, Band::High, EqAction::Boost, "Boost around 5kHz to 8kHz for more definition, particularly for percussive elements."),
    (SkillLevel::Intermediate, Band::High, EqAction::Reduce, "If there is too much sibilance, try cutting in the 5-7kHz range."),
    (SkillLevel::Advanced, Band::Low, EqAction::Boost, "Experiment with a 2-3dB boost at 80Hz with a wide Q to add punch without creating muddiness."),
    (SkillLevel::Advanced, Band::Low, EqAction::Reduce, "Consider using a high-pass filter at 50Hz to clean up the low end and remove unwanted rumble."),
    (SkillLevel::Advanced, Band::Mid, EqAction::Boost, "Consider a 1-2dB boost at 2.5kHz to bring forward the presence of vocals and lead instruments."),
    (SkillLevel::Advanced, Band::Mid, EqAction::Reduce, "Apply a 2dB cut at 400Hz to reduce boxiness, especially if the mix sounds congested."),
    (SkillLevel::Advanced, Band::High, EqAction::Boost, "Add a high shelf of 2dB at 10kHz for air and openness."),
    (SkillLevel::Advanced, Band::High, EqAction::Reduce, "Use a peak filter to reduce 2-3dB at 6kHz to tame harshness or excessive brightness."),
    (SkillLevel::Expert, Band::Low, EqAction::Boost, "For a more refined low end, use parallel compression on the low frequencies, and boost around 60-80Hz."),
    (SkillLevel::Expert, Band::Low, EqAction::Reduce, "Use multiband compression to dynamically control low-end buildup, focusing around 80-150Hz."),
    (SkillLevel::Expert, Band::Mid, EqAction::Boost, "Experiment with mid-side EQ to enhance the stereo image in the mids. Boost the side signal at 1.5-2kHz."),
    (SkillLevel::Expert, Band::Mid, EqAction::Reduce, "Consider dynamic EQ to attenuate problematic mid frequencies only when they become too prominent, around 400-800Hz."),
    (SkillLevel::Expert, Band::High, EqAction::Boost, "Use a Pultec-style EQ emulation for smooth high-end boost, especially in the 10-12kHz range."),
    (SkillLevel::Expert, Band::High, EqAction::Reduce, "Experiment with a de-esser or dynamic EQ for precise control of harsh sibilant frequencies, particularly in vocals."),
];

/// Complete mapping from (skill, band, action) to a recommendation.
///
/// Every constructor checks that all 30 combinations are present, so
/// [`AdvisoryTable::recommendation`] cannot miss.
#[derive(Debug, Clone)]
pub struct AdvisoryTable {
    /// Indexed by skill level, band, then action discriminant.
    entries: [[[String; 2]; 3]; 5],
}

impl Default for AdvisoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AdvisoryTable {
    /// The canonical table shipped with the application.
    pub fn builtin() -> Self {
        let entries: [[[String; 2]; 3]; 5] = Default::default();
        let mut table = Self { entries };
        for &(skill, band, action, text) in BUILTIN.iter() {
            *table.slot_mut(skill, band, action) = text.to_string();
        }
        table
    }

    fn slot_mut(&mut self, skill: SkillLevel, band: Band, action: EqAction) -> &mut String {
        &mut self.entries[skill as usize][band as usize][action as usize]
    }

    /// Build a table from arbitrary entries, failing on the first gap.
    pub fn from_entries<I>(entries: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (SkillLevel, Band, EqAction, String)>,
    {
        let mut given: HashMap<Key, String> = entries
            .into_iter()
            .map(|(skill, band, action, text)| ((skill, band, action), text))
            .collect();

        let mut table = Self {
            entries: Default::default(),
        };
        for skill in SkillLevel::ALL {
            for band in Band::ALL {
                for action in EqAction::ALL {
                    let text = given.remove(&(skill, band, action)).ok_or_else(|| {
                        Error::Config(format!(
                            "advisory table has no entry for {}.{}.{}",
                            skill, band, action
                        ))
                    })?;
                    *table.slot_mut(skill, band, action) = text;
                }
            }
        }

        Ok(table)
    }

    /// Parse a table from TOML laid out as `[skill.band]` sections with
    /// `boost` and `reduce` keys.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        let parsed: HashMap<String, HashMap<String, HashMap<String, String>>> =
            toml::from_str(contents)
                .map_err(|e| Error::Config(format!("Failed to parse advisory table: {}", e)))?;

        let mut entries = Vec::with_capacity(BUILTIN.len());
        for (skill_key, bands) in parsed {
            let skill = skill_key
                .parse::<SkillLevel>()
                .map_err(|e| Error::Config(e.to_string()))?;
            for (band_key, actions) in bands {
                let band = Band::ALL
                    .into_iter()
                    .find(|b| b.name() == band_key)
                    .ok_or_else(|| Error::Config(format!("Unknown band: {}", band_key)))?;
                for (action_key, text) in actions {
                    let action = EqAction::ALL
                        .into_iter()
                        .find(|a| a.name() == action_key)
                        .ok_or_else(|| {
                            Error::Config(format!("Unknown EQ action: {}", action_key))
                        })?;
                    entries.push((skill, band, action, text));
                }
            }
        }

        Self::from_entries(entries)
    }

    /// Load a table from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read advisory table: {}", e)))?;
        let table = Self::from_toml_str(&contents)?;
        info!("Loaded advisory table from {:?}", path);
        Ok(table)
    }

    /// Base recommendation for one finding at one skill level.
    pub fn recommendation(&self, skill: SkillLevel, band: Band, action: EqAction) -> &str {
        &self.entries[skill as usize][band as usize][action as usize]
    }
}
