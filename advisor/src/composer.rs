//! Turns band findings into the suggestion text shown to the operator.

use crate::table::AdvisoryTable;
use tone_core::{Band, EqAction, ImbalanceFinding, SkillLevel};

/// Shown when no band is out of balance.
pub const BALANCED_MESSAGE: &str =
    "The frequency balance looks good. No major EQ adjustments needed.";

/// Sentence appended after every recommendation, chosen by action.
pub fn elaboration(band: Band, action: EqAction) -> String {
    match action {
        EqAction::Boost => format!(
            " You could also use compression to balance out the dynamics if you are boosting this frequency range, particularly at {} frequencies.",
            band
        ),
        EqAction::Reduce => " Try using a notch filter if the issue persists, as it can help in precisely reducing problem frequencies without affecting the surrounding sound.".to_string(),
    }
}

/// Build the advice text for one tick's findings.
pub fn compose(table: &AdvisoryTable, skill: SkillLevel, findings: &[ImbalanceFinding]) -> String {
    if findings.is_empty() {
        return BALANCED_MESSAGE.to_string();
    }

    let mut advice = String::new();
    for finding in findings {
        advice.push_str(table.recommendation(skill, finding.band, finding.action));
        advice.push_str(&elaboration(finding.band, finding.action));
        advice.push(' ');
    }
    advice
}
