use crate::catalog::{MAX_TOTAL, QUESTION_COUNT};
use crate::model::Scores;
use serde::Serialize;

/// Quality band of a percentage score, ordered best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Improve,
}

impl QualityLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "ดีเยี่ยม",
            Self::Good => "ดี",
            Self::Fair => "พอใช้",
            Self::Improve => "ปรับปรุง",
        }
    }
}

/// Sum of every score present. Callers guarantee each value is in 0..=3.
pub fn total(scores: &Scores) -> u32 {
    scores.values().map(|&v| u32::from(v)).sum()
}

pub fn answered_count(scores: &Scores) -> usize {
    scores.len()
}

pub fn is_complete(scores: &Scores) -> bool {
    answered_count(scores) == QUESTION_COUNT
}

/// `total / 90 * 100`, deliberately unclamped.
pub fn percentage(total: u32) -> f64 {
    f64::from(total) / f64::from(MAX_TOTAL) * 100.0
}

/// Step function with inclusive lower bounds at 75, 50 and 25.
pub fn quality_level(percentage: f64) -> QualityLevel {
    if percentage >= 75.0 {
        QualityLevel::Excellent
    } else if percentage >= 50.0 {
        QualityLevel::Good
    } else if percentage >= 25.0 {
        QualityLevel::Fair
    } else {
        QualityLevel::Improve
    }
}

/// Two-decimal rounding used for display and export (`75.555..` -> `75.56`).
pub fn round_2_decimal(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn format_percentage(x: f64) -> String {
    format!("{:.2}", x)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub answered: usize,
    pub total: u32,
    pub percentage: f64,
    pub quality: QualityLevel,
    pub quality_label: &'static str,
    pub complete: bool,
}

/// Aggregate shown on the form and the roster. The band is taken from the
/// rounded percentage, the same figure the user sees.
pub fn summarize(scores: &Scores) -> ScoreSummary {
    let total = total(scores);
    let pct = round_2_decimal(percentage(total));
    let quality = quality_level(pct);
    ScoreSummary {
        answered: answered_count(scores),
        total,
        percentage: pct,
        quality,
        quality_label: quality.label(),
        complete: is_complete(scores),
    }
}
