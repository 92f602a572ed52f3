use serde::{Deserialize, Serialize};

use crate::categories::round2;
use crate::config::ConfidenceConfig;
use crate::input::PlayerInput;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub completeness: f64,
    pub sample_size: f64,
    pub recency: f64,
    /// Mean of the three factors before any cap.
    pub raw: f64,
    pub capped: bool,
}

/// Data-quality score in [0, 1]. Reads the raw input only, so it never
/// depends on how the scorers fared.
pub fn score_confidence(
    config: &ConfidenceConfig,
    input: &PlayerInput,
    low_confidence: bool,
) -> (f64, ConfidenceBreakdown) {
    let present = [
        input.general_info.is_some(),
        input
            .scouting_report
            .as_ref()
            .is_some_and(|rows| !rows.is_empty()),
        input.current_season_stats.is_some(),
    ];
    let completeness = present.iter().filter(|p| **p).count() as f64 / present.len() as f64;

    let sample_size = if config.full_sample_minutes > 0.0 {
        (input.total_minutes() / config.full_sample_minutes).min(1.0)
    } else {
        1.0
    };
    let recency = config.recency.clamp(0.0, 1.0);

    let raw = round2((completeness + sample_size + recency) / 3.0);
    let capped = low_confidence && raw > config.low_confidence_cap;
    let value = if capped { config.low_confidence_cap } else { raw };

    let breakdown = ConfidenceBreakdown {
        completeness: round2(completeness),
        sample_size: round2(sample_size),
        recency,
        raw,
        capped,
    };
    (value, breakdown)
}
