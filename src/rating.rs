use serde::{Deserialize, Serialize};

use crate::categories::{Category, CategoryScores, round2};
use crate::config::EngineConfig;
use crate::error::ComputeError;

/// How the overall rating was assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBreakdown {
    pub base: f64,
    pub passing_bonus: f64,
    pub exceptional_categories: u32,
    pub exceptional_bonus: f64,
    pub baseline_bonus: f64,
    /// True when no category could be scored and the configured default was used.
    pub defaulted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverallRating {
    pub rating: u8,
    pub breakdown: RatingBreakdown,
}

impl OverallRating {
    /// The configured default, used when nothing could be scored.
    pub fn fallback(config: &EngineConfig) -> Self {
        let default = config.rating.default_rating;
        OverallRating {
            rating: default,
            breakdown: RatingBreakdown {
                base: f64::from(default),
                passing_bonus: 0.0,
                exceptional_categories: 0,
                exceptional_bonus: 0.0,
                baseline_bonus: 0.0,
                defaulted: true,
            },
        }
    }
}

/// Combine category scores into a single bounded rating.
///
/// Effective category weight is `base_weight * position_weight`, normalised
/// by the sum over the categories that are present.
pub fn overall_rating(
    config: &EngineConfig,
    categories: &CategoryScores,
) -> Result<OverallRating, ComputeError> {
    let rc = &config.rating;
    if categories.is_empty() {
        return Ok(OverallRating::fallback(config));
    }

    let mut total = 0.0;
    let mut total_w = 0.0;
    for (category, score) in categories {
        let base_weight = config.category(*category).map(|c| c.base_weight).unwrap_or(0.0);
        let w = base_weight * score.weight;
        total += f64::from(score.score) * w;
        total_w += w;
    }
    if total_w <= 0.0 {
        return Err(ComputeError::ZeroWeight {
            what: "overall rating categories".to_string(),
        });
    }
    let base = total / total_w;
    if !base.is_finite() {
        return Err(ComputeError::NonFinite {
            what: "overall rating base".to_string(),
        });
    }

    let passing_bonus = passing_bonus(config, categories);
    let exceptional_categories = categories
        .values()
        .filter(|c| c.score >= rc.exceptional_threshold)
        .count() as u32;
    let exceptional_bonus = f64::from(exceptional_categories) * rc.exceptional_bonus;

    let raw = base + passing_bonus + exceptional_bonus + rc.baseline_bonus;
    let rating = raw
        .round()
        .clamp(f64::from(rc.min_rating), f64::from(rc.max_rating)) as u8;

    Ok(OverallRating {
        rating,
        breakdown: RatingBreakdown {
            base: round2(base),
            passing_bonus,
            exceptional_categories,
            exceptional_bonus,
            baseline_bonus: rc.baseline_bonus,
            defaulted: false,
        },
    })
}

/// Tiered bonus keyed off possession, or technical when possession is missing.
pub fn passing_bonus(config: &EngineConfig, categories: &CategoryScores) -> f64 {
    let Some(score) = categories
        .get(&Category::Possession)
        .or_else(|| categories.get(&Category::Technical))
        .map(|c| c.score)
    else {
        return 0.0;
    };
    config
        .rating
        .passing_tiers
        .iter()
        .find(|tier| score >= tier.min_score)
        .map(|tier| tier.bonus)
        .unwrap_or(0.0)
}
