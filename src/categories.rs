use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::ComputeError;
use crate::stats::{PositionBase, StatObservation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Attacking,
    Possession,
    Technical,
    Defensive,
    Physical,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Attacking,
        Category::Possession,
        Category::Technical,
        Category::Defensive,
        Category::Physical,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Attacking => "attacking",
            Category::Possession => "possession",
            Category::Technical => "technical",
            Category::Defensive => "defensive",
            Category::Physical => "physical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: u8,
    pub weight: f64,
    pub contribution: f64,
}

pub type CategoryScores = BTreeMap<Category, CategoryScore>;

/// Outcome per configured category: a score, or nothing when no member stat
/// was observed.
pub type CategoryOutcome = Result<Option<CategoryScore>, ComputeError>;

/// Score every configured category. Categories are independent, so one
/// failing category never blanks the others.
pub fn score_categories(
    config: &EngineConfig,
    position: PositionBase,
    observations: &[StatObservation],
) -> BTreeMap<Category, CategoryOutcome> {
    config
        .categories
        .iter()
        .map(|def| {
            let outcome = score_category(config, def.key, position, observations);
            (def.key, outcome)
        })
        .collect()
}

pub fn score_category(
    config: &EngineConfig,
    category: Category,
    position: PositionBase,
    observations: &[StatObservation],
) -> CategoryOutcome {
    let Some(def) = config.category(category) else {
        return Ok(None);
    };

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut matched = 0usize;
    for obs in observations {
        if !def.member_stats.contains(&obs.stat) {
            continue;
        }
        let m = config.importance(obs.stat);
        weighted_sum += f64::from(obs.percentile) * m;
        total_weight += m;
        matched += 1;
    }

    if matched == 0 {
        return Ok(None);
    }
    if total_weight <= 0.0 {
        return Err(ComputeError::ZeroWeight {
            what: format!("{} importance multipliers", category.key()),
        });
    }
    let raw = weighted_sum / total_weight;
    if !raw.is_finite() {
        return Err(ComputeError::NonFinite {
            what: format!("{} category score", category.key()),
        });
    }

    let score = raw.round().clamp(0.0, 100.0) as u8;
    let weight = config.position_weight(position, category);
    Ok(Some(CategoryScore {
        category,
        score,
        weight,
        contribution: round2(f64::from(score) * weight),
    }))
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
