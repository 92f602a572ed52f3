use serde::{Deserialize, Serialize};

use crate::categories::{CategoryScore, CategoryScores, round2};
use crate::confidence::ConfidenceBreakdown;
use crate::config::EngineConfig;
use crate::development::DevelopmentProjection;
use crate::error::AnalysisWarning;
use crate::rating::RatingBreakdown;
use crate::recommendations::Recommendation;
use crate::roles::RoleSuitability;
use crate::stats::{PositionBase, StatId, StatObservation};
use crate::style::StyleClassification;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedStat {
    pub stat: StatId,
    pub label: String,
    pub percentile: u8,
    pub per90: Option<f64>,
    /// Percentile scaled by the position weight of the stat's first category.
    pub weighted: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    pub key_strengths: Vec<RatedStat>,
    pub areas_for_improvement: Vec<RatedStat>,
}

/// Full evaluation of one player. Built fresh per call and owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub player_name: String,
    /// RFC 3339 timestamp; only set by callers that stamp the report.
    pub generated_at: Option<String>,
    pub position: String,
    pub position_base: PositionBase,
    pub age: u32,
    pub club: String,
    pub overall_rating: u8,
    pub rating_breakdown: RatingBreakdown,
    pub summary: String,
    pub category_scores: CategoryScores,
    pub performance_profile: PerformanceProfile,
    pub playing_style: StyleClassification,
    pub role_suitability: RoleSuitability,
    pub development_analysis: DevelopmentProjection,
    pub recommendations: Vec<Recommendation>,
    pub confidence: f64,
    pub confidence_breakdown: ConfidenceBreakdown,
    pub low_confidence: bool,
    pub warnings: Vec<AnalysisWarning>,
}

pub fn performance_profile(
    config: &EngineConfig,
    position: PositionBase,
    observations: &[StatObservation],
) -> PerformanceProfile {
    let pc = &config.profile;
    let rate = |obs: &StatObservation| {
        let weight = config
            .primary_category_of(obs.stat)
            .map(|c| config.position_weight(position, c))
            .unwrap_or(0.0);
        RatedStat {
            stat: obs.stat,
            label: obs.stat.label().to_string(),
            percentile: obs.percentile,
            per90: obs.per90,
            weighted: round2(f64::from(obs.percentile) * weight),
        }
    };
    let top = |mut rows: Vec<RatedStat>| {
        rows.sort_by(|a, b| {
            b.weighted
                .total_cmp(&a.weighted)
                .then_with(|| a.stat.cmp(&b.stat))
        });
        rows.truncate(pc.top_n);
        rows
    };

    let strengths = observations
        .iter()
        .filter(|o| o.percentile >= pc.strength_min)
        .map(rate)
        .collect();
    let weaknesses = observations
        .iter()
        .filter(|o| o.percentile <= pc.weakness_max)
        .map(rate)
        .collect();

    PerformanceProfile {
        key_strengths: top(strengths),
        areas_for_improvement: top(weaknesses),
    }
}

fn age_descriptor(age: u32) -> &'static str {
    match age {
        0..=20 => "promising young",
        21..=23 => "developing",
        24..=28 => "peak-age",
        _ => "experienced",
    }
}

fn position_noun(position: PositionBase) -> &'static str {
    match position {
        PositionBase::FW => "forward",
        PositionBase::MF => "midfielder",
        PositionBase::DF => "defender",
        PositionBase::GK => "goalkeeper",
    }
}

/// One-sentence headline built from the computed sections.
pub fn summary_sentence(
    name: &str,
    age: u32,
    position: PositionBase,
    rating: u8,
    categories: &CategoryScores,
    style: &StyleClassification,
) -> String {
    let descriptor = age_descriptor(age);
    let article = if descriptor.starts_with(['a', 'e', 'i', 'o', 'u']) {
        "an"
    } else {
        "a"
    };
    let mut out = format!(
        "{name} is {article} {descriptor} {} rated {rating}",
        position_noun(position)
    );

    // Highest score wins; on ties the earlier category in BTreeMap order.
    let strongest = categories
        .values()
        .fold(None::<&CategoryScore>, |best, c| match best {
            Some(b) if b.score >= c.score => Some(b),
            _ => Some(c),
        });
    if let Some(best) = strongest {
        out.push_str(&format!(", strongest in {} play", best.category.key()));
    }

    match (&style.primary_style, &style.secondary_style) {
        (Some(primary), Some(secondary)) => out.push_str(&format!(
            ", with a {} profile backed by {}",
            primary.to_lowercase(),
            secondary.to_lowercase()
        )),
        (Some(primary), None) => {
            out.push_str(&format!(", with a {} profile", primary.to_lowercase()))
        }
        _ => {}
    }
    out.push('.');
    out
}
