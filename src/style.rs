use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::stats::{PositionBase, StatId, StatObservation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleId {
    PossessionPlay,
    AttackingThreat,
    DefensiveContribution,
    BallCarrying,
    GoalScoring,
    AerialPresence,
    Goalkeeping,
}

impl StyleId {
    pub fn name(self) -> &'static str {
        match self {
            StyleId::PossessionPlay => "Possession Play",
            StyleId::AttackingThreat => "Attacking Threat",
            StyleId::DefensiveContribution => "Defensive Contribution",
            StyleId::BallCarrying => "Ball Carrying",
            StyleId::GoalScoring => "Goal Scoring",
            StyleId::AerialPresence => "Aerial Presence",
            StyleId::Goalkeeping => "Goalkeeping",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleScore {
    pub style: StyleId,
    pub name: String,
    pub score: f64,
    pub threshold: f64,
    pub characteristic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitScore {
    pub score: u8,
    pub level: String,
    pub percentile: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionTraits {
    pub position_role: String,
    pub key_traits: BTreeMap<String, TraitScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleClassification {
    pub primary_style: Option<String>,
    pub secondary_style: Option<String>,
    /// Ranked best first.
    pub style_scores: Vec<StyleScore>,
    pub characteristic_styles: Vec<String>,
    pub narrative: String,
    pub position_specific_traits: PositionTraits,
}

pub const BALANCED_NARRATIVE: &str = "balanced, no pronounced tendency";

/// Rank the archetype catalogue and describe the player's style.
///
/// Archetypes with no observed member stat are left out of the ranking and
/// returned in the second slot so the caller can report them.
pub fn classify_style(
    config: &EngineConfig,
    position: PositionBase,
    observations: &[StatObservation],
) -> (StyleClassification, Vec<StyleId>) {
    let lookup = percentile_lookup(observations);
    let mut scores = Vec::with_capacity(config.archetypes.len());
    let mut missing = Vec::new();

    for archetype in &config.archetypes {
        let Some(mean) = mean_percentile(&lookup, &archetype.stats) else {
            missing.push(archetype.style);
            continue;
        };
        scores.push(StyleScore {
            style: archetype.style,
            name: archetype.style.name().to_string(),
            score: mean,
            threshold: archetype.threshold,
            characteristic: mean >= archetype.threshold,
        });
    }

    scores.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));

    let characteristic_styles: Vec<String> = scores
        .iter()
        .filter(|s| s.characteristic)
        .map(|s| s.name.clone())
        .collect();
    let narrative = if characteristic_styles.is_empty() {
        BALANCED_NARRATIVE.to_string()
    } else {
        format!("characterised by {}", join_names(&characteristic_styles).to_lowercase())
    };

    let classification = StyleClassification {
        primary_style: scores.first().map(|s| s.name.clone()),
        secondary_style: scores.get(1).map(|s| s.name.clone()),
        style_scores: scores,
        characteristic_styles,
        narrative,
        position_specific_traits: position_traits(config, position, &lookup),
    };
    (classification, missing)
}

fn position_traits(
    config: &EngineConfig,
    position: PositionBase,
    lookup: &BTreeMap<StatId, u8>,
) -> PositionTraits {
    let mut key_traits = BTreeMap::new();
    let mut best: Option<(&str, u8)> = None;

    for def in config.traits_for(position) {
        let Some(mean) = mean_percentile(lookup, &def.stats) else {
            continue;
        };
        let rounded = mean.round().clamp(0.0, 100.0) as u8;
        key_traits.insert(
            def.name.clone(),
            TraitScore {
                score: rounded,
                level: trait_level(mean).to_string(),
                percentile: rounded,
            },
        );
        // Compared on the reported score; the earliest configured trait wins ties.
        if best.is_none_or(|(_, s)| rounded > s) {
            best = Some((def.implies_role.as_str(), rounded));
        }
    }

    PositionTraits {
        position_role: best
            .map(|(role, _)| role.to_string())
            .unwrap_or_else(|| "Versatile Player".to_string()),
        key_traits,
    }
}

pub fn trait_level(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "Elite",
        s if s >= 80.0 => "Excellent",
        s if s >= 70.0 => "Very Good",
        s if s >= 60.0 => "Good",
        s if s >= 50.0 => "Above Average",
        s if s >= 40.0 => "Average",
        s if s >= 30.0 => "Below Average",
        _ => "Developing",
    }
}

pub(crate) fn percentile_lookup(observations: &[StatObservation]) -> BTreeMap<StatId, u8> {
    observations
        .iter()
        .map(|o| (o.stat, o.percentile))
        .collect()
}

fn mean_percentile(lookup: &BTreeMap<StatId, u8>, stats: &[StatId]) -> Option<f64> {
    let values: Vec<f64> = stats
        .iter()
        .filter_map(|s| lookup.get(s).map(|p| f64::from(*p)))
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
