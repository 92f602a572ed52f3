use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::categories::Category;
use crate::development::AgeBracket;
use crate::error::ConfigError;
use crate::persist::app_cache_dir;
use crate::roles::RoleId;
use crate::stats::{PositionBase, StatId};
use crate::style::StyleId;

const WEIGHT_EPS: f64 = 1e-6;

fn strictly_descending(values: impl Iterator<Item = f64>) -> bool {
    let mut prev = f64::INFINITY;
    for v in values {
        if v.is_nan() || v >= prev {
            return false;
        }
        prev = v;
    }
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub key: Category,
    pub member_stats: Vec<StatId>,
    pub base_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleKeyStat {
    pub stat: StatId,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleTemplate {
    pub role: RoleId,
    pub key_stats: Vec<RoleKeyStat>,
    pub eligible_positions: Vec<PositionBase>,
    pub description: String,
}

impl RoleTemplate {
    pub fn is_eligible(&self, position: PositionBase) -> bool {
        self.eligible_positions.contains(&position)
    }

    pub fn weight_of(&self, stat: StatId) -> Option<f64> {
        self.key_stats
            .iter()
            .find(|k| k.stat == stat)
            .map(|k| k.weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleArchetype {
    pub style: StyleId,
    pub stats: Vec<StatId>,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDefinition {
    pub name: String,
    pub stats: Vec<StatId>,
    /// Role label implied when this is the player's strongest trait.
    pub implies_role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeBracketConfig {
    pub bracket: AgeBracket,
    /// Inclusive upper bound; `None` for the open-ended last bracket.
    pub max_age: Option<u32>,
    pub critical_below: u8,
    pub important_below: u8,
    pub polish_below: u8,
    pub target_step: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PotentialStep {
    pub max_age: u32,
    pub increase: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentConfig {
    pub brackets: Vec<AgeBracketConfig>,
    pub potential_steps: Vec<PotentialStep>,
    pub target_cap: u8,
    pub peak_cap: f64,
    pub peak_age: u32,
}

impl Default for DevelopmentConfig {
    fn default() -> Self {
        let bracket = |bracket, max_age, critical_below, important_below, polish_below, target_step| {
            AgeBracketConfig {
                bracket,
                max_age,
                critical_below,
                important_below,
                polish_below,
                target_step,
            }
        };
        Self {
            brackets: vec![
                bracket(AgeBracket::YoungProspect, Some(21), 60, 70, 85, 15),
                bracket(AgeBracket::Developing, Some(24), 65, 75, 85, 15),
                bracket(AgeBracket::Peak, Some(29), 70, 80, 90, 10),
                bracket(AgeBracket::Experienced, Some(33), 65, 75, 85, 5),
                bracket(AgeBracket::Veteran, None, 60, 70, 80, 5),
            ],
            potential_steps: vec![
                PotentialStep { max_age: 19, increase: 15.0 },
                PotentialStep { max_age: 21, increase: 12.0 },
                PotentialStep { max_age: 23, increase: 8.0 },
                PotentialStep { max_age: 25, increase: 5.0 },
                PotentialStep { max_age: 27, increase: 3.0 },
                PotentialStep { max_age: 29, increase: 1.0 },
            ],
            target_cap: 95,
            peak_cap: 99.0,
            peak_age: 27,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusTier {
    pub min_score: u8,
    pub bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub baseline_bonus: f64,
    /// Checked in order; the first tier whose `min_score` is met applies.
    pub passing_tiers: Vec<BonusTier>,
    pub exceptional_threshold: u8,
    pub exceptional_bonus: f64,
    pub min_rating: u8,
    pub max_rating: u8,
    pub default_rating: u8,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            baseline_bonus: 5.0,
            passing_tiers: vec![
                BonusTier { min_score: 85, bonus: 8.0 },
                BonusTier { min_score: 75, bonus: 6.0 },
                BonusTier { min_score: 65, bonus: 4.0 },
            ],
            exceptional_threshold: 85,
            exceptional_bonus: 2.0,
            min_rating: 50,
            max_rating: 99,
            default_rating: 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleBand {
    pub min_score: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub role_gap_below: u8,
    pub high_weight_min: f64,
    pub strength_min: u8,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            role_gap_below: 70,
            high_weight_min: 0.25,
            strength_min: 70,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub full_sample_minutes: f64,
    pub recency: f64,
    pub low_confidence_cap: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            full_sample_minutes: 900.0,
            recency: 1.0,
            low_confidence_cap: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub strength_min: u8,
    pub weakness_max: u8,
    pub top_n: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            strength_min: 75,
            weakness_max: 35,
            top_n: 3,
        }
    }
}

/// Every table the engine reads. Built once, validated once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub categories: Vec<CategoryDefinition>,
    pub position_weights: BTreeMap<PositionBase, BTreeMap<Category, f64>>,
    pub stat_importance: BTreeMap<StatId, f64>,
    pub archetypes: Vec<StyleArchetype>,
    pub position_traits: BTreeMap<PositionBase, Vec<TraitDefinition>>,
    pub roles: Vec<RoleTemplate>,
    pub role_bands: Vec<RoleBand>,
    pub rating: RatingConfig,
    pub development: DevelopmentConfig,
    pub recommendations: RecommendationConfig,
    pub confidence: ConfidenceConfig,
    pub profile: ProfileConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for def in &self.categories {
            if def.member_stats.is_empty() || def.base_weight <= 0.0 {
                return Err(ConfigError::BadCategory(def.key.key().to_string()));
            }
        }

        for position in PositionBase::ALL {
            let row = self.position_weights.get(&position);
            for def in &self.categories {
                if row.and_then(|r| r.get(&def.key)).is_none() {
                    return Err(ConfigError::PositionWeightMissing {
                        position,
                        category: def.key.key().to_string(),
                    });
                }
            }
            if let Some((category, weight)) = row
                .into_iter()
                .flatten()
                .find(|(_, w)| !w.is_finite() || **w < 0.0)
            {
                return Err(ConfigError::NegativeWeight {
                    owner: format!("position {position:?}"),
                    entry: category.key().to_string(),
                    value: *weight,
                });
            }
            let sum: f64 = row.map(|r| r.values().sum()).unwrap_or(0.0);
            if (sum - 1.0).abs() > WEIGHT_EPS {
                return Err(ConfigError::PositionWeightSum { position, sum });
            }
        }

        for (stat, value) in &self.stat_importance {
            if !value.is_finite() || *value <= 0.0 {
                return Err(ConfigError::BadMultiplier {
                    stat: *stat,
                    value: *value,
                });
            }
        }

        for role in &self.roles {
            if role.eligible_positions.is_empty() {
                return Err(ConfigError::RoleWithoutPositions(role.role.name().to_string()));
            }
            if let Some(k) = role
                .key_stats
                .iter()
                .find(|k| !k.weight.is_finite() || k.weight < 0.0)
            {
                return Err(ConfigError::NegativeWeight {
                    owner: format!("role {}", role.role.name()),
                    entry: k.stat.to_string(),
                    value: k.weight,
                });
            }
            let sum: f64 = role.key_stats.iter().map(|k| k.weight).sum();
            if role.key_stats.is_empty() || (sum - 1.0).abs() > WEIGHT_EPS {
                return Err(ConfigError::RoleWeightSum {
                    role: role.role.name().to_string(),
                    sum,
                });
            }
        }

        for archetype in &self.archetypes {
            if archetype.stats.is_empty() {
                return Err(ConfigError::EmptyArchetype(archetype.style.name().to_string()));
            }
        }

        let rating = &self.rating;
        if rating.min_rating > rating.max_rating
            || !(rating.min_rating..=rating.max_rating).contains(&rating.default_rating)
        {
            return Err(ConfigError::RatingBounds {
                min: rating.min_rating,
                max: rating.max_rating,
                default: rating.default_rating,
            });
        }
        // Both lookups take the first tier that matches.
        if !strictly_descending(rating.passing_tiers.iter().map(|t| f64::from(t.min_score))) {
            return Err(ConfigError::UnsortedTiers("rating.passing_tiers"));
        }
        if !strictly_descending(self.role_bands.iter().map(|b| b.min_score)) {
            return Err(ConfigError::UnsortedTiers("role_bands"));
        }

        self.validate_potential_steps()?;
        self.validate_brackets()
    }

    fn validate_potential_steps(&self) -> Result<(), ConfigError> {
        let mut prev: Option<&PotentialStep> = None;
        for step in &self.development.potential_steps {
            if !step.increase.is_finite() || step.increase < 0.0 {
                return Err(ConfigError::BadPotentialStep(format!(
                    "increase {} at age {}",
                    step.increase, step.max_age
                )));
            }
            if let Some(p) = prev
                && (step.max_age <= p.max_age || step.increase > p.increase)
            {
                return Err(ConfigError::BadPotentialStep(format!(
                    "age {} (+{}) follows age {} (+{})",
                    step.max_age, step.increase, p.max_age, p.increase
                )));
            }
            prev = Some(step);
        }
        Ok(())
    }

    fn validate_brackets(&self) -> Result<(), ConfigError> {
        let brackets = &self.development.brackets;
        let Some(last) = brackets.last() else {
            return Err(ConfigError::BadBracket("no brackets configured".to_string()));
        };
        if last.max_age.is_some() {
            return Err(ConfigError::BadBracket(
                "last bracket must be open-ended".to_string(),
            ));
        }
        let mut prev_max: Option<u32> = None;
        for b in brackets {
            if !(b.critical_below <= b.important_below && b.important_below <= b.polish_below) {
                return Err(ConfigError::BadBracket(format!(
                    "{} thresholds out of order",
                    b.bracket.label()
                )));
            }
            if let (Some(prev), Some(max)) = (prev_max, b.max_age)
                && max <= prev
            {
                return Err(ConfigError::BadBracket(format!(
                    "{} ends at {max}, not after {prev}",
                    b.bracket.label()
                )));
            }
            if b.max_age.is_none() && !std::ptr::eq(b, last) {
                return Err(ConfigError::BadBracket(format!(
                    "{} is open-ended but not last",
                    b.bracket.label()
                )));
            }
            prev_max = b.max_age.or(prev_max);
        }
        Ok(())
    }

    pub fn category(&self, key: Category) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn position_weight(&self, position: PositionBase, category: Category) -> f64 {
        self.position_weights
            .get(&position)
            .and_then(|row| row.get(&category))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn importance(&self, stat: StatId) -> f64 {
        self.stat_importance.get(&stat).copied().unwrap_or(1.0)
    }

    /// First category (in configured order) that lists `stat`.
    pub fn primary_category_of(&self, stat: StatId) -> Option<Category> {
        self.categories
            .iter()
            .find(|c| c.member_stats.contains(&stat))
            .map(|c| c.key)
    }

    pub fn bracket_for_age(&self, age: u32) -> &AgeBracketConfig {
        let brackets = &self.development.brackets;
        brackets
            .iter()
            .find(|b| b.max_age.is_none_or(|max| age <= max))
            .unwrap_or(&brackets[brackets.len() - 1])
    }

    pub fn potential_increase(&self, age: u32) -> f64 {
        self.development
            .potential_steps
            .iter()
            .find(|step| age <= step.max_age)
            .map(|step| step.increase)
            .unwrap_or(0.0)
    }

    pub fn role_label(&self, score: f64) -> &str {
        self.role_bands
            .iter()
            .find(|band| score >= band.min_score)
            .map(|band| band.label.as_str())
            .unwrap_or("Poor Fit")
    }

    pub fn traits_for(&self, position: PositionBase) -> &[TraitDefinition] {
        self.position_traits
            .get(&position)
            .or_else(|| self.position_traits.get(&PositionBase::MF))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            position_weights: default_position_weights(),
            stat_importance: default_stat_importance(),
            archetypes: default_archetypes(),
            position_traits: default_position_traits(),
            roles: default_roles(),
            role_bands: default_role_bands(),
            rating: RatingConfig::default(),
            development: DevelopmentConfig::default(),
            recommendations: RecommendationConfig::default(),
            confidence: ConfidenceConfig::default(),
            profile: ProfileConfig::default(),
        }
    }
}

fn default_categories() -> Vec<CategoryDefinition> {
    use StatId::*;
    vec![
        CategoryDefinition {
            key: Category::Attacking,
            member_stats: vec![
                NonPenaltyGoals,
                NonPenaltyXg,
                ShotsTotal,
                Assists,
                ExpectedAssistedGoals,
                NpxgPlusXag,
                ShotCreatingActions,
            ],
            base_weight: 0.25,
        },
        CategoryDefinition {
            key: Category::Possession,
            member_stats: vec![
                PassesAttempted,
                PassCompletion,
                ProgressivePasses,
                ProgressivePassesReceived,
                TouchesAttPen,
            ],
            base_weight: 0.25,
        },
        CategoryDefinition {
            key: Category::Technical,
            member_stats: vec![
                PassCompletion,
                ProgressiveCarries,
                SuccessfulTakeOns,
                ShotCreatingActions,
            ],
            base_weight: 0.20,
        },
        CategoryDefinition {
            key: Category::Defensive,
            member_stats: vec![
                Tackles,
                Interceptions,
                Blocks,
                Clearances,
                SavePercentage,
                GoalsAgainst,
                PsxgMinusGa,
                SweeperActions,
            ],
            base_weight: 0.20,
        },
        CategoryDefinition {
            key: Category::Physical,
            member_stats: vec![AerialsWon, ProgressiveCarries, Clearances, CrossesStopped],
            base_weight: 0.10,
        },
    ]
}

fn default_position_weights() -> BTreeMap<PositionBase, BTreeMap<Category, f64>> {
    let row = |att: f64, poss: f64, tech: f64, def: f64, phys: f64| {
        BTreeMap::from([
            (Category::Attacking, att),
            (Category::Possession, poss),
            (Category::Technical, tech),
            (Category::Defensive, def),
            (Category::Physical, phys),
        ])
    };
    BTreeMap::from([
        (PositionBase::FW, row(0.40, 0.20, 0.20, 0.08, 0.12)),
        (PositionBase::MF, row(0.20, 0.30, 0.22, 0.18, 0.10)),
        (PositionBase::DF, row(0.07, 0.23, 0.10, 0.40, 0.20)),
        (PositionBase::GK, row(0.02, 0.23, 0.05, 0.55, 0.15)),
    ])
}

fn default_stat_importance() -> BTreeMap<StatId, f64> {
    BTreeMap::from([
        (StatId::PassCompletion, 1.3),
        (StatId::ProgressivePasses, 1.3),
        (StatId::ProgressiveCarries, 1.2),
        (StatId::ShotCreatingActions, 1.2),
        (StatId::Assists, 1.2),
        (StatId::NonPenaltyGoals, 1.2),
        (StatId::Tackles, 1.1),
        (StatId::Interceptions, 1.1),
        (StatId::AerialsWon, 1.1),
    ])
}

fn default_archetypes() -> Vec<StyleArchetype> {
    use StatId::*;
    let archetype = |style, stats: &[StatId], threshold| StyleArchetype {
        style,
        stats: stats.to_vec(),
        threshold,
    };
    vec![
        archetype(
            StyleId::PossessionPlay,
            &[PassCompletion, ProgressivePasses, ProgressiveCarries],
            70.0,
        ),
        archetype(
            StyleId::AttackingThreat,
            &[NonPenaltyGoals, ShotCreatingActions, ExpectedAssistedGoals],
            70.0,
        ),
        archetype(
            StyleId::DefensiveContribution,
            &[Tackles, Interceptions, Blocks],
            70.0,
        ),
        archetype(
            StyleId::BallCarrying,
            &[ProgressiveCarries, SuccessfulTakeOns, ProgressivePassesReceived],
            75.0,
        ),
        archetype(
            StyleId::GoalScoring,
            &[NonPenaltyGoals, NonPenaltyXg, ShotsTotal],
            75.0,
        ),
        archetype(StyleId::AerialPresence, &[AerialsWon, Clearances], 75.0),
        archetype(
            StyleId::Goalkeeping,
            &[SavePercentage, PsxgMinusGa, CrossesStopped],
            70.0,
        ),
    ]
}

fn default_position_traits() -> BTreeMap<PositionBase, Vec<TraitDefinition>> {
    use StatId::*;
    let t = |name: &str, stats: &[StatId], implies_role: &str| TraitDefinition {
        name: name.to_string(),
        stats: stats.to_vec(),
        implies_role: implies_role.to_string(),
    };
    BTreeMap::from([
        (
            PositionBase::FW,
            vec![
                t("finishing", &[NonPenaltyGoals, NonPenaltyXg], "Goal Poacher"),
                t(
                    "creativity",
                    &[Assists, ExpectedAssistedGoals, ShotCreatingActions],
                    "Creative Forward",
                ),
                t("movement", &[ProgressivePassesReceived], "Mobile Striker"),
            ],
        ),
        (
            PositionBase::MF,
            vec![
                t(
                    "playmaking",
                    &[ProgressivePasses, Assists, ExpectedAssistedGoals],
                    "Playmaker",
                ),
                t(
                    "ball_control",
                    &[PassCompletion, ProgressiveCarries, SuccessfulTakeOns],
                    "Technical Midfielder",
                ),
                t(
                    "work_rate",
                    &[ShotCreatingActions, Tackles, Interceptions],
                    "Box-to-Box Midfielder",
                ),
            ],
        ),
        (
            PositionBase::DF,
            vec![
                t(
                    "defending",
                    &[Tackles, Interceptions, Blocks],
                    "No-Nonsense Defender",
                ),
                t("aerial_ability", &[AerialsWon, Clearances], "Aerial Specialist"),
                t(
                    "build_up",
                    &[ProgressivePasses, PassCompletion],
                    "Ball-Playing Defender",
                ),
            ],
        ),
        (
            PositionBase::GK,
            vec![
                t("shot_stopping", &[SavePercentage, GoalsAgainst], "Shot Stopper"),
                t(
                    "distribution",
                    &[PassCompletion, PassesAttempted],
                    "Sweeper Keeper",
                ),
                t("commanding", &[CrossesStopped, Clearances], "Traditional Keeper"),
            ],
        ),
    ])
}

fn default_roles() -> Vec<RoleTemplate> {
    use PositionBase::*;
    use StatId::*;
    let role = |role: RoleId, key_stats: &[(StatId, f64)], eligible: &[PositionBase], description: &str| {
        RoleTemplate {
            role,
            key_stats: key_stats
                .iter()
                .map(|(stat, weight)| RoleKeyStat {
                    stat: *stat,
                    weight: *weight,
                })
                .collect(),
            eligible_positions: eligible.to_vec(),
            description: description.to_string(),
        }
    };
    vec![
        role(
            RoleId::Poacher,
            &[
                (NonPenaltyGoals, 0.35),
                (NonPenaltyXg, 0.30),
                (TouchesAttPen, 0.20),
                (ShotsTotal, 0.15),
            ],
            &[FW],
            "Penalty-box finisher who lives on the last defender's shoulder.",
        ),
        role(
            RoleId::AdvancedForward,
            &[
                (NonPenaltyGoals, 0.25),
                (ProgressivePassesReceived, 0.25),
                (NonPenaltyXg, 0.20),
                (SuccessfulTakeOns, 0.15),
                (ShotCreatingActions, 0.15),
            ],
            &[FW],
            "Runs the channels and stretches the back line.",
        ),
        role(
            RoleId::TargetForward,
            &[
                (AerialsWon, 0.35),
                (NonPenaltyGoals, 0.25),
                (TouchesAttPen, 0.20),
                (ProgressivePassesReceived, 0.20),
            ],
            &[FW],
            "Reference point for direct play, wins the ball in the air.",
        ),
        role(
            RoleId::PressingForward,
            &[
                (NonPenaltyGoals, 0.25),
                (Tackles, 0.25),
                (ShotCreatingActions, 0.20),
                (Interceptions, 0.15),
                (ProgressivePassesReceived, 0.15),
            ],
            &[FW],
            "Leads the press and turns regains into chances.",
        ),
        role(
            RoleId::InsideForward,
            &[
                (NonPenaltyGoals, 0.25),
                (SuccessfulTakeOns, 0.25),
                (ProgressiveCarries, 0.20),
                (ShotCreatingActions, 0.15),
                (NonPenaltyXg, 0.15),
            ],
            &[FW, MF],
            "Cuts in from the flank to shoot.",
        ),
        role(
            RoleId::Winger,
            &[
                (SuccessfulTakeOns, 0.25),
                (ProgressiveCarries, 0.25),
                (ExpectedAssistedGoals, 0.20),
                (ShotCreatingActions, 0.15),
                (ProgressivePassesReceived, 0.15),
            ],
            &[FW, MF],
            "Beats full-backs on the outside and delivers.",
        ),
        role(
            RoleId::AdvancedPlaymaker,
            &[
                (ShotCreatingActions, 0.25),
                (ExpectedAssistedGoals, 0.25),
                (ProgressivePasses, 0.20),
                (Assists, 0.15),
                (SuccessfulTakeOns, 0.15),
            ],
            &[MF, FW],
            "Creative hub between the lines.",
        ),
        role(
            RoleId::DeepLyingPlaymaker,
            &[
                (ProgressivePasses, 0.30),
                (PassCompletion, 0.25),
                (PassesAttempted, 0.20),
                (Interceptions, 0.15),
                (Tackles, 0.10),
            ],
            &[MF],
            "Dictates tempo from in front of the defence.",
        ),
        role(
            RoleId::BoxToBox,
            &[
                (ProgressiveCarries, 0.20),
                (Tackles, 0.20),
                (Interceptions, 0.15),
                (ShotCreatingActions, 0.15),
                (NonPenaltyGoals, 0.15),
                (ProgressivePasses, 0.15),
            ],
            &[MF],
            "Covers both boxes, contributing at each end.",
        ),
        role(
            RoleId::Mezzala,
            &[
                (ProgressiveCarries, 0.25),
                (SuccessfulTakeOns, 0.20),
                (ShotCreatingActions, 0.20),
                (ProgressivePassesReceived, 0.20),
                (NonPenaltyXg, 0.15),
            ],
            &[MF],
            "Half-space runner who drifts wide to create overloads.",
        ),
        role(
            RoleId::BallWinningMidfielder,
            &[
                (Tackles, 0.35),
                (Interceptions, 0.30),
                (Blocks, 0.15),
                (AerialsWon, 0.10),
                (PassCompletion, 0.10),
            ],
            &[MF, DF],
            "Breaks up play and recycles possession simply.",
        ),
        role(
            RoleId::BallPlayingDefender,
            &[
                (ProgressivePasses, 0.30),
                (PassCompletion, 0.25),
                (Interceptions, 0.15),
                (Tackles, 0.15),
                (AerialsWon, 0.15),
            ],
            &[DF],
            "Centre-back who starts attacks with line-breaking passes.",
        ),
        role(
            RoleId::NoNonsenseDefender,
            &[
                (Clearances, 0.30),
                (AerialsWon, 0.25),
                (Blocks, 0.20),
                (Tackles, 0.15),
                (Interceptions, 0.10),
            ],
            &[DF],
            "Prioritises clearing danger over keeping the ball.",
        ),
        role(
            RoleId::FullBack,
            &[
                (Tackles, 0.30),
                (Interceptions, 0.25),
                (ProgressivePasses, 0.20),
                (PassCompletion, 0.15),
                (Blocks, 0.10),
            ],
            &[DF],
            "Defends the flank first and supports in build-up.",
        ),
        role(
            RoleId::WingBack,
            &[
                (ProgressiveCarries, 0.25),
                (ExpectedAssistedGoals, 0.20),
                (Tackles, 0.20),
                (ProgressivePasses, 0.20),
                (ShotCreatingActions, 0.15),
            ],
            &[DF, MF],
            "Provides the width in attack and tracks back.",
        ),
        role(
            RoleId::ShotStopper,
            &[
                (SavePercentage, 0.50),
                (PsxgMinusGa, 0.35),
                (GoalsAgainst, 0.15),
            ],
            &[GK],
            "Keeps the ball out; stays on the line.",
        ),
        role(
            RoleId::SweeperKeeper,
            &[
                (SweeperActions, 0.30),
                (PassCompletion, 0.25),
                (PassesAttempted, 0.15),
                (SavePercentage, 0.15),
                (CrossesStopped, 0.15),
            ],
            &[GK],
            "Acts as an extra outfield player behind a high line.",
        ),
    ]
}

fn default_role_bands() -> Vec<RoleBand> {
    [
        (85.0, "Perfect Fit"),
        (75.0, "Strong Fit"),
        (65.0, "Good Fit"),
        (55.0, "Decent Fit"),
        (0.0, "Poor Fit"),
    ]
    .into_iter()
    .map(|(min_score, label)| RoleBand {
        min_score,
        label: label.to_string(),
    })
    .collect()
}

/// Resolve the engine configuration: explicit path, then the cache
/// directory, then the built-in tables. Env overrides apply last.
pub fn load_engine_config() -> Result<EngineConfig> {
    let mut config = if let Some(path) = config_path_override()
        && path.exists()
    {
        read_config_file(&path)?
    } else if let Some(path) = default_config_cache_path()
        && path.exists()
    {
        read_config_file(&path)?
    } else {
        EngineConfig::default()
    };

    if let Some(bonus) = baseline_bonus_override()? {
        config.rating.baseline_bonus = bonus;
    }

    config
        .validate()
        .context("engine configuration failed validation")?;
    Ok(config)
}

fn read_config_file(path: &PathBuf) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read engine config {}", path.display()))?;
    let config = serde_json::from_str::<EngineConfig>(&raw)
        .with_context(|| format!("parse engine config {}", path.display()))?;
    log::debug!("loaded engine config from {}", path.display());
    Ok(config)
}

fn config_path_override() -> Option<PathBuf> {
    env::var("SCOUT_ENGINE_CONFIG")
        .ok()
        .map(|s| PathBuf::from(s.trim()))
        .filter(|p| !p.as_os_str().is_empty())
}

fn default_config_cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("engine_config.json"))
}

fn baseline_bonus_override() -> Result<Option<f64>> {
    let Ok(raw) = env::var("SCOUT_BASELINE_BONUS") else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .with_context(|| format!("SCOUT_BASELINE_BONUS is not a number: {raw}"))?;
    if !(0.0..=10.0).contains(&value) {
        return Err(anyhow!("SCOUT_BASELINE_BONUS out of range 0..=10: {value}"));
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().expect("defaults valid");
    }

    #[test]
    fn position_weight_rows_sum_to_one() {
        let config = EngineConfig::default();
        for position in PositionBase::ALL {
            let sum: f64 = config.position_weights[&position].values().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{position:?} sums to {sum}");
        }
    }

    #[test]
    fn role_weights_sum_to_one() {
        for role in EngineConfig::default().roles {
            let sum: f64 = role.key_stats.iter().map(|k| k.weight).sum();
            assert!((sum - 1.0).abs() < 1e-9, "{:?} sums to {sum}", role.role);
        }
    }

    #[test]
    fn every_position_has_an_eligible_role() {
        let config = EngineConfig::default();
        for position in PositionBase::ALL {
            assert!(config.roles.iter().any(|r| r.is_eligible(position)));
        }
    }

    #[test]
    fn validate_rejects_unbalanced_position_row() {
        let mut config = EngineConfig::default();
        config
            .position_weights
            .get_mut(&PositionBase::FW)
            .unwrap()
            .insert(Category::Attacking, 0.9);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PositionWeightSum {
                position: PositionBase::FW,
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_open_bracket_in_middle() {
        let mut config = EngineConfig::default();
        config.development.brackets[1].max_age = None;
        assert!(matches!(config.validate(), Err(ConfigError::BadBracket(_))));
    }

    #[test]
    fn validate_rejects_negative_position_weight() {
        let mut config = EngineConfig::default();
        let row = config.position_weights.get_mut(&PositionBase::MF).unwrap();
        // Still sums to 1.0.
        row.insert(Category::Attacking, -0.2);
        row.insert(Category::Possession, 0.7);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeWeight { value, .. }) if value == -0.2
        ));
    }

    #[test]
    fn validate_rejects_negative_role_key_stat_weight() {
        let mut config = EngineConfig::default();
        let role = &mut config.roles[0];
        let first = role.key_stats[0].weight;
        role.key_stats[0].weight = first + 0.5;
        role.key_stats[1].weight -= 0.5;
        assert!(role.key_stats[1].weight < 0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeWeight { owner, .. }) if owner.starts_with("role ")
        ));
    }

    #[test]
    fn validate_rejects_inverted_rating_bounds() {
        let mut config = EngineConfig::default();
        config.rating.min_rating = 90;
        config.rating.max_rating = 60;
        config.rating.default_rating = 70;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RatingBounds { min: 90, max: 60, .. })
        ));
    }

    #[test]
    fn validate_rejects_default_rating_outside_bounds() {
        let mut config = EngineConfig::default();
        config.rating.default_rating = 40;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RatingBounds { default: 40, .. })
        ));
        config.rating.default_rating = 99;
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_unsorted_passing_tiers() {
        let mut config = EngineConfig::default();
        config.rating.passing_tiers.reverse();
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::UnsortedTiers("rating.passing_tiers")
        );
    }

    #[test]
    fn validate_rejects_unsorted_role_bands() {
        let mut config = EngineConfig::default();
        config.role_bands.swap(1, 2);
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::UnsortedTiers("role_bands")
        );
    }

    #[test]
    fn validate_rejects_rising_potential_steps() {
        let mut config = EngineConfig::default();
        config.development.potential_steps[2].increase = 20.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadPotentialStep(_))
        ));

        let mut config = EngineConfig::default();
        config.development.potential_steps.swap(0, 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadPotentialStep(_))
        ));
    }

    #[test]
    fn bracket_lookup_by_age() {
        let config = EngineConfig::default();
        assert_eq!(config.bracket_for_age(15).bracket, AgeBracket::YoungProspect);
        assert_eq!(config.bracket_for_age(21).bracket, AgeBracket::YoungProspect);
        assert_eq!(config.bracket_for_age(22).bracket, AgeBracket::Developing);
        assert_eq!(config.bracket_for_age(29).bracket, AgeBracket::Peak);
        assert_eq!(config.bracket_for_age(33).bracket, AgeBracket::Experienced);
        assert_eq!(config.bracket_for_age(38).bracket, AgeBracket::Veteran);
    }

    #[test]
    fn potential_increase_is_monotone() {
        let config = EngineConfig::default();
        assert_eq!(config.potential_increase(19), 15.0);
        assert_eq!(config.potential_increase(30), 0.0);
        let mut prev = f64::INFINITY;
        for age in 15..40 {
            let inc = config.potential_increase(age);
            assert!(inc <= prev);
            prev = inc;
        }
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"rating":{"baseline_bonus":3.0}}"#).unwrap();
        assert_eq!(config.rating.baseline_bonus, 3.0);
        assert_eq!(config.rating.default_rating, 70);
        assert_eq!(config.roles, EngineConfig::default().roles);
        config.validate().unwrap();
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
