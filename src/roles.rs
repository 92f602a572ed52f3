use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::categories::round2;
use crate::config::{EngineConfig, RoleTemplate};
use crate::error::ComputeError;
use crate::stats::{PositionBase, StatId, StatObservation};
use crate::style::percentile_lookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleId {
    Poacher,
    AdvancedForward,
    TargetForward,
    PressingForward,
    InsideForward,
    Winger,
    AdvancedPlaymaker,
    DeepLyingPlaymaker,
    BoxToBox,
    Mezzala,
    BallWinningMidfielder,
    BallPlayingDefender,
    NoNonsenseDefender,
    FullBack,
    WingBack,
    ShotStopper,
    SweeperKeeper,
}

impl RoleId {
    pub fn name(self) -> &'static str {
        match self {
            RoleId::Poacher => "Poacher",
            RoleId::AdvancedForward => "Advanced Forward",
            RoleId::TargetForward => "Target Forward",
            RoleId::PressingForward => "Pressing Forward",
            RoleId::InsideForward => "Inside Forward",
            RoleId::Winger => "Winger",
            RoleId::AdvancedPlaymaker => "Advanced Playmaker",
            RoleId::DeepLyingPlaymaker => "Deep-Lying Playmaker",
            RoleId::BoxToBox => "Box-to-Box Midfielder",
            RoleId::Mezzala => "Mezzala",
            RoleId::BallWinningMidfielder => "Ball-Winning Midfielder",
            RoleId::BallPlayingDefender => "Ball-Playing Defender",
            RoleId::NoNonsenseDefender => "No-Nonsense Defender",
            RoleId::FullBack => "Full-Back",
            RoleId::WingBack => "Wing-Back",
            RoleId::ShotStopper => "Shot Stopper",
            RoleId::SweeperKeeper => "Sweeper Keeper",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub stat: StatId,
    pub label: String,
    pub percentile: u8,
    pub weight: f64,
    pub is_strength: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleScore {
    pub role: RoleId,
    pub name: String,
    pub score: f64,
    pub rating_label: String,
    pub description: String,
    pub key_attributes: Vec<KeyAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSuitability {
    pub primary_role: Option<String>,
    pub secondary_role: Option<String>,
    /// Best fit first.
    pub ranked: Vec<RoleScore>,
}

impl RoleSuitability {
    pub fn primary(&self) -> Option<&RoleScore> {
        self.ranked.first()
    }
}

/// Roles that were eligible but could not be scored.
#[derive(Debug, Default)]
pub struct RoleGaps {
    pub without_data: Vec<RoleId>,
    pub failed: Vec<(RoleId, ComputeError)>,
}

/// Score every role template eligible for `position` and rank them.
pub fn match_roles(
    config: &EngineConfig,
    position: PositionBase,
    observations: &[StatObservation],
) -> (RoleSuitability, RoleGaps) {
    let lookup = percentile_lookup(observations);
    let mut ranked = Vec::new();
    let mut gaps = RoleGaps::default();

    for template in config.roles.iter().filter(|t| t.is_eligible(position)) {
        match score_role(config, template, &lookup) {
            Ok(Some(score)) => ranked.push(score),
            Ok(None) => gaps.without_data.push(template.role),
            Err(err) => gaps.failed.push((template.role, err)),
        }
    }

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));

    let suitability = RoleSuitability {
        primary_role: ranked.first().map(|r| r.name.clone()),
        secondary_role: ranked.get(1).map(|r| r.name.clone()),
        ranked,
    };
    (suitability, gaps)
}

fn score_role(
    config: &EngineConfig,
    template: &RoleTemplate,
    lookup: &BTreeMap<StatId, u8>,
) -> Result<Option<RoleScore>, ComputeError> {
    let mut weighted = 0.0;
    let mut total_w = 0.0;
    let mut attributes = Vec::new();

    for key in &template.key_stats {
        let Some(percentile) = lookup.get(&key.stat).copied() else {
            continue;
        };
        weighted += f64::from(percentile) * key.weight;
        total_w += key.weight;
        attributes.push(KeyAttribute {
            stat: key.stat,
            label: key.stat.label().to_string(),
            percentile,
            weight: key.weight,
            is_strength: percentile >= config.recommendations.strength_min,
        });
    }

    if attributes.is_empty() {
        return Ok(None);
    }
    if total_w <= 0.0 {
        return Err(ComputeError::ZeroWeight {
            what: format!("{} key stats", template.role.name()),
        });
    }
    let score = round2(weighted / total_w);
    if !score.is_finite() {
        return Err(ComputeError::NonFinite {
            what: format!("{} role score", template.role.name()),
        });
    }

    attributes.sort_by(|a, b| {
        b.percentile
            .cmp(&a.percentile)
            .then_with(|| b.weight.total_cmp(&a.weight))
            .then_with(|| a.stat.cmp(&b.stat))
    });

    Ok(Some(RoleScore {
        role: template.role,
        name: template.role.name().to_string(),
        score,
        rating_label: config.role_label(score).to_string(),
        description: template.description.clone(),
        key_attributes: attributes,
    }))
}
