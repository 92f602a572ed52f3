use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisWarning, DataScope, ValidationError};
use crate::stats::{PlayerProfile, PositionBase, StatId, StatObservation, parse_number};

pub const MIN_PLAYER_AGE: u32 = 15;

/// Feed values arrive either as JSON numbers or as display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrText::Number(v) if v.is_finite() => Some(*v),
            NumberOrText::Number(_) => None,
            NumberOrText::Text(s) => parse_number(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatRow {
    pub stat: String,
    #[serde(default)]
    pub per_90: Option<NumberOrText>,
    #[serde(default)]
    pub percentile: Option<NumberOrText>,
}

impl RawStatRow {
    /// Whole number in 0..=100; `85.0` and `"85"` pass, `85.5` does not.
    pub fn percentile_value(&self) -> Option<u8> {
        let value = self.percentile.as_ref()?.as_f64()?;
        if value.fract() != 0.0 || !(0.0..=100.0).contains(&value) {
            return None;
        }
        Some(value as u8)
    }
}

/// Competition name -> season line ("minutes", "matches", "goals", ...).
pub type SeasonStats = BTreeMap<String, BTreeMap<String, NumberOrText>>;

/// Payload handed over by the data-acquisition collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    #[serde(default)]
    pub general_info: Option<GeneralInfo>,
    #[serde(default)]
    pub scouting_report: Option<Vec<RawStatRow>>,
    #[serde(default)]
    pub current_season_stats: Option<SeasonStats>,
}

impl PlayerInput {
    /// Minutes summed across competitions; unparsable lines count as zero.
    pub fn total_minutes(&self) -> f64 {
        self.current_season_stats
            .iter()
            .flat_map(|comps| comps.values())
            .filter_map(|line| line.get("minutes").and_then(NumberOrText::as_f64))
            .filter(|m| *m > 0.0)
            .sum()
    }

    pub fn player_name(&self) -> Option<&str> {
        self.general_info
            .as_ref()
            .and_then(|g| g.name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

pub fn parse_player_input_json(raw: &str) -> Result<PlayerInput> {
    serde_json::from_str::<PlayerInput>(raw).context("parse player input json")
}

/// Input that passed validation, with the rows that survived.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub profile: PlayerProfile,
    pub position_base: PositionBase,
    pub observations: Vec<StatObservation>,
    pub warnings: Vec<AnalysisWarning>,
    pub low_confidence: bool,
}

pub fn validate(input: &PlayerInput) -> Result<ValidatedInput, ValidationError> {
    let info = input.general_info.as_ref();
    let position = info.and_then(|g| g.position.as_deref()).map(str::trim);
    let age = info.and_then(|g| g.age);

    let mut missing = Vec::new();
    if position.is_none_or(str::is_empty) {
        missing.push("general_info.position");
    }
    if age.is_none() {
        missing.push("general_info.age");
    }
    if input.scouting_report.is_none() {
        missing.push("scouting_report");
    }
    let (Some(position), Some(age), Some(rows)) = (position, age, input.scouting_report.as_ref())
    else {
        return Err(ValidationError::MissingFields(missing));
    };
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }
    if age < MIN_PLAYER_AGE {
        return Err(ValidationError::InvalidAge(age));
    }

    let profile = PlayerProfile {
        name: input.player_name().unwrap_or("Unknown Player").to_string(),
        age,
        position_raw: position.to_string(),
        club: info
            .and_then(|g| g.club.as_deref())
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
    };

    let mut warnings = Vec::new();
    let mut observations: Vec<StatObservation> = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(percentile) = row.percentile_value() else {
            log::debug!("dropping {} with percentile {:?}", row.stat, row.percentile);
            warnings.push(AnalysisWarning::InvalidPercentile {
                stat: row.stat.clone(),
                percentile: row.percentile.as_ref().and_then(NumberOrText::as_f64),
            });
            continue;
        };
        let Some(stat) = StatId::from_label(&row.stat) else {
            log::debug!("ignoring unknown stat {:?}", row.stat);
            warnings.push(AnalysisWarning::UnknownStat {
                stat: row.stat.clone(),
            });
            continue;
        };
        if observations.iter().any(|o| o.stat == stat) {
            warnings.push(AnalysisWarning::DuplicateStat { stat });
            continue;
        }
        observations.push(StatObservation {
            stat,
            per90: row.per_90.as_ref().and_then(NumberOrText::as_f64),
            percentile,
        });
    }

    let low_confidence = observations.is_empty();
    if low_confidence {
        warnings.push(AnalysisWarning::InsufficientData {
            scope: DataScope::ScoutingReport,
        });
    }

    Ok(ValidatedInput {
        position_base: profile.position_base(),
        profile,
        observations,
        warnings,
        low_confidence,
    })
}
