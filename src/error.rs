use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::{PositionBase, StatId};

/// Malformed or missing required input. Aborts the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("player age {0} is below the minimum of 15")]
    InvalidAge(u32),
}

/// A sub-scorer could not produce a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputeError {
    #[error("non-finite value while computing {what}")]
    NonFinite { what: String },
    #[error("weights for {what} sum to zero")]
    ZeroWeight { what: String },
}

/// Configuration tables that break a startup invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("position weights for {position:?} sum to {sum:.4}, expected 1.0")]
    PositionWeightSum { position: PositionBase, sum: f64 },
    #[error("position weights for {position:?} are missing category {category}")]
    PositionWeightMissing {
        position: PositionBase,
        category: String,
    },
    #[error("category {0} has no member stats or a non-positive base weight")]
    BadCategory(String),
    #[error("role {role} key-stat weights sum to {sum:.4}, expected 1.0")]
    RoleWeightSum { role: String, sum: f64 },
    #[error("role {0} has no eligible positions")]
    RoleWithoutPositions(String),
    #[error("style {0} has no member stats")]
    EmptyArchetype(String),
    #[error("development brackets must be ordered by age with increasing thresholds: {0}")]
    BadBracket(String),
    #[error("importance multiplier for {stat} must be positive, got {value}")]
    BadMultiplier { stat: StatId, value: f64 },
    #[error("{owner} has weight {value} for {entry}, expected a finite non-negative value")]
    NegativeWeight {
        owner: String,
        entry: String,
        value: f64,
    },
    #[error("rating bounds need min <= default <= max, got min {min} default {default} max {max}")]
    RatingBounds { min: u8, max: u8, default: u8 },
    #[error("{0} must be sorted by strictly descending min_score")]
    UnsortedTiers(&'static str),
    #[error("potential steps must rise in age and not rise in increase: {0}")]
    BadPotentialStep(String),
}

/// Where data was missing when a partial result was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DataScope {
    Category(String),
    Archetype(String),
    Role(String),
    ScoutingReport,
    SeasonStats,
}

/// Non-fatal conditions attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// `percentile` is `None` when the feed cell was absent or not a number.
    InvalidPercentile {
        stat: String,
        percentile: Option<f64>,
    },
    UnknownStat { stat: String },
    DuplicateStat { stat: StatId },
    InsufficientData { scope: DataScope },
    ComputationDefault { field: String, value: f64 },
    ComponentFailure { component: String, message: String },
}

impl AnalysisWarning {
    pub fn component_failure(component: &str, err: &ComputeError) -> Self {
        AnalysisWarning::ComponentFailure {
            component: component.to_string(),
            message: err.to_string(),
        }
    }

    /// Warnings that flag the whole report as low confidence. A single
    /// unobserved category or role does not.
    pub fn lowers_confidence(&self) -> bool {
        matches!(
            self,
            AnalysisWarning::InsufficientData {
                scope: DataScope::ScoutingReport
            } | AnalysisWarning::ComputationDefault { .. }
                | AnalysisWarning::ComponentFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_lists_all() {
        let err = ValidationError::MissingFields(vec!["position", "age"]);
        assert_eq!(err.to_string(), "missing required fields: position, age");
    }

    #[test]
    fn warnings_serialize_tagged() {
        let w = AnalysisWarning::InsufficientData {
            scope: DataScope::Category("physical".to_string()),
        };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(
            json,
            r#"{"type":"insufficient_data","scope":{"kind":"category","name":"physical"}}"#
        );
        assert!(!w.lowers_confidence());
        assert!(
            AnalysisWarning::InsufficientData {
                scope: DataScope::ScoutingReport
            }
            .lowers_confidence()
        );
    }
}
