use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use once_cell::sync::OnceCell;
use rayon::prelude::*;

use crate::categories::{CategoryScores, score_categories};
use crate::confidence::score_confidence;
use crate::config::{EngineConfig, load_engine_config};
use crate::development::project_development;
use crate::error::{AnalysisWarning, ConfigError, DataScope, ValidationError};
use crate::input::{PlayerInput, ValidatedInput, validate};
use crate::rating::{OverallRating, overall_rating};
use crate::recommendations::generate_recommendations;
use crate::report::{AnalysisReport, performance_profile, summary_sentence};
use crate::roles::match_roles;
use crate::style::classify_style;

static ENGINE: OnceCell<Engine> = OnceCell::new();

/// Engine built from `load_engine_config()` on first use.
pub fn global_engine() -> Result<&'static Engine> {
    ENGINE.get_or_try_init(|| {
        let config = load_engine_config()?;
        Engine::new(config).context("build analysis engine")
    })
}

/// Stateless evaluator over an immutable, validated configuration.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one player. Pure: the same input always yields the same
    /// report, and `generated_at` is left unset.
    pub fn analyze(&self, input: &PlayerInput) -> Result<AnalysisReport, ValidationError> {
        let config = &self.config;
        let ValidatedInput {
            profile,
            position_base,
            observations,
            mut warnings,
            low_confidence,
        } = validate(input)?;
        log::debug!(
            "analyzing {} ({:?}, {} stats)",
            profile.name,
            position_base,
            observations.len()
        );

        let mut category_scores = CategoryScores::new();
        for (category, outcome) in score_categories(config, position_base, &observations) {
            match outcome {
                Ok(Some(score)) => {
                    category_scores.insert(category, score);
                }
                Ok(None) => warnings.push(AnalysisWarning::InsufficientData {
                    scope: DataScope::Category(category.key().to_string()),
                }),
                Err(err) => {
                    log::warn!("category {} failed: {err}", category.key());
                    warnings.push(AnalysisWarning::component_failure(
                        &format!("category:{}", category.key()),
                        &err,
                    ));
                }
            }
        }

        let (playing_style, missing_styles) = classify_style(config, position_base, &observations);
        warnings.extend(missing_styles.into_iter().map(|style| {
            AnalysisWarning::InsufficientData {
                scope: DataScope::Archetype(style.name().to_string()),
            }
        }));

        let (role_suitability, role_gaps) = match_roles(config, position_base, &observations);
        warnings.extend(role_gaps.without_data.into_iter().map(|role| {
            AnalysisWarning::InsufficientData {
                scope: DataScope::Role(role.name().to_string()),
            }
        }));
        for (role, err) in role_gaps.failed {
            log::warn!("role {} failed: {err}", role.name());
            warnings.push(AnalysisWarning::component_failure(
                &format!("role:{}", role.name()),
                &err,
            ));
        }

        let rating = match overall_rating(config, &category_scores) {
            Ok(rating) => rating,
            Err(err) => {
                log::warn!("overall rating failed: {err}");
                warnings.push(AnalysisWarning::component_failure("overall_rating", &err));
                OverallRating::fallback(config)
            }
        };
        if rating.breakdown.defaulted {
            log::warn!("no category scores, overall rating defaults to {}", rating.rating);
            warnings.push(AnalysisWarning::ComputationDefault {
                field: "overall_rating".to_string(),
                value: f64::from(rating.rating),
            });
        }

        let (development_analysis, dev_warning) = project_development(
            config,
            profile.age,
            &observations,
            &category_scores,
            rating.rating,
        );
        warnings.extend(dev_warning);

        let bracket = config.bracket_for_age(profile.age);
        let recommendations = generate_recommendations(
            config,
            bracket,
            &development_analysis.priority_areas,
            role_suitability.primary(),
        );

        let summary = summary_sentence(
            &profile.name,
            profile.age,
            position_base,
            rating.rating,
            &category_scores,
            &playing_style,
        );
        let performance_profile = performance_profile(config, position_base, &observations);

        let low_confidence =
            low_confidence || warnings.iter().any(AnalysisWarning::lowers_confidence);
        let (confidence, confidence_breakdown) =
            score_confidence(&config.confidence, input, low_confidence);
        log::debug!(
            "{}: rating {} confidence {confidence} ({} warnings)",
            profile.name,
            rating.rating,
            warnings.len()
        );

        Ok(AnalysisReport {
            player_name: profile.name,
            generated_at: None,
            position: profile.position_raw,
            position_base,
            age: profile.age,
            club: profile.club,
            overall_rating: rating.rating,
            rating_breakdown: rating.breakdown,
            summary,
            category_scores,
            performance_profile,
            playing_style,
            role_suitability,
            development_analysis,
            recommendations,
            confidence,
            confidence_breakdown,
            low_confidence,
            warnings,
        })
    }

    /// `analyze` plus a wall-clock `generated_at` stamp.
    pub fn analyze_now(&self, input: &PlayerInput) -> Result<AnalysisReport, ValidationError> {
        let mut report = self.analyze(input)?;
        report.generated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        Ok(report)
    }

    /// Analyze many players in parallel. Results keep the input order.
    pub fn analyze_batch(
        &self,
        inputs: &[PlayerInput],
    ) -> Vec<Result<AnalysisReport, ValidationError>> {
        inputs.par_iter().map(|input| self.analyze(input)).collect()
    }
}
