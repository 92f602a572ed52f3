use serde::{Deserialize, Serialize};

use crate::categories::{CategoryScores, round2};
use crate::config::{AgeBracketConfig, EngineConfig};
use crate::error::AnalysisWarning;
use crate::stats::{StatId, StatObservation};

const DEFAULT_CURRENT_LEVEL: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "Young Prospect")]
    YoungProspect,
    #[serde(rename = "Developing")]
    Developing,
    #[serde(rename = "Peak")]
    Peak,
    #[serde(rename = "Experienced")]
    Experienced,
    #[serde(rename = "Veteran")]
    Veteran,
}

impl AgeBracket {
    pub fn label(self) -> &'static str {
        match self {
            AgeBracket::YoungProspect => "Young Prospect",
            AgeBracket::Developing => "Developing",
            AgeBracket::Peak => "Peak",
            AgeBracket::Experienced => "Experienced",
            AgeBracket::Veteran => "Veteran",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    Important,
    Polish,
    Maintain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatGap {
    pub stat: StatId,
    pub label: String,
    pub current: u8,
    pub target: u8,
    pub gap: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorityAreas {
    pub critical: Vec<StatGap>,
    pub important: Vec<StatGap>,
    pub polish: Vec<StatGap>,
    pub strengths_to_maintain: Vec<StatGap>,
}

impl PriorityAreas {
    pub fn priority_of(&self, stat: StatId) -> Option<Priority> {
        let has = |bucket: &[StatGap]| bucket.iter().any(|g| g.stat == stat);
        if has(&self.critical) {
            Some(Priority::Critical)
        } else if has(&self.important) {
            Some(Priority::Important)
        } else if has(&self.polish) {
            Some(Priority::Polish)
        } else if has(&self.strengths_to_maintain) {
            Some(Priority::Maintain)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentProjection {
    pub age_category: AgeBracket,
    pub priority_areas: PriorityAreas,
    pub projected_peak: f64,
    pub time_to_peak_years: u32,
    pub potential_rating: u8,
    pub development_timeframe: String,
}

/// Age-conditioned projection of where the player can get to and what to
/// work on first.
pub fn project_development(
    config: &EngineConfig,
    age: u32,
    observations: &[StatObservation],
    categories: &CategoryScores,
    overall_rating: u8,
) -> (DevelopmentProjection, Option<AnalysisWarning>) {
    let bracket = config.bracket_for_age(age);
    let priority_areas = classify_observations(config, bracket, observations);

    let mut warning = None;
    let current = match current_level(observations, categories) {
        Some(level) => level,
        None => {
            log::warn!("no percentile data for projected peak, using {DEFAULT_CURRENT_LEVEL}");
            warning = Some(AnalysisWarning::ComputationDefault {
                field: "development_analysis.projected_peak".to_string(),
                value: DEFAULT_CURRENT_LEVEL,
            });
            DEFAULT_CURRENT_LEVEL
        }
    };
    let increase = config.potential_increase(age);
    let projected_peak = round2((current + increase).min(config.development.peak_cap));

    let projection = DevelopmentProjection {
        age_category: bracket.bracket,
        priority_areas,
        projected_peak,
        time_to_peak_years: config.development.peak_age.saturating_sub(age),
        potential_rating: potential_rating(config, age, overall_rating, categories),
        development_timeframe: development_timeframe(age).to_string(),
    };
    (projection, warning)
}

/// Place each observation in exactly one bucket: critical, important,
/// polish, or strengths to maintain.
pub fn classify_observations(
    config: &EngineConfig,
    bracket: &AgeBracketConfig,
    observations: &[StatObservation],
) -> PriorityAreas {
    let mut areas = PriorityAreas::default();
    for obs in observations {
        let p = obs.percentile;
        let (bucket, target) = if p < bracket.critical_below {
            (&mut areas.critical, gap_target(config, bracket, p))
        } else if p < bracket.important_below {
            (&mut areas.important, gap_target(config, bracket, p))
        } else if p < bracket.polish_below {
            (&mut areas.polish, gap_target(config, bracket, p))
        } else {
            (&mut areas.strengths_to_maintain, p)
        };
        bucket.push(StatGap {
            stat: obs.stat,
            label: obs.stat.label().to_string(),
            current: p,
            target,
            gap: target.saturating_sub(p),
        });
    }

    for bucket in [
        &mut areas.critical,
        &mut areas.important,
        &mut areas.polish,
        &mut areas.strengths_to_maintain,
    ] {
        bucket.sort_by(|a, b| a.current.cmp(&b.current).then_with(|| a.stat.cmp(&b.stat)));
    }
    areas
}

pub fn gap_target(config: &EngineConfig, bracket: &AgeBracketConfig, current: u8) -> u8 {
    let cap = config.development.target_cap;
    current.saturating_add(bracket.target_step).min(cap).max(current)
}

fn current_level(observations: &[StatObservation], categories: &CategoryScores) -> Option<f64> {
    if !categories.is_empty() {
        let sum: f64 = categories.values().map(|c| f64::from(c.score)).sum();
        return Some(sum / categories.len() as f64);
    }
    if !observations.is_empty() {
        let sum: f64 = observations.iter().map(|o| f64::from(o.percentile)).sum();
        return Some(sum / observations.len() as f64);
    }
    None
}

fn potential_rating(
    config: &EngineConfig,
    age: u32,
    overall_rating: u8,
    categories: &CategoryScores,
) -> u8 {
    let mut increase = config.potential_increase(age);
    if overall_rating >= 85 {
        increase *= 0.5;
    } else if overall_rating <= 65 {
        increase *= 1.2;
    }
    let exceptional = config.rating.exceptional_threshold;
    if categories.values().any(|c| c.score >= exceptional) {
        increase += 2.0;
    }
    let max = f64::from(config.rating.max_rating);
    (f64::from(overall_rating) + increase).round().min(max) as u8
}

pub fn development_timeframe(age: u32) -> &'static str {
    match age {
        0..=19 => "Long-term (3-5 years for full potential)",
        20..=23 => "Medium-term (2-3 years for peak performance)",
        24..=27 => "Short-term (1-2 years for refinements)",
        _ => "Maintenance phase",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{Category, CategoryScore};

    fn obs(stat: StatId, percentile: u8) -> StatObservation {
        StatObservation {
            stat,
            per90: None,
            percentile,
        }
    }

    fn scores(pairs: &[(Category, u8)]) -> CategoryScores {
        pairs
            .iter()
            .map(|(category, score)| {
                (
                    *category,
                    CategoryScore {
                        category: *category,
                        score: *score,
                        weight: 0.0,
                        contribution: 0.0,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn young_forward_projection_matches_formula() {
        let config = EngineConfig::default();
        let cats = scores(&[
            (Category::Attacking, 80),
            (Category::Possession, 60),
            (Category::Defensive, 40),
        ]);
        let (projection, warning) = project_development(&config, 19, &[], &cats, 70);
        assert!(warning.is_none());
        assert_eq!(projection.age_category, AgeBracket::YoungProspect);
        // mean 60 + potentialIncrease(19) = 15
        assert_eq!(projection.projected_peak, 75.0);
        assert_eq!(projection.time_to_peak_years, 8);
        assert_eq!(
            projection.development_timeframe,
            "Long-term (3-5 years for full potential)"
        );
    }

    #[test]
    fn projected_peak_is_capped() {
        let config = EngineConfig::default();
        let cats = scores(&[(Category::Attacking, 95)]);
        let (projection, _) = project_development(&config, 18, &[], &cats, 90);
        assert_eq!(projection.projected_peak, 99.0);
    }

    #[test]
    fn veteran_has_no_time_to_peak() {
        let config = EngineConfig::default();
        let cats = scores(&[(Category::Defensive, 70)]);
        let (projection, _) = project_development(&config, 35, &[], &cats, 72);
        assert_eq!(projection.age_category, AgeBracket::Veteran);
        assert_eq!(projection.time_to_peak_years, 0);
        assert_eq!(projection.projected_peak, 70.0);
        assert_eq!(projection.development_timeframe, "Maintenance phase");
    }

    #[test]
    fn every_observation_lands_in_one_bucket() {
        let config = EngineConfig::default();
        let rows: Vec<_> = StatId::ALL
            .iter()
            .enumerate()
            .map(|(i, s)| obs(*s, (i * 4) as u8))
            .collect();
        for age in [18, 23, 27, 31, 36] {
            let bracket = config.bracket_for_age(age);
            let areas = classify_observations(&config, bracket, &rows);
            let total = areas.critical.len()
                + areas.important.len()
                + areas.polish.len()
                + areas.strengths_to_maintain.len();
            assert_eq!(total, rows.len());
            for stat in StatId::ALL {
                assert!(areas.priority_of(stat).is_some());
            }
        }
    }

    #[test]
    fn peak_bracket_uses_tighter_thresholds() {
        let config = EngineConfig::default();
        let rows = [obs(StatId::Tackles, 68), obs(StatId::Blocks, 86)];
        let young = classify_observations(&config, config.bracket_for_age(20), &rows);
        let peak = classify_observations(&config, config.bracket_for_age(27), &rows);
        assert_eq!(young.priority_of(StatId::Tackles), Some(Priority::Important));
        assert_eq!(peak.priority_of(StatId::Tackles), Some(Priority::Critical));
        assert_eq!(young.priority_of(StatId::Blocks), Some(Priority::Maintain));
        assert_eq!(peak.priority_of(StatId::Blocks), Some(Priority::Polish));
    }

    #[test]
    fn targets_follow_bracket_step_and_cap() {
        let config = EngineConfig::default();
        let young = config.bracket_for_age(19);
        let peak = config.bracket_for_age(26);
        let old = config.bracket_for_age(31);
        assert_eq!(gap_target(&config, young, 40), 55);
        assert_eq!(gap_target(&config, young, 84), 95);
        assert_eq!(gap_target(&config, peak, 40), 50);
        assert_eq!(gap_target(&config, old, 40), 45);
    }

    #[test]
    fn no_data_falls_back_to_default_level() {
        let config = EngineConfig::default();
        let (projection, warning) =
            project_development(&config, 22, &[], &CategoryScores::new(), 70);
        assert_eq!(projection.projected_peak, 58.0);
        assert!(matches!(
            warning,
            Some(AnalysisWarning::ComputationDefault { .. })
        ));
    }

    #[test]
    fn potential_rating_adjusts_for_level() {
        let config = EngineConfig::default();
        let plain = scores(&[(Category::Attacking, 70)]);
        let elite = scores(&[(Category::Attacking, 90)]);
        // 60 + 15 * 1.2
        assert_eq!(potential_rating(&config, 19, 60, &plain), 78);
        // 88 + 15 * 0.5 + 2 = 97.5 -> 98
        assert_eq!(potential_rating(&config, 19, 88, &elite), 98);
        assert_eq!(potential_rating(&config, 31, 75, &plain), 75);
    }
}
