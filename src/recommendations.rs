use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{AgeBracketConfig, EngineConfig};
use crate::development::{Priority, PriorityAreas, StatGap, gap_target};
use crate::roles::RoleScore;
use crate::stats::StatId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Development,
    RoleGap,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub area: String,
    pub stat: StatId,
    pub priority: Priority,
    pub source: RecommendationSource,
    pub current_level: u8,
    pub target_level: u8,
    pub timeframe: String,
}

struct Candidate {
    rank: u8,
    priority: Priority,
    source: RecommendationSource,
    current: u8,
    target: u8,
}

/// Merge development priority areas with the primary role's weak key stats
/// into one ranked list.
pub fn generate_recommendations(
    config: &EngineConfig,
    bracket: &AgeBracketConfig,
    areas: &PriorityAreas,
    primary_role: Option<&RoleScore>,
) -> Vec<Recommendation> {
    let mut merged: BTreeMap<StatId, Candidate> = BTreeMap::new();

    let development = [
        (Priority::Critical, &areas.critical),
        (Priority::Important, &areas.important),
        (Priority::Polish, &areas.polish),
    ];
    for (priority, bucket) in development {
        for gap in bucket.iter() {
            merged.insert(gap.stat, development_candidate(priority, gap));
        }
    }

    let rc = &config.recommendations;
    for attr in primary_role
        .map(|r| r.key_attributes.as_slice())
        .unwrap_or_default()
    {
        if attr.percentile >= rc.role_gap_below {
            continue;
        }
        let (rank, priority) = if attr.weight >= rc.high_weight_min {
            (1, Priority::Important)
        } else {
            (2, Priority::Polish)
        };
        match merged.get_mut(&attr.stat) {
            Some(existing) => {
                if rank < existing.rank {
                    existing.rank = rank;
                    existing.priority = priority;
                }
                existing.source = RecommendationSource::Both;
            }
            None => {
                merged.insert(
                    attr.stat,
                    Candidate {
                        rank,
                        priority,
                        source: RecommendationSource::RoleGap,
                        current: attr.percentile,
                        target: gap_target(config, bracket, attr.percentile),
                    },
                );
            }
        }
    }

    let mut ranked: Vec<(StatId, Candidate)> = merged.into_iter().collect();
    ranked.sort_by(|(sa, a), (sb, b)| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| a.current.cmp(&b.current))
            .then_with(|| sa.cmp(sb))
    });

    ranked
        .into_iter()
        .map(|(stat, c)| Recommendation {
            area: stat.label().to_string(),
            stat,
            priority: c.priority,
            source: c.source,
            current_level: c.current,
            target_level: c.target,
            timeframe: if c.priority == Priority::Critical {
                "Short-term".to_string()
            } else {
                "Medium-term".to_string()
            },
        })
        .collect()
}

fn development_candidate(priority: Priority, gap: &StatGap) -> Candidate {
    let rank = match priority {
        Priority::Critical => 0,
        Priority::Important => 1,
        _ => 2,
    };
    Candidate {
        rank,
        priority,
        source: RecommendationSource::Development,
        current: gap.current,
        target: gap.target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::development::classify_observations;
    use crate::roles::{KeyAttribute, RoleId};
    use crate::stats::StatObservation;

    fn obs(stat: StatId, percentile: u8) -> StatObservation {
        StatObservation {
            stat,
            per90: None,
            percentile,
        }
    }

    fn attr(stat: StatId, percentile: u8, weight: f64) -> KeyAttribute {
        KeyAttribute {
            stat,
            label: stat.label().to_string(),
            percentile,
            weight,
            is_strength: percentile >= 70,
        }
    }

    fn role(attrs: Vec<KeyAttribute>) -> RoleScore {
        RoleScore {
            role: RoleId::BallPlayingDefender,
            name: RoleId::BallPlayingDefender.name().to_string(),
            score: 60.0,
            rating_label: "Decent Fit".to_string(),
            description: String::new(),
            key_attributes: attrs,
        }
    }

    #[test]
    fn ranks_by_priority_then_worst_first() {
        let config = EngineConfig::default();
        let bracket = config.bracket_for_age(26);
        let rows = [
            obs(StatId::Tackles, 65),
            obs(StatId::Blocks, 30),
            obs(StatId::Clearances, 75),
            obs(StatId::AerialsWon, 88),
            obs(StatId::Interceptions, 95),
        ];
        let areas = classify_observations(&config, bracket, &rows);
        let recs = generate_recommendations(&config, bracket, &areas, None);
        let order: Vec<_> = recs.iter().map(|r| (r.stat, r.priority)).collect();
        assert_eq!(
            order,
            vec![
                (StatId::Blocks, Priority::Critical),
                (StatId::Tackles, Priority::Critical),
                (StatId::Clearances, Priority::Important),
                (StatId::AerialsWon, Priority::Polish),
            ]
        );
        assert_eq!(recs[0].target_level, 40);
        assert_eq!(recs[0].timeframe, "Short-term");
        assert_eq!(recs[2].timeframe, "Medium-term");
    }

    #[test]
    fn high_weight_role_gap_ranks_with_important() {
        let config = EngineConfig::default();
        let bracket = config.bracket_for_age(23);
        // No development rows, only role gaps.
        let areas = PriorityAreas::default();
        let primary = role(vec![
            attr(StatId::ProgressivePasses, 60, 0.30),
            attr(StatId::AerialsWon, 40, 0.15),
            attr(StatId::PassCompletion, 85, 0.25),
        ]);
        let recs = generate_recommendations(&config, bracket, &areas, Some(&primary));
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].stat, StatId::ProgressivePasses);
        assert_eq!(recs[0].priority, Priority::Important);
        assert_eq!(recs[0].source, RecommendationSource::RoleGap);
        assert_eq!(recs[0].target_level, 75);
        assert_eq!(recs[1].stat, StatId::AerialsWon);
        assert_eq!(recs[1].priority, Priority::Polish);
    }

    #[test]
    fn overlapping_stat_keeps_higher_priority() {
        let config = EngineConfig::default();
        let bracket = config.bracket_for_age(20);
        let rows = [obs(StatId::ProgressivePasses, 50), obs(StatId::Tackles, 78)];
        let areas = classify_observations(&config, bracket, &rows);
        let primary = role(vec![
            attr(StatId::ProgressivePasses, 50, 0.30),
            attr(StatId::Tackles, 78, 0.15),
        ]);
        let recs = generate_recommendations(&config, bracket, &areas, Some(&primary));
        assert_eq!(recs[0].stat, StatId::ProgressivePasses);
        assert_eq!(recs[0].priority, Priority::Critical);
        assert_eq!(recs[0].source, RecommendationSource::Both);
        assert_eq!(recs[1].stat, StatId::Tackles);
        assert_eq!(recs[1].source, RecommendationSource::Development);
    }
}
