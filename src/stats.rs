use std::fmt;

use serde::{Deserialize, Serialize};

/// Scouting-report statistics the engine knows how to read.
///
/// Declaration order is the canonical stat order used for every tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatId {
    NonPenaltyGoals,
    NonPenaltyXg,
    ShotsTotal,
    Assists,
    ExpectedAssistedGoals,
    NpxgPlusXag,
    ShotCreatingActions,
    PassesAttempted,
    PassCompletion,
    ProgressivePasses,
    ProgressiveCarries,
    SuccessfulTakeOns,
    TouchesAttPen,
    ProgressivePassesReceived,
    Tackles,
    Interceptions,
    Blocks,
    Clearances,
    AerialsWon,
    SavePercentage,
    GoalsAgainst,
    PsxgMinusGa,
    CrossesStopped,
    SweeperActions,
}

impl StatId {
    pub const ALL: [StatId; 24] = [
        StatId::NonPenaltyGoals,
        StatId::NonPenaltyXg,
        StatId::ShotsTotal,
        StatId::Assists,
        StatId::ExpectedAssistedGoals,
        StatId::NpxgPlusXag,
        StatId::ShotCreatingActions,
        StatId::PassesAttempted,
        StatId::PassCompletion,
        StatId::ProgressivePasses,
        StatId::ProgressiveCarries,
        StatId::SuccessfulTakeOns,
        StatId::TouchesAttPen,
        StatId::ProgressivePassesReceived,
        StatId::Tackles,
        StatId::Interceptions,
        StatId::Blocks,
        StatId::Clearances,
        StatId::AerialsWon,
        StatId::SavePercentage,
        StatId::GoalsAgainst,
        StatId::PsxgMinusGa,
        StatId::CrossesStopped,
        StatId::SweeperActions,
    ];

    /// Label as it appears in the scouting report feed.
    pub fn label(self) -> &'static str {
        match self {
            StatId::NonPenaltyGoals => "Non-Penalty Goals",
            StatId::NonPenaltyXg => "npxG: Non-Penalty xG",
            StatId::ShotsTotal => "Shots Total",
            StatId::Assists => "Assists",
            StatId::ExpectedAssistedGoals => "xAG: Exp. Assisted Goals",
            StatId::NpxgPlusXag => "npxG + xAG",
            StatId::ShotCreatingActions => "Shot-Creating Actions",
            StatId::PassesAttempted => "Passes Attempted",
            StatId::PassCompletion => "Pass Completion %",
            StatId::ProgressivePasses => "Progressive Passes",
            StatId::ProgressiveCarries => "Progressive Carries",
            StatId::SuccessfulTakeOns => "Successful Take-Ons",
            StatId::TouchesAttPen => "Touches (Att Pen)",
            StatId::ProgressivePassesReceived => "Progressive Passes Rec",
            StatId::Tackles => "Tackles",
            StatId::Interceptions => "Interceptions",
            StatId::Blocks => "Blocks",
            StatId::Clearances => "Clearances",
            StatId::AerialsWon => "Aerials Won",
            StatId::SavePercentage => "Save Percentage",
            StatId::GoalsAgainst => "Goals Against",
            StatId::PsxgMinusGa => "PSxG-GA",
            StatId::CrossesStopped => "Crosses Stopped",
            StatId::SweeperActions => "Def. Actions Outside Pen. Area",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            StatId::NonPenaltyXg => &["npxg", "non-penalty xg"],
            StatId::ExpectedAssistedGoals => &["xag", "expected assisted goals"],
            StatId::PassCompletion => &["pass completion", "pass completion percentage"],
            StatId::ProgressivePassesReceived => &["progressive passes received"],
            StatId::SuccessfulTakeOns => &["successful take ons", "take-ons won"],
            StatId::SavePercentage => &["save%", "save %", "save pct"],
            StatId::PsxgMinusGa => &["psxg - ga", "post-shot xg minus goals allowed"],
            StatId::CrossesStopped => &["crosses stopped %", "stop% (crosses)"],
            StatId::SweeperActions => &["sweeper actions", "#opa"],
            _ => &[],
        }
    }

    /// Resolve a feed label (case-insensitive, surrounding whitespace ignored).
    pub fn from_label(raw: &str) -> Option<StatId> {
        let needle = raw.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return None;
        }
        StatId::ALL.into_iter().find(|stat| {
            stat.label().eq_ignore_ascii_case(&needle)
                || stat.aliases().iter().any(|a| *a == needle)
        })
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PositionBase {
    FW,
    MF,
    DF,
    GK,
}

impl PositionBase {
    pub const ALL: [PositionBase; 4] = [
        PositionBase::FW,
        PositionBase::MF,
        PositionBase::DF,
        PositionBase::GK,
    ];

    /// Priority match over the raw position text; unknown text resolves to `MF`.
    pub fn from_raw(raw: &str) -> PositionBase {
        let s = raw.to_ascii_uppercase();
        let has_any = |tokens: &[&str]| tokens.iter().any(|t| s.contains(t));
        if has_any(&["FW", "ST", "CF", "LW", "RW"]) {
            return PositionBase::FW;
        }
        if has_any(&["MF", "CM", "DM", "AM"]) {
            return PositionBase::MF;
        }
        if has_any(&["DF", "CB", "LB", "RB"]) {
            return PositionBase::DF;
        }
        if s.contains("GK") {
            return PositionBase::GK;
        }
        PositionBase::MF
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PositionBase::FW => "FW",
            PositionBase::MF => "MF",
            PositionBase::DF => "DF",
            PositionBase::GK => "GK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatObservation {
    pub stat: StatId,
    pub per90: Option<f64>,
    pub percentile: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub age: u32,
    pub position_raw: String,
    pub club: String,
}

impl PlayerProfile {
    pub fn position_base(&self) -> PositionBase {
        PositionBase::from_raw(&self.position_raw)
    }
}

/// Lenient number parsing for feed values such as "1,234", "45.2%" or "-".
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_end_matches('%');
    if s.is_empty() || s == "-" {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == ',')
        .collect();
    let cleaned = cleaned.replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Lowercase, underscore-separated key used to address a player in storage.
pub fn normalize_name(input: &str) -> String {
    let lower = input.trim().to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut prev_us = false;
    for ch in lower.chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
            prev_us = false;
        } else if !prev_us && !out.is_empty() {
            out.push('_');
            prev_us = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
