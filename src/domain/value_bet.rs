use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side of a head-to-head match (player A or player B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetSide {
    A,
    B,
}

impl BetSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetSide::A => "A",
            BetSide::B => "B",
        }
    }
}

impl std::fmt::Display for BetSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a record within a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub match_id: String,
    pub side: BetSide,
}

/// Value bet row exactly as the backend serves it.
///
/// Every field is required; a missing one fails deserialization and the
/// fetcher rejects the snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct RawValueBet {
    pub match_id: String,
    pub commence_time: String,
    pub player_a: String,
    pub player_b: String,
    pub prob_a: f64,
    pub prob_b: f64,
    pub odds_a: f64,
    pub odds_b: f64,
    pub edge_a: f64,
    pub edge_b: f64,
    pub bet_side: BetSide,
}

impl RawValueBet {
    /// Check the data-source contract and convert into a record.
    pub fn validate(self) -> std::result::Result<ValueBetRecord, String> {
        if self.match_id.trim().is_empty() {
            return Err("match_id is empty".to_string());
        }
        let commence_time = parse_commence_time(&self.commence_time)
            .ok_or_else(|| format!("unparseable commence_time {:?}", self.commence_time))?;

        for (name, p) in [("prob_a", self.prob_a), ("prob_b", self.prob_b)] {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(format!("{} out of range: {}", name, p));
            }
        }
        for (name, o) in [("odds_a", self.odds_a), ("odds_b", self.odds_b)] {
            if !o.is_finite() || o <= 1.0 {
                return Err(format!("{} must be > 1.0, got {}", name, o));
            }
        }
        for (name, e) in [("edge_a", self.edge_a), ("edge_b", self.edge_b)] {
            if !e.is_finite() {
                return Err(format!("{} is not finite", name));
            }
        }

        Ok(ValueBetRecord {
            match_id: self.match_id,
            commence_time,
            player_a: self.player_a,
            player_b: self.player_b,
            prob_a: self.prob_a,
            prob_b: self.prob_b,
            odds_a: self.odds_a,
            odds_b: self.odds_b,
            edge_a: self.edge_a,
            edge_b: self.edge_b,
            bet_side: self.bet_side,
        })
    }
}

/// The backend emits either RFC 3339 or a naive ISO timestamp (UTC).
fn parse_commence_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// One betting opportunity for one match side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueBetRecord {
    pub match_id: String,
    pub commence_time: DateTime<Utc>,
    pub player_a: String,
    pub player_b: String,
    pub prob_a: f64,
    pub prob_b: f64,
    pub odds_a: f64,
    pub odds_b: f64,
    pub edge_a: f64,
    pub edge_b: f64,
    pub bet_side: BetSide,
}

impl ValueBetRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            match_id: self.match_id.clone(),
            side: self.bet_side,
        }
    }

    /// Model probability for the chosen side
    pub fn model_probability(&self) -> f64 {
        match self.bet_side {
            BetSide::A => self.prob_a,
            BetSide::B => self.prob_b,
        }
    }

    /// Decimal bookmaker odds for the chosen side
    pub fn bookmaker_odds(&self) -> f64 {
        match self.bet_side {
            BetSide::A => self.odds_a,
            BetSide::B => self.odds_b,
        }
    }

    /// Edge for the chosen side (model probability minus implied probability)
    pub fn edge(&self) -> f64 {
        match self.bet_side {
            BetSide::A => self.edge_a,
            BetSide::B => self.edge_b,
        }
    }

    pub fn bet_player(&self) -> &str {
        match self.bet_side {
            BetSide::A => &self.player_a,
            BetSide::B => &self.player_b,
        }
    }

    pub fn implied_probability(&self) -> f64 {
        1.0 / self.bookmaker_odds()
    }

    pub fn edge_level(&self) -> EdgeLevel {
        EdgeLevel::from_edge(self.edge())
    }
}

/// Coarse edge bucket used by renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl EdgeLevel {
    pub fn from_edge(edge: f64) -> Self {
        if edge >= 0.10 {
            EdgeLevel::VeryHigh
        } else if edge >= 0.07 {
            EdgeLevel::High
        } else if edge >= 0.05 {
            EdgeLevel::Medium
        } else {
            EdgeLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeLevel::Low => "low",
            EdgeLevel::Medium => "medium",
            EdgeLevel::High => "high",
            EdgeLevel::VeryHigh => "very-high",
        }
    }
}

impl std::fmt::Display for EdgeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-refresh flags computed by the reconciler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    pub is_new: bool,
    pub edge_changed: bool,
}

/// A record together with its reconciliation flags
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedValueBet {
    #[serde(flatten)]
    pub record: ValueBetRecord,
    #[serde(flatten)]
    pub annotations: Annotations,
}

impl AnnotatedValueBet {
    /// Wrap a record with no flags set (used for the initial snapshot)
    pub fn unflagged(record: ValueBetRecord) -> Self {
        Self {
            record,
            annotations: Annotations::default(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.annotations.is_new
    }

    pub fn edge_changed(&self) -> bool {
        self.annotations.edge_changed
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Record with the given key and chosen-side edge
    pub fn record(match_id: &str, side: BetSide, edge: f64) -> ValueBetRecord {
        ValueBetRecord {
            match_id: match_id.to_string(),
            commence_time: Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap(),
            player_a: "Jannik Sinner".to_string(),
            player_b: "Carlos Alcaraz".to_string(),
            prob_a: 0.55,
            prob_b: 0.45,
            odds_a: 2.0,
            odds_b: 1.9,
            edge_a: if side == BetSide::A { edge } else { -0.02 },
            edge_b: if side == BetSide::B { edge } else { -0.02 },
            bet_side: side,
        }
    }
}
