use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Court surface accepted by the prediction endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Surface {
    Hard,
    Clay,
    Grass,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Hard => "Hard",
            Surface::Clay => "Clay",
            Surface::Grass => "Grass",
        }
    }
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Surface {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hard" => Ok(Surface::Hard),
            "clay" => Ok(Surface::Clay),
            "grass" => Ok(Surface::Grass),
            other => Err(format!("unknown surface '{}' (expected Hard, Clay or Grass)", other)),
        }
    }
}

/// Request body for `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictRequest {
    pub player_a: String,
    pub player_b: String,
    pub surface: Surface,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds_a: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds_b: Option<f64>,
}

impl PredictRequest {
    pub fn new(player_a: impl Into<String>, player_b: impl Into<String>, surface: Surface) -> Self {
        Self {
            player_a: player_a.into(),
            player_b: player_b.into(),
            surface,
            odds_a: None,
            odds_b: None,
        }
    }

    pub fn with_odds(mut self, odds_a: f64, odds_b: f64) -> Self {
        self.odds_a = Some(odds_a);
        self.odds_b = Some(odds_b);
        self
    }

    /// Reject requests the backend would refuse anyway
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let a = self.player_a.trim();
        let b = self.player_b.trim();
        if a.is_empty() || b.is_empty() {
            errors.push("both player names are required".to_string());
        } else if a.eq_ignore_ascii_case(b) {
            errors.push("player_a and player_b must differ".to_string());
        }

        for (name, odds) in [("odds_a", self.odds_a), ("odds_b", self.odds_b)] {
            if let Some(o) = odds {
                if !o.is_finite() || o <= 1.0 {
                    errors.push(format!("{} must be > 1.0", name));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Response body of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub player_a: String,
    pub player_b: String,
    pub surface: String,
    pub prob_a: f64,
    pub prob_b: f64,
    /// Differential features (A minus B)
    #[serde(default)]
    pub features: BTreeMap<String, f64>,
    #[serde(default)]
    pub player_a_details: BTreeMap<String, f64>,
    #[serde(default)]
    pub player_b_details: BTreeMap<String, f64>,
    #[serde(default)]
    pub edge_a: Option<f64>,
    #[serde(default)]
    pub edge_b: Option<f64>,
    /// Human-readable label, e.g. "BET Jannik Sinner (edge: 4.2%)" or "NO VALUE"
    #[serde(default)]
    pub value_bet: Option<String>,
}

impl PredictResponse {
    /// Name of the predicted winner
    pub fn favourite(&self) -> &str {
        if self.prob_a >= self.prob_b {
            &self.player_a
        } else {
            &self.player_b
        }
    }
}
