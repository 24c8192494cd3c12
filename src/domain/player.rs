use serde::{Deserialize, Serialize};

/// Candidate returned by `GET /players/search`, ranked by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub hand: Option<String>,
    #[serde(default)]
    pub recent_matches: u32,
}
