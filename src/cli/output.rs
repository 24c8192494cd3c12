//! Output formatting for `edgewatch` commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use crate::domain::{AnnotatedValueBet, PlayerSummary, PredictResponse};
use crate::sync::SyncState;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Print a vec of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            if items.is_empty() {
                println!("(no results)");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
    }
    Ok(())
}

/// One value-bet line as shown in the live table
#[derive(Debug, Tabled, Serialize)]
pub struct ValueBetRow {
    #[tabled(rename = "")]
    pub flags: String,
    #[tabled(rename = "Start (UTC)")]
    pub start: String,
    #[tabled(rename = "Match")]
    pub matchup: String,
    #[tabled(rename = "Bet")]
    pub bet: String,
    #[tabled(rename = "Model")]
    pub model: String,
    #[tabled(rename = "Odds")]
    pub odds: String,
    #[tabled(rename = "Edge")]
    pub edge: String,
    #[tabled(rename = "Level")]
    pub level: String,
}

impl From<&AnnotatedValueBet> for ValueBetRow {
    fn from(bet: &AnnotatedValueBet) -> Self {
        let r = &bet.record;
        let flags = match (bet.is_new(), bet.edge_changed()) {
            (true, _) => "NEW",
            (false, true) => "Δ",
            (false, false) => "",
        };
        Self {
            flags: flags.to_string(),
            start: r.commence_time.format("%Y-%m-%d %H:%M").to_string(),
            matchup: format!("{} vs {}", r.player_a, r.player_b),
            bet: r.bet_player().to_string(),
            model: format!("{:.1}%", r.model_probability() * 100.0),
            odds: format!("{:.2}", r.bookmaker_odds()),
            edge: format!("{:+.1}%", r.edge() * 100.0),
            level: r.edge_level().to_string(),
        }
    }
}

#[derive(Debug, Tabled, Serialize)]
pub struct PlayerRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Country")]
    pub country: String,
    #[tabled(rename = "Hand")]
    pub hand: String,
    #[tabled(rename = "Recent")]
    pub recent_matches: u32,
}

impl From<&PlayerSummary> for PlayerRow {
    fn from(p: &PlayerSummary) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            country: p.country.clone().unwrap_or_else(|| "-".to_string()),
            hand: p.hand.clone().unwrap_or_else(|| "-".to_string()),
            recent_matches: p.recent_matches,
        }
    }
}

/// One-line status header printed above each table refresh
pub fn status_line(state: &SyncState) -> String {
    let updated = state
        .last_updated_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let mut line = format!(
        "[{}] {} value bets ({} new, {} changed), updated {}, next in {}s",
        state.status,
        state.records.len(),
        state.new_count(),
        state.changed_count(),
        updated,
        state.current_backoff_ms / 1000
    );
    if state.is_stale() {
        if let Some(err) = &state.last_error {
            line.push_str(&format!(" | stale: {}", err));
        }
    }
    line
}

pub fn print_value_bets(records: &[AnnotatedValueBet], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            let rows: Vec<ValueBetRow> = records.iter().map(ValueBetRow::from).collect();
            print_items(&rows, mode)
        }
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
            Ok(())
        }
    }
}

/// Print a published state: header plus table, or a single JSON line
pub fn print_state(state: &SyncState, mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            println!("{}", status_line(state));
            print_value_bets(&state.records, mode)
        }
        OutputMode::Json => {
            println!("{}", serde_json::to_string(state)?);
            Ok(())
        }
    }
}

pub fn print_players(players: &[PlayerSummary], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            let rows: Vec<PlayerRow> = players.iter().map(PlayerRow::from).collect();
            print_items(&rows, mode)
        }
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(players)?);
            Ok(())
        }
    }
}

pub fn print_prediction(resp: &PredictResponse, mode: OutputMode) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        println!("{}", serde_json::to_string_pretty(resp)?);
        return Ok(());
    }

    println!("{} vs {} ({})", resp.player_a, resp.player_b, resp.surface);
    println!(
        "  {:<24} {:>6.1}%",
        resp.player_a,
        resp.prob_a * 100.0
    );
    println!(
        "  {:<24} {:>6.1}%",
        resp.player_b,
        resp.prob_b * 100.0
    );
    println!("  Favourite: {}", resp.favourite());
    if let (Some(a), Some(b)) = (resp.edge_a, resp.edge_b) {
        println!("  Edge: A {:+.1}% / B {:+.1}%", a * 100.0, b * 100.0);
    }
    if let Some(label) = &resp.value_bet {
        println!("  {}", label);
    }
    Ok(())
}
