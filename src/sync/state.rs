use crate::domain::{AnnotatedValueBet, ValueBetRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Status of the most recent refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// No attempt has started yet
    Idle,
    /// An attempt is in flight
    Loading,
    /// Last resolved attempt succeeded
    Ok,
    /// Last resolved attempt failed; records are stale
    Error,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Idle => write!(f, "idle"),
            SyncStatus::Loading => write!(f, "loading"),
            SyncStatus::Ok => write!(f, "ok"),
            SyncStatus::Error => write!(f, "error"),
        }
    }
}

/// Observable state published by the scheduler after every transition.
///
/// Only the scheduler writes it; subscribers get clones through a watch
/// channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncState {
    pub status: SyncStatus,
    pub records: Vec<AnnotatedValueBet>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub current_backoff_ms: u64,
    pub consecutive_failures: u32,
}

impl SyncState {
    /// State before the first attempt. Initial records carry no flags.
    pub fn initial(initial: Option<Vec<ValueBetRecord>>, base_interval_ms: u64) -> Self {
        Self {
            status: SyncStatus::Idle,
            records: initial
                .unwrap_or_default()
                .into_iter()
                .map(AnnotatedValueBet::unflagged)
                .collect(),
            last_updated_at: None,
            last_error: None,
            current_backoff_ms: base_interval_ms,
            consecutive_failures: 0,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.status == SyncStatus::Error
    }

    pub fn new_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_new()).count()
    }

    pub fn changed_count(&self) -> usize {
        self.records.iter().filter(|r| r.edge_changed()).count()
    }
}
