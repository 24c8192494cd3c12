//! Snapshot Reconciliation
//!
//! Diffs a freshly fetched snapshot against the previously published state:
//! - Flags records whose key was not present before as new
//! - Flags records whose chosen-side edge moved by more than the threshold
//! - Drops records that disappeared (no tombstones)

use crate::domain::{AnnotatedValueBet, Annotations, RecordKey, ValueBetRecord};
use crate::sync::state::SyncState;
use std::collections::{HashMap, HashSet};

/// Absorbs binary rounding so that a delta of exactly one threshold
/// (e.g. 0.04 -> 0.03) does not count as "greater".
const EDGE_EPSILON: f64 = 1e-9;

/// Counts describing one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub added: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub removed: usize,
}

impl std::fmt::Display for ReconcileSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "+{} new, {} changed, {} unchanged, -{} removed",
            self.added, self.changed, self.unchanged, self.removed
        )
    }
}

/// Annotate `incoming` relative to `previous`. Pure and total.
pub fn reconcile(
    previous: &SyncState,
    incoming: Vec<ValueBetRecord>,
    edge_change_threshold: f64,
) -> Vec<AnnotatedValueBet> {
    reconcile_with_summary(previous, incoming, edge_change_threshold).0
}

pub fn reconcile_with_summary(
    previous: &SyncState,
    incoming: Vec<ValueBetRecord>,
    edge_change_threshold: f64,
) -> (Vec<AnnotatedValueBet>, ReconcileSummary) {
    let prev_edges: HashMap<RecordKey, f64> = previous
        .records
        .iter()
        .map(|b| (b.record.key(), b.record.edge()))
        .collect();

    let mut summary = ReconcileSummary::default();
    let mut seen: HashSet<RecordKey> = HashSet::with_capacity(incoming.len());

    let annotated = incoming
        .into_iter()
        .map(|record| {
            let key = record.key();
            let annotations = match prev_edges.get(&key) {
                None => {
                    summary.added += 1;
                    Annotations {
                        is_new: true,
                        edge_changed: false,
                    }
                }
                Some(prev_edge) => {
                    let changed =
                        (record.edge() - prev_edge).abs() > edge_change_threshold + EDGE_EPSILON;
                    if changed {
                        summary.changed += 1;
                    } else {
                        summary.unchanged += 1;
                    }
                    Annotations {
                        is_new: false,
                        edge_changed: changed,
                    }
                }
            };
            seen.insert(key);
            AnnotatedValueBet {
                record,
                annotations,
            }
        })
        .collect();

    summary.removed = prev_edges.keys().filter(|k| !seen.contains(*k)).count();

    (annotated, summary)
}
