//! Live synchronization of the value-bet snapshot.
//!
//! - `fetcher`: one round-trip to the data source
//! - `reconciler`: annotate a new snapshot against the previous state
//! - `scheduler`: refresh loop with backoff, visibility gating and teardown
//! - `state`: the published state consumed by renderers

pub mod backoff;
pub mod fetcher;
pub mod reconciler;
pub mod scheduler;
pub mod state;
pub mod visibility;

pub use backoff::Backoff;
pub use fetcher::{parse_snapshot, SnapshotFetcher};
pub use reconciler::{reconcile, reconcile_with_summary, ReconcileSummary};
pub use scheduler::{SyncHandle, SyncScheduler};
pub use state::{SyncState, SyncStatus};
pub use visibility::{AlwaysVisible, Visibility, VisibilityHandle, VisibilitySource};
