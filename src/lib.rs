pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod sync;

pub use adapters::BackendClient;
pub use config::{AppConfig, ResponseOrdering, SyncConfig};
pub use domain::{AnnotatedValueBet, BetSide, EdgeLevel, RecordKey, ValueBetRecord};
pub use error::{EdgewatchError, Result, TransportError};
pub use services::{SearchDebouncer, StatusServer, StatusState};
pub use sync::{
    reconcile, AlwaysVisible, SnapshotFetcher, SyncHandle, SyncScheduler, SyncState, SyncStatus,
    Visibility, VisibilityHandle, VisibilitySource,
};
