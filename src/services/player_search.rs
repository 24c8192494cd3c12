//! Debounced player search.
//!
//! Edits arrive on a watch channel; a search is issued only after the input
//! has been stable for the debounce window and the trimmed query is long
//! enough. Shorter queries clear the results without calling the backend.

use crate::config::SearchConfig;
use crate::domain::PlayerSummary;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

#[async_trait]
pub trait PlayerSearch: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<PlayerSummary>>;
}

/// Latest published suggestions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub players: Vec<PlayerSummary>,
    pub error: Option<String>,
}

pub struct SearchDebouncer {
    searcher: Arc<dyn PlayerSearch>,
    debounce: Duration,
    min_query_len: usize,
    limit: u32,
}

impl SearchDebouncer {
    pub fn new(searcher: Arc<dyn PlayerSearch>, cfg: &SearchConfig) -> Self {
        Self {
            searcher,
            debounce: Duration::from_millis(cfg.debounce_ms),
            min_query_len: cfg.min_query_len,
            limit: cfg.limit,
        }
    }

    /// Trimmed query if it is long enough to search
    pub fn searchable<'a>(&self, input: &'a str) -> Option<&'a str> {
        let query = input.trim();
        (query.chars().count() >= self.min_query_len).then_some(query)
    }

    /// Consume edits until the input side is dropped.
    ///
    /// An edit still inside its window when the input closes is searched
    /// before returning.
    pub async fn run(self, mut input: watch::Receiver<String>, results: watch::Sender<SearchResults>) {
        let mut closed = false;
        while !closed {
            if input.changed().await.is_err() {
                return;
            }

            // Restart the window on every edit
            loop {
                match tokio::time::timeout(self.debounce, input.changed()).await {
                    Ok(Ok(())) => continue,
                    Ok(Err(_)) => {
                        closed = true;
                        break;
                    }
                    Err(_) => break,
                }
            }

            let raw = input.borrow_and_update().clone();
            let Some(query) = self.searchable(&raw) else {
                results.send_replace(SearchResults {
                    query: raw.trim().to_string(),
                    ..Default::default()
                });
                continue;
            };

            debug!("PlayerSearch: searching '{}' (limit={})", query, self.limit);
            let outcome = self.searcher.search(query, self.limit).await;

            // A newer edit supersedes this response
            if !closed && input.has_changed().unwrap_or(false) {
                continue;
            }

            let published = match outcome {
                Ok(players) => SearchResults {
                    query: query.to_string(),
                    players,
                    error: None,
                },
                Err(e) => {
                    warn!("PlayerSearch: search '{}' failed: {}", query, e);
                    SearchResults {
                        query: query.to_string(),
                        players: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            };
            results.send_replace(published);
        }
    }
}
