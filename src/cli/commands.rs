//! Command handlers for the `edgewatch` binary.

use crate::adapters::BackendClient;
use crate::cli::output::{self, OutputMode};
use crate::config::AppConfig;
use crate::domain::{AnnotatedValueBet, PredictRequest, Surface};
use crate::services::{SearchDebouncer, SearchResults, StatusServer, StatusState};
use crate::sync::{AlwaysVisible, SyncScheduler, SyncStatus};
use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

/// Run the live value-bet table until Ctrl-C or `q`.
///
/// Typing `r` + Enter forces an immediate refresh.
pub async fn run_watch(cfg: &AppConfig, client: BackendClient, mode: OutputMode) -> anyhow::Result<()> {
    let scheduler = SyncScheduler::new(
        Arc::new(client),
        Arc::new(AlwaysVisible::new()),
        cfg.sync.clone(),
    );
    let handle = scheduler.start(None);
    let mut states = handle.subscribe();

    if let Some(port) = cfg.status_port {
        let server = StatusServer::new(Arc::new(StatusState::new(handle.subscribe())), port);
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("Status server failed: {}", e);
            }
        });
    }

    let mut stdin = spawn_stdin_lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl-C, stopping");
                break;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                // Loading transitions carry no new data for the table
                if state.status == SyncStatus::Loading && mode == OutputMode::Table {
                    continue;
                }
                output::print_state(&state, mode)?;
            }
            line = stdin.recv(), if stdin_open => {
                match line {
                    Some(cmd) => match cmd.trim() {
                        "r" | "refresh" => {
                            if let Err(e) = handle.refresh_now() {
                                warn!("Refresh rejected: {}", e);
                            }
                        }
                        "q" | "quit" => break,
                        "" => {}
                        other => eprintln!("unknown command '{}' (r = refresh, q = quit)", other),
                    },
                    None => stdin_open = false,
                }
            }
        }
    }

    handle.stop().await;
    Ok(())
}

/// Fetch once and print the snapshot without annotations
pub async fn run_snapshot(client: &BackendClient, mode: OutputMode) -> anyhow::Result<()> {
    let records = client
        .fetch_value_bets()
        .await
        .context("failed to fetch value bets")?;
    let annotated: Vec<AnnotatedValueBet> =
        records.into_iter().map(AnnotatedValueBet::unflagged).collect();
    output::print_value_bets(&annotated, mode)
}

pub async fn run_predict(
    client: &BackendClient,
    player_a: &str,
    player_b: &str,
    surface: Surface,
    odds: Option<(f64, f64)>,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let mut req = PredictRequest::new(player_a, player_b, surface);
    if let Some((odds_a, odds_b)) = odds {
        req = req.with_odds(odds_a, odds_b);
    }
    let resp = client.predict(&req).await?;
    output::print_prediction(&resp, mode)
}

/// One-off search, still subject to the minimum query length
pub async fn run_search(
    cfg: &AppConfig,
    client: &BackendClient,
    query: &str,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let query = query.trim();
    if query.chars().count() < cfg.search.min_query_len {
        anyhow::bail!(
            "query must be at least {} characters",
            cfg.search.min_query_len
        );
    }
    let players = client.search_players(query, cfg.search.limit).await?;
    output::print_players(&players, mode)
}

/// Interactive search: each stdin line is an edit of the query box
pub async fn run_search_interactive(
    cfg: &AppConfig,
    client: BackendClient,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let (input_tx, input_rx) = watch::channel(String::new());
    let (results_tx, mut results_rx) = watch::channel(SearchResults::default());
    let debouncer = SearchDebouncer::new(Arc::new(client), &cfg.search);
    let worker = tokio::spawn(debouncer.run(input_rx, results_tx));

    eprintln!("Type a player name (Ctrl-D to exit)");
    let mut stdin = spawn_stdin_lines();
    let mut last_printed: Option<SearchResults> = None;
    let mut interrupted = false;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                interrupted = true;
                break;
            }
            line = stdin.recv() => match line {
                Some(edit) => {
                    input_tx.send_replace(edit);
                }
                // EOF: the debouncer flushes the pending edit and exits
                None => break,
            },
            changed = results_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let results = results_rx.borrow_and_update().clone();
                print_results(&results, mode)?;
                last_printed = Some(results);
            }
        }
    }

    drop(input_tx);
    if interrupted {
        worker.abort();
        return Ok(());
    }

    worker.await.context("search worker panicked")?;
    let results = results_rx.borrow().clone();
    if last_printed.as_ref() != Some(&results) && !results.query.is_empty() {
        print_results(&results, mode)?;
    }
    Ok(())
}

/// Lines from stdin, read on a plain thread so an unfinished read never
/// holds up runtime shutdown.
fn spawn_stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        use std::io::BufRead;
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_results(results: &SearchResults, mode: OutputMode) -> anyhow::Result<()> {
    if let Some(err) = &results.error {
        eprintln!("search '{}' failed: {}", results.query, err);
        return Ok(());
    }
    if results.players.is_empty() && mode == OutputMode::Table {
        println!("(no suggestions for '{}')", results.query);
        return Ok(());
    }
    output::print_players(&results.players, mode)
}
