//! BackendClient against a local axum server on an ephemeral port.

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use edgewatch::adapters::BackendClient;
use edgewatch::domain::{BetSide, PredictRequest, Surface};
use edgewatch::error::{EdgewatchError, TransportError};
use edgewatch::sync::SnapshotFetcher;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

type Canned = Arc<Mutex<(StatusCode, String)>>;

fn value_bet(match_id: &str, side: &str, edge: f64) -> Value {
    json!({
        "match_id": match_id,
        "commence_time": "2026-10-14T12:00:00",
        "player_a": "Jannik Sinner",
        "player_b": "Carlos Alcaraz",
        "prob_a": 0.58,
        "prob_b": 0.42,
        "odds_a": 2.1,
        "odds_b": 1.8,
        "edge_a": if side == "A" { edge } else { -0.1 },
        "edge_b": if side == "B" { edge } else { -0.1 },
        "bet_side": side,
    })
}

async fn value_bets(State(canned): State<Canned>) -> impl IntoResponse {
    let (status, body) = canned.lock().unwrap().clone();
    (status, body)
}

async fn predict(Json(req): Json<Value>) -> impl IntoResponse {
    let player_a = req["player_a"].as_str().unwrap_or_default().to_string();
    let player_b = req["player_b"].as_str().unwrap_or_default().to_string();
    if player_a == "Nobody" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Giocatore non trovato: Nobody"})),
        );
    }
    let has_odds = req.get("odds_a").is_some();
    (
        StatusCode::OK,
        Json(json!({
            "player_a": player_a,
            "player_b": player_b,
            "surface": req["surface"],
            "prob_a": 0.62,
            "prob_b": 0.38,
            "features": {"elo_diff": 85.0},
            "edge_a": if has_odds { json!(0.064) } else { Value::Null },
            "edge_b": if has_odds { json!(-0.1) } else { Value::Null },
            "value_bet": if has_odds { json!("BET Jannik Sinner (edge: 6.4%)") } else { Value::Null },
        })),
    )
}

async fn search(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let q = params.get("q").cloned().unwrap_or_default();
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(8);
    let players: Vec<Value> = (0..3)
        .take(limit)
        .map(|i| json!({"id": i, "name": format!("{} {}", q, i), "country": "ITA", "recent_matches": 10 - i}))
        .collect();
    Json(players)
}

async fn spawn_backend(canned: Canned) -> String {
    let app = Router::new()
        .route("/value-bets", get(value_bets))
        .route("/predict", post(predict))
        .route("/players/search", get(search))
        .with_state(canned);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn client_with(status: StatusCode, body: String) -> BackendClient {
    let canned = Arc::new(Mutex::new((status, body)));
    let base = spawn_backend(canned).await;
    BackendClient::new(Some(&base), None).unwrap()
}

#[tokio::test]
async fn fetch_decodes_valid_snapshot() {
    let body = json!([value_bet("m1", "A", 0.064), value_bet("m2", "B", 0.05)]).to_string();
    let client = client_with(StatusCode::OK, body).await;

    let records = assert_ok!(client.fetch().await);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].match_id, "m1");
    assert_eq!(records[1].bet_side, BetSide::B);
    assert!((records[0].edge() - 0.064).abs() < 1e-12);
}

#[tokio::test]
async fn fetch_maps_server_error_to_status() {
    let client = client_with(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()).await;

    let err = assert_err!(client.fetch().await);
    assert_eq!(
        err,
        TransportError::Status {
            status: 500,
            body: "boom".to_string()
        }
    );
    assert_eq!(err.to_string(), "backend returned 500: boom");
}

#[tokio::test]
async fn fetch_rejects_malformed_body() {
    let client = client_with(StatusCode::OK, "[{\"match_id\": ".to_string()).await;
    assert!(matches!(
        client.fetch().await,
        Err(TransportError::Decode(_))
    ));
}

#[tokio::test]
async fn fetch_rejects_record_missing_field() {
    let mut row = value_bet("m1", "A", 0.06);
    row.as_object_mut().unwrap().remove("odds_b");
    let body = json!([value_bet("m0", "A", 0.06), row]).to_string();
    let client = client_with(StatusCode::OK, body).await;

    match client.fetch().await {
        Err(TransportError::InvalidRecord { index, reason }) => {
            assert_eq!(index, 1);
            assert!(reason.contains("odds_b"), "reason: {}", reason);
        }
        other => panic!("expected InvalidRecord, got {:?}", other),
    }
}

#[tokio::test]
async fn fetch_reports_unreachable_backend_as_request_error() {
    // Bind and drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BackendClient::new(Some(&format!("http://{}", addr)), None).unwrap();
    assert!(matches!(
        client.fetch().await,
        Err(TransportError::Request(_))
    ));
}

#[tokio::test]
async fn predict_returns_probabilities_and_edges() {
    let client = client_with(StatusCode::OK, "[]".to_string()).await;
    let req = PredictRequest::new("Jannik Sinner", "Carlos Alcaraz", Surface::Clay).with_odds(1.8, 2.1);

    let resp = client.predict(&req).await.unwrap();
    assert_eq!(resp.surface, "Clay");
    assert_eq!(resp.favourite(), "Jannik Sinner");
    assert_eq!(resp.edge_a, Some(0.064));
    assert_eq!(resp.value_bet.as_deref(), Some("BET Jannik Sinner (edge: 6.4%)"));
    assert_eq!(resp.features.get("elo_diff"), Some(&85.0));
}

#[tokio::test]
async fn predict_without_odds_has_no_edges() {
    let client = client_with(StatusCode::OK, "[]".to_string()).await;
    let req = PredictRequest::new("Jannik Sinner", "Carlos Alcaraz", Surface::Hard);

    let resp = assert_ok!(client.predict(&req).await);
    assert!(resp.edge_a.is_none());
    assert!(resp.value_bet.is_none());
}

#[tokio::test]
async fn predict_surfaces_server_detail_verbatim() {
    let client = client_with(StatusCode::OK, "[]".to_string()).await;
    let req = PredictRequest::new("Nobody", "Carlos Alcaraz", Surface::Grass);

    match client.predict(&req).await {
        Err(EdgewatchError::Api { status, detail }) => {
            assert_eq!(status, 404);
            assert_eq!(detail, "Giocatore non trovato: Nobody");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn search_sends_query_and_limit() {
    let client = client_with(StatusCode::OK, "[]".to_string()).await;

    let players = client.search_players("sin", 2).await.unwrap();
    assert_eq!(players.len(), 2);
    assert_eq!(players[0].name, "sin 0");
    assert_eq!(players[0].country.as_deref(), Some("ITA"));
    assert!(players[0].hand.is_none());
    assert_eq!(players[1].recent_matches, 9);
}
