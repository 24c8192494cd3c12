//! Abstraction over the value-bet data source.
//!
//! The `SnapshotFetcher` trait decouples the scheduler from the transport so
//! the refresh loop can be driven by scripted fetchers in tests.

use crate::domain::{RawValueBet, RecordKey, ValueBetRecord};
use crate::error::TransportError;
use async_trait::async_trait;
use std::collections::HashSet;

/// One round-trip to the data source. No retries; the scheduler owns retry
/// policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch(&self) -> std::result::Result<Vec<ValueBetRecord>, TransportError>;
}

/// Decode a response body and enforce the record contract.
///
/// Records are decoded one at a time so a bad row is reported with its index.
pub fn parse_snapshot(body: &[u8]) -> std::result::Result<Vec<ValueBetRecord>, TransportError> {
    let rows: Vec<serde_json::Value> = serde_json::from_slice(body)?;
    let mut seen: HashSet<RecordKey> = HashSet::with_capacity(rows.len());
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let raw: RawValueBet =
            serde_json::from_value(row).map_err(|e| TransportError::InvalidRecord {
                index,
                reason: e.to_string(),
            })?;
        let record = raw
            .validate()
            .map_err(|reason| TransportError::InvalidRecord { index, reason })?;

        if !seen.insert(record.key()) {
            return Err(TransportError::DuplicateKey {
                match_id: record.match_id,
                side: record.bet_side.to_string(),
            });
        }
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BetSide;

    fn row(match_id: &str, side: &str) -> String {
        format!(
            r#"{{"match_id":"{match_id}","commence_time":"2026-10-14T12:00:00","player_a":"A","player_b":"B","prob_a":0.6,"prob_b":0.4,"odds_a":2.0,"odds_b":1.9,"edge_a":0.1,"edge_b":-0.12,"bet_side":"{side}"}}"#
        )
    }

    #[test]
    fn test_parse_empty_snapshot() {
        assert!(parse_snapshot(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_valid_snapshot() {
        let body = format!("[{},{}]", row("m1", "A"), row("m1", "B"));
        let records = parse_snapshot(body.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].bet_side, BetSide::B);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_snapshot(br#"{"error":"boom"}"#).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn test_parse_rejects_truncated_json() {
        let err = parse_snapshot(b"[{\"match_id\":").unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn test_parse_reports_bad_record_index() {
        let body = format!("[{},{{\"match_id\":\"m2\"}}]", row("m1", "A"));
        match parse_snapshot(body.as_bytes()).unwrap_err() {
            TransportError::InvalidRecord { index, reason } => {
                assert_eq!(index, 1);
                assert!(reason.contains("missing field"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_duplicate_keys() {
        let body = format!("[{},{}]", row("m1", "A"), row("m1", "A"));
        let err = parse_snapshot(body.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            TransportError::DuplicateKey {
                match_id: "m1".to_string(),
                side: "A".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_mock_fetcher_contract() {
        let mut mock = MockSnapshotFetcher::new();
        mock.expect_fetch()
            .times(1)
            .returning(|| Err(TransportError::Request("connection refused".to_string())));

        let err = mock.fetch().await.unwrap_err();
        assert_eq!(err.to_string(), "request failed: connection refused");
    }
}
