//! End-to-end export runs against an in-memory explorer

use async_trait::async_trait;
use config_manager::SystemConfig;
use history_core::{HistoryError, HistoryExporter, TransferClass, TransferKind};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use tronscan_client::{ExplorerApi, TronscanError};

const ADDRESS: &str = "TLa2f6VPqDgRE67v1736s7bJ8Ray5wYjU7";

/// Serves paginated listings and TRC10 lookups from fixed data, recording every call
#[derive(Default)]
struct InMemoryExplorer {
    listings: HashMap<String, Vec<Value>>,
    trc10_tokens: HashMap<String, Value>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl InMemoryExplorer {
    fn listing(mut self, path: &str, items: Vec<Value>) -> Self {
        self.listings.insert(path.to_string(), items);
        self
    }

    fn trc10_token(mut self, id: &str, info: Value) -> Self {
        self.trc10_tokens.insert(id.to_string(), info);
        self
    }

    fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .count()
    }

    fn token_lookups(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == "api/token")
            .filter_map(|(_, id)| id.clone())
            .collect()
    }
}

fn param<'q>(query: &'q [(&str, String)], name: &str) -> Option<&'q str> {
    query
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.as_str())
}

#[async_trait]
impl ExplorerApi for InMemoryExplorer {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TronscanError> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), param(query, "id").map(str::to_string)));

        if path == "api/token" {
            let data: Vec<Value> = param(query, "id")
                .and_then(|id| self.trc10_tokens.get(id))
                .cloned()
                .into_iter()
                .collect();
            return Ok(json!({ "total": data.len(), "data": data }));
        }

        let items = self.listings.get(path).ok_or_else(|| TronscanError::ApiError {
            status: 404,
            message: format!("no route for {}", path),
        })?;
        let start: usize = param(query, "start").and_then(|s| s.parse().ok()).unwrap_or(0);
        let limit: usize = param(query, "limit").and_then(|s| s.parse().ok()).unwrap_or(20);
        let page: Vec<Value> = items.iter().skip(start).take(limit).cloned().collect();

        let key = if path == "api/token_trc20" { "trc20_tokens" } else { "data" };
        Ok(json!({ "total": items.len(), "rangeTotal": items.len(), key: page }))
    }
}

fn transfer(hash: &str, timestamp: u64, token: &str, amount: &str) -> Value {
    json!({
        "transactionHash": hash,
        "timestamp": timestamp,
        "block": timestamp / 3,
        "transferFromAddress": "TSender",
        "transferToAddress": ADDRESS,
        "amount": amount,
        "tokenName": token
    })
}

fn event(hash: &str, timestamp: u64, contract: &str, amount: &str) -> Value {
    json!({
        "transactionHash": hash,
        "timestamp": timestamp,
        "block": timestamp / 3,
        "transferFromAddress": ADDRESS,
        "transferToAddress": "TReceiver",
        "amount": amount,
        "contractAddress": contract
    })
}

fn bulk_token(contract: &str, symbol: &str) -> Value {
    json!({ "contract_address": contract, "symbol": symbol, "name": format!("{} Token", symbol) })
}

fn rows(output: Vec<u8>) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(output.as_slice())
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect()
}

fn headerless_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new())
}

#[tokio::test]
async fn test_three_streams_merge_by_timestamp() {
    let api = InMemoryExplorer::default()
        .listing("api/transfer/trx", vec![transfer("tx300", 300, "_", "1000000")])
        .listing("api/transfer/trc10", vec![transfer("tx250", 250, "1000001", "5000000")])
        .listing("api/contract/events", vec![event("tx280", 280, "Contract1", "100")])
        .listing("api/token_trc20", vec![bulk_token("Contract1", "XYZ")])
        .trc10_token("1000001", json!({ "abbr": "ABC", "name": "TokenA", "precision": 6 }));
    let config = SystemConfig::default();
    let exporter = HistoryExporter::new(&api, &config).with_classes(vec![
        TransferClass::new("TRX", "api/transfer/trx", TransferKind::TrxAndTrc10),
        TransferClass::new("TRC10", "api/transfer/trc10", TransferKind::TrxAndTrc10),
        TransferClass::new("TRC20", "api/contract/events", TransferKind::Trc20),
    ]);

    let mut writer = headerless_writer();
    let summary = exporter.export(ADDRESS, &mut writer).await.unwrap();
    let rows = rows(writer.into_inner().unwrap());

    assert_eq!(summary.rows_written, 3);
    assert_eq!(
        summary.downloaded,
        vec![
            ("TRX".to_string(), 1),
            ("TRC10".to_string(), 1),
            ("TRC20".to_string(), 1)
        ]
    );

    let timestamps: Vec<&str> = rows.iter().map(|row| row[1].as_str()).collect();
    assert_eq!(timestamps, vec!["300", "280", "250"]);

    assert_eq!(
        rows[0],
        vec!["tx300", "300", "100", "TSender", ADDRESS, "1.000000", "_", "TRX", "Tronix"]
    );
    assert_eq!(
        rows[1],
        vec!["tx280", "280", "93", ADDRESS, "TReceiver", "100", "Contract1", "XYZ", "Contract1"]
    );
    assert_eq!(rows[2][5], "5.000000");
    assert_eq!(rows[2][6], "1000001");
    assert_eq!(rows[2][7], "ABC");
    assert_eq!(rows[2][8], "TokenA");
}

#[tokio::test]
async fn test_default_classes_with_pagination_and_header() {
    let transfers: Vec<Value> = (0..45u64)
        .map(|i| {
            let ts = 10_000 - i * 100;
            if i % 3 == 0 {
                transfer(&format!("t{}", i), ts, "1000001", "1")
            } else {
                transfer(&format!("t{}", i), ts, "_", "2500000")
            }
        })
        .collect();
    let events: Vec<Value> = (0..30u64)
        .map(|i| event(&format!("e{}", i), 10_050 - i * 150, "Contract2", "42"))
        .collect();

    let api = InMemoryExplorer::default()
        .listing("api/transfer", transfers)
        .listing("api/contract/events", events)
        .listing("api/token_trc20", vec![bulk_token("Contract1", "XYZ")])
        .trc10_token("1000001", json!({ "abbr": "ABC", "name": "TokenA", "precision": 6 }));

    let mut config = SystemConfig::default();
    config.output.include_header = true;
    let exporter = HistoryExporter::new(&api, &config);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(config.output.include_header)
        .from_writer(Vec::new());
    let summary = exporter.export(ADDRESS, &mut writer).await.unwrap();
    let rows = rows(writer.into_inner().unwrap());

    assert_eq!(summary.rows_written, 75);
    assert_eq!(rows.len(), 76);
    assert_eq!(
        rows[0],
        vec![
            "transaction_hash",
            "timestamp",
            "block",
            "from",
            "to",
            "amount",
            "token_id",
            "token_symbol",
            "token_name"
        ]
    );

    let timestamps: Vec<u64> = rows[1..].iter().map(|row| row[1].parse().unwrap()).collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] >= pair[1]));

    // 15 TRC10 transfers of the same token share one metadata lookup
    assert_eq!(api.token_lookups(), vec!["1000001".to_string()]);
    assert_eq!(api.calls_to("api/token_trc20"), 1);

    // unknown TRC20 contract: empty symbol, contract address as name
    let unknown = rows.iter().find(|row| row[0] == "e0").unwrap();
    assert_eq!(unknown[7], "");
    assert_eq!(unknown[8], "Contract2");
    assert_eq!(unknown[5], "42");

    let trc10 = rows.iter().find(|row| row[0] == "t3").unwrap();
    assert_eq!(trc10[5], "0.000001");
    let trx = rows.iter().find(|row| row[0] == "t1").unwrap();
    assert_eq!(trx[5], "2.500000");
}

#[tokio::test]
async fn test_unknown_trc10_token_aborts_export() {
    let api = InMemoryExplorer::default()
        .listing("api/transfer", vec![transfer("tx1", 100, "1009999", "7")])
        .listing("api/contract/events", vec![])
        .listing("api/token_trc20", vec![]);
    let config = SystemConfig::default();

    let mut writer = headerless_writer();
    let err = HistoryExporter::new(&api, &config)
        .export(ADDRESS, &mut writer)
        .await
        .unwrap_err();

    assert!(matches!(err, HistoryError::MetadataNotFound { ref token_id } if token_id == "1009999"));
    assert!(writer.into_inner().unwrap().is_empty());
    // the TRC20 stream is never requested once the first stream fails
    assert_eq!(api.calls_to("api/contract/events"), 0);
}

#[tokio::test]
async fn test_transport_error_is_propagated() {
    let api = InMemoryExplorer::default();
    let config = SystemConfig::default();

    let mut writer = headerless_writer();
    let err = HistoryExporter::new(&api, &config)
        .export(ADDRESS, &mut writer)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HistoryError::Explorer(TronscanError::ApiError { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_invalid_address_makes_no_requests() {
    let api = InMemoryExplorer::default();
    let config = SystemConfig::default();

    let err = HistoryExporter::new(&api, &config)
        .download("not an address")
        .await
        .unwrap_err();

    assert!(matches!(err, HistoryError::InvalidAddress(_)));
    assert!(api.calls.lock().unwrap().is_empty());
}
