use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bitcoin::hashes::Hash;
use bitcoin::{Amount, BlockHash, Txid};
use reqwest::{StatusCode, Url};

use crate::error::ClientError;
use crate::types::{Transaction, Unspent};

use super::{Dhttp, DhttpRequest, ResponseBody};

/// An in-memory regtest node speaking the control API paths.
///
/// Faucet payments land in the unspent index unconfirmed and pick up a
/// height on the next `generate`, so callers that skip the confirmation
/// block never see them.
pub struct MockNode {
    state: Mutex<NodeState>,
    requests: Mutex<Vec<DhttpRequest>>,
}

struct NodeState {
    height: u64,
    faucet_rejections: usize,
    indexes_faucet_outputs: bool,
    fail_path: Option<(String, StatusCode)>,
    transactions: HashMap<Txid, Transaction>,
    unspents: HashMap<String, Vec<Unspent>>,
    next_tx: u32,
}

impl MockNode {
    pub fn builder() -> MockNodeBuilder {
        MockNodeBuilder {
            state: NodeState {
                height: 500,
                faucet_rejections: 0,
                indexes_faucet_outputs: true,
                fail_path: None,
                transactions: HashMap::new(),
                unspents: HashMap::new(),
                next_tx: 1,
            },
        }
    }

    pub fn requests(&self) -> Vec<DhttpRequest> {
        self.requests.lock().expect("request log lock").clone()
    }

    /// Requests whose path (below the `/1` API prefix) starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<DhttpRequest> {
        self.requests()
            .into_iter()
            .filter(|req| api_path(&req.url).is_some_and(|path| path.starts_with(prefix)))
            .collect()
    }

    pub fn height(&self) -> u64 {
        self.state.lock().expect("node state lock").height
    }

    fn handle(&self, request: &DhttpRequest) -> Result<ResponseBody, ClientError> {
        let url = Url::parse(&request.url)
            .map_err(|e| ClientError::InvalidResponse(format!("mock: bad url: {e}")))?;
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let path = api_path(&request.url).unwrap_or_default();
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        let mut state = self.state.lock().expect("node state lock");
        if let Some((prefix, status)) = &state.fail_path {
            if path.starts_with(prefix.as_str()) {
                return Err(status_error(*status));
            }
        }

        match (request.method.as_str(), segments.as_slice()) {
            ("POST", ["t", "push"]) => Ok(ResponseBody::Empty),
            ("POST", ["r", "generate"]) => {
                let count: u64 = query_param(&query, "count")?;
                state.height += count;
                let height = state.height;
                for unspent in state.unspents.values_mut().flatten() {
                    if unspent.height.is_none() {
                        unspent.height = Some(height as i64);
                    }
                }
                let ids = (0..count)
                    .map(|i| block_hash(height.saturating_sub(i)).to_string())
                    .collect::<Vec<_>>();
                Ok(ResponseBody::Json(serde_json::json!(ids)))
            }
            ("GET", ["b", "best", "height"]) => {
                Ok(ResponseBody::Text(state.height.to_string()))
            }
            ("GET", ["t", txid, "json"]) => {
                let txid: Txid = txid.parse().map_err(|_| status_error(StatusCode::BAD_REQUEST))?;
                let tx = state
                    .transactions
                    .get(&txid)
                    .ok_or_else(|| status_error(StatusCode::NOT_FOUND))?;
                Ok(ResponseBody::Json(serde_json::to_value(tx).expect("tx serializes")))
            }
            ("GET", ["a", address, "unspents"]) => {
                let list = state.unspents.get(*address).cloned().unwrap_or_default();
                Ok(ResponseBody::Json(serde_json::to_value(list).expect("unspents serialize")))
            }
            ("POST", ["r", endpoint @ ("faucet" | "faucetScript")]) => {
                let key = if *endpoint == "faucet" { "address" } else { "script" };
                let destination: String = query_param(&query, key)?;
                let value: u64 = query_param(&query, "value")?;
                if state.faucet_rejections > 0 {
                    state.faucet_rejections -= 1;
                    return Err(status_error(StatusCode::BAD_REQUEST));
                }

                let txid = payout_txid(state.next_tx);
                state.next_tx += 1;
                if state.indexes_faucet_outputs {
                    state.unspents.entry(destination.clone()).or_default().push(Unspent {
                        value: Amount::from_sat(value),
                        tx_id: txid,
                        vout: 0,
                        address: Some(destination),
                        height: None,
                    });
                }
                Ok(ResponseBody::Text(txid.to_string()))
            }
            _ => Err(status_error(StatusCode::NOT_FOUND)),
        }
    }
}

#[async_trait]
impl Dhttp for MockNode {
    async fn request(&self, request: DhttpRequest) -> Result<ResponseBody, ClientError> {
        self.requests
            .lock()
            .expect("request log lock")
            .push(request.clone());
        self.handle(&request)
    }
}

pub struct MockNodeBuilder {
    state: NodeState,
}

impl MockNodeBuilder {
    pub fn with_height(mut self, height: u64) -> Self {
        self.state.height = height;
        self
    }

    /// Answer the next `count` faucet requests with `400 Bad Request`.
    pub fn rejecting_faucet(mut self, count: usize) -> Self {
        self.state.faucet_rejections = count;
        self
    }

    /// Accept faucet requests but never show their outputs as unspent.
    pub fn never_indexing(mut self) -> Self {
        self.state.indexes_faucet_outputs = false;
        self
    }

    /// Fail every request whose API path starts with `prefix`.
    pub fn failing(mut self, prefix: &str, status: StatusCode) -> Self {
        self.state.fail_path = Some((prefix.to_owned(), status));
        self
    }

    pub fn with_tx(mut self, tx: Transaction) -> Self {
        self.state.transactions.insert(tx.tx_id, tx);
        self
    }

    pub fn with_unspent(mut self, address: &str, unspent: Unspent) -> Self {
        self.state
            .unspents
            .entry(address.to_owned())
            .or_default()
            .push(unspent);
        self
    }

    pub fn build(self) -> MockNode {
        MockNode {
            state: Mutex::new(self.state),
            requests: Mutex::new(Vec::new()),
        }
    }
}

fn api_path(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.path().strip_prefix("/1").map(str::to_owned)
}

fn query_param<T: std::str::FromStr>(
    query: &HashMap<String, String>,
    key: &str,
) -> Result<T, ClientError> {
    query
        .get(key)
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| status_error(StatusCode::BAD_REQUEST))
}

fn status_error(status: StatusCode) -> ClientError {
    ClientError::Status {
        status,
        body: String::new(),
    }
}

/// Txid of the `n`th faucet payout (1-based) made by a [`MockNode`].
pub fn payout_txid(n: u32) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(&n.to_le_bytes());
    bytes[31] = 0xfa;
    Txid::from_byte_array(bytes)
}

fn block_hash(height: u64) -> BlockHash {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&height.to_le_bytes());
    BlockHash::from_byte_array(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://127.0.0.1:8080/1";

    #[tokio::test]
    async fn generate_confirms_pending_faucet_outputs() {
        let node = MockNode::builder().with_height(10).build();
        let txid = node
            .request(DhttpRequest::post(format!("{BASE}/r/faucet?address=addr&value=7&key=k")))
            .await
            .expect("faucet succeeds");
        assert!(matches!(txid, ResponseBody::Text(_)));

        node.request(DhttpRequest::post(format!("{BASE}/r/generate?count=2&key=k")))
            .await
            .expect("generate succeeds");
        assert_eq!(node.height(), 12);

        let body = node
            .request(DhttpRequest::get(format!("{BASE}/a/addr/unspents")))
            .await
            .expect("unspents succeed");
        let ResponseBody::Json(list) = body else {
            panic!("unspents must be JSON");
        };
        assert_eq!(list[0]["height"], 12);
        assert_eq!(list[0]["value"], 7);
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let node = MockNode::builder().build();
        let err = node
            .request(DhttpRequest::get(format!("{BASE}/nope")))
            .await
            .expect_err("must fail");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(node.requests().len(), 1);
    }
}
