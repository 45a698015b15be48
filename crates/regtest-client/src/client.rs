//! The regtest control-API client.
//!
//! Every operation is one call through [`RegtestClient::dhttp`], except the
//! faucet procedure in [`crate::faucet`] which strings several together.

use std::sync::Arc;

use bitcoin::{Amount, Script, Txid};
use tracing::{info, warn};

use crate::address;
use crate::config::{ClientConfig, ClientOptions};
use crate::error::ClientError;
use crate::faucet::{self, FaucetPolicy, FaucetTarget};
use crate::network::NetworkParams;
use crate::parsing::{decode_height, decode_json};
use crate::transport::{Dhttp, DhttpRequest, HttpTransport, ResponseBody};
use crate::types::{Transaction, Unspent};

/// Client for a regtest node's HTTP control API.
///
/// Cheap to clone; clones share the transport. Construction performs no I/O.
/// Concurrent calls are not coordinated: two faucets racing on one address,
/// or mining while another task reads the height, is the caller's problem.
#[derive(Clone)]
pub struct RegtestClient {
    config: ClientConfig,
    transport: Arc<dyn Dhttp>,
}

impl RegtestClient {
    /// Resolve `options` against the process environment and talk HTTP.
    pub fn new(options: ClientOptions) -> Self {
        Self::from_config(ClientConfig::from_env(options))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Dhttp>) -> Self {
        Self { config, transport }
    }

    pub fn network(&self) -> &NetworkParams {
        &self.config.network
    }

    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    pub(crate) fn api_pass(&self) -> &str {
        &self.config.api_pass
    }

    pub fn log_requests(&self) -> bool {
        self.config.log_requests
    }

    // ==========================================================================
    // Primitive
    // ==========================================================================

    /// Issue one request and return the parsed body.
    ///
    /// With request logging on, the request is logged before it is sent and
    /// failures are logged with the raw response body. Logging never changes
    /// the result.
    pub async fn dhttp(&self, request: DhttpRequest) -> Result<ResponseBody, ClientError> {
        if self.config.log_requests {
            info!(
                http.method = %request.method,
                http.url = %request.url,
                network = %self.config.network.bech32,
                "regtest request"
            );
        }

        let result = self.transport.request(request.clone()).await;

        if self.config.log_requests {
            match &result {
                Err(ClientError::Status { status, body }) => warn!(
                    http.url = %request.url,
                    %status,
                    body = %body,
                    "regtest request failed"
                ),
                Err(err) => warn!(http.url = %request.url, error = %err, "regtest request failed"),
                Ok(_) => {}
            }
        }

        result
    }

    // ==========================================================================
    // Endpoints
    // ==========================================================================

    /// Push a raw transaction. The node's answer is passed through untouched.
    pub async fn broadcast(&self, tx_hex: &str) -> Result<ResponseBody, ClientError> {
        let url = format!("{}/t/push", self.config.api_url);
        self.dhttp(DhttpRequest::post(url).with_body(tx_hex)).await
    }

    /// Mine `count` blocks and return their ids. `mine(0)` still hits the node.
    pub async fn mine(&self, count: u64) -> Result<Vec<String>, ClientError> {
        let url = format!(
            "{}/r/generate?count={count}&key={}",
            self.config.api_url, self.config.api_pass
        );
        let body = self.dhttp(DhttpRequest::post(url)).await?;
        decode_json(body, "generate")
    }

    pub async fn height(&self) -> Result<u64, ClientError> {
        let url = format!("{}/b/best/height", self.config.api_url);
        decode_height(self.dhttp(DhttpRequest::get(url)).await?)
    }

    pub async fn fetch(&self, txid: &Txid) -> Result<Transaction, ClientError> {
        let url = format!("{}/t/{txid}/json", self.config.api_url);
        decode_json(self.dhttp(DhttpRequest::get(url)).await?, "transaction")
    }

    /// Unspent outputs for `address`, in the order the node lists them.
    pub async fn unspents(&self, address: &str) -> Result<Vec<Unspent>, ClientError> {
        let url = format!("{}/a/{address}/unspents", self.config.api_url);
        decode_json(self.dhttp(DhttpRequest::get(url)).await?, "unspents")
    }

    // ==========================================================================
    // Verification
    // ==========================================================================

    /// Fetch `txo.tx_id` and assert output `txo.vout` matches `txo`.
    ///
    /// The address is compared only when present and non-empty; the value
    /// only when non-zero. A zero value is therefore never checked.
    ///
    /// # Panics
    ///
    /// On a mismatch, or when the transaction has no output `txo.vout`.
    /// Fetch failures are returned as errors.
    pub async fn verify(&self, txo: &Unspent) -> Result<(), ClientError> {
        let tx = self.fetch(&txo.tx_id).await?;
        let actual = tx.outs.get(txo.vout as usize).unwrap_or_else(|| {
            panic!(
                "transaction {} has no output {} ({} outputs)",
                txo.tx_id,
                txo.vout,
                tx.outs.len()
            )
        });

        if let Some(address) = txo.address.as_deref().filter(|a| !a.is_empty()) {
            assert_eq!(
                actual.address.as_deref(),
                Some(address),
                "address mismatch for {}:{}",
                txo.tx_id,
                txo.vout
            );
        }
        if txo.value != Amount::ZERO {
            assert_eq!(
                actual.value, txo.value,
                "value mismatch for {}:{}",
                txo.tx_id, txo.vout
            );
        }
        Ok(())
    }

    // ==========================================================================
    // Addresses
    // ==========================================================================

    /// A fresh, well-formed P2PKH address under this network's version byte.
    pub fn random_address(&self) -> String {
        address::random_address(self.config.network.pub_key_hash)
    }

    /// The process-wide memoized random address.
    ///
    /// Shared by every client in the process, not per instance: whichever
    /// client asks first fixes the value for all of them.
    pub fn shared_random_address(&self) -> &'static str {
        address::shared_random_address(self.config.network.pub_key_hash)
    }

    // ==========================================================================
    // Faucet
    // ==========================================================================

    /// Fund `address` with `value` and return the confirmed unspent.
    pub async fn faucet(&self, address: &str, value: Amount) -> Result<Unspent, ClientError> {
        self.faucet_with_policy(FaucetTarget::address(address), value, &FaucetPolicy::default())
            .await
    }

    /// Fund a raw output script. The script's hex is also the unspent lookup key.
    pub async fn faucet_complex(
        &self,
        script: &Script,
        value: Amount,
    ) -> Result<Unspent, ClientError> {
        self.faucet_with_policy(FaucetTarget::script(script), value, &FaucetPolicy::default())
            .await
    }

    pub async fn faucet_with_policy(
        &self,
        target: FaucetTarget,
        value: Amount,
        policy: &FaucetPolicy,
    ) -> Result<Unspent, ClientError> {
        faucet::fund(self, &target, value, policy).await
    }
}

impl std::fmt::Debug for RegtestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegtestClient")
            .field("api_url", &self.config.api_url)
            .field("network", &self.config.network.bech32)
            .field("log_requests", &self.config.log_requests)
            .finish_non_exhaustive()
    }
}
