//! Faucet funding with height repair and bounded confirmation polling.
//!
//! The node's faucet rejects payouts with `400 Bad Request` until the chain
//! is past [`FaucetPolicy::maturity_height`]. Rather than make callers
//! pre-mine, the procedure mines the deficit itself and retries once. After a
//! successful payout it mines a confirmation block and polls the unspent
//! index until the output shows up confirmed, giving up with
//! [`ClientError::MissingInputs`] after [`FaucetPolicy::max_attempts`].
//!
//! ```text
//! Requesting ──ok──────────────► Confirming ──► Indexing ──found──► done
//!     │ 400                          ▲             │ empty
//!     ▼                              │             ├─ attempts left ─► Requesting
//! RepairingHeight ──retry ok─────────┘             └─ exhausted ─────► Exhausted
//! ```

use std::ops::RangeInclusive;
use std::time::Duration;

use bitcoin::{Amount, Script, Txid};
use rand::Rng;
use tracing::{debug, info};

use crate::client::RegtestClient;
use crate::error::ClientError;
use crate::parsing::decode_txid;
use crate::transport::DhttpRequest;
use crate::types::Unspent;

// ==============================================================================
// Policy
// ==============================================================================

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_MATURITY_HEIGHT: u64 = 432;

/// Retry bound, maturity threshold and the randomized delays of the procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaucetPolicy {
    /// Funding attempts before giving up with `Missing Inputs`.
    pub max_attempts: u32,
    /// Height below which the faucet answers `Bad Request`.
    pub maturity_height: u64,
    /// Pause after the confirmation block, before reading the unspent index.
    pub settle_delay: RangeInclusive<Duration>,
    /// Pause before retry `n`; the drawn value is multiplied by `n`.
    pub retry_backoff: RangeInclusive<Duration>,
}

impl FaucetPolicy {
    /// No delays at all. Meant for tests against a fake node.
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO..=Duration::ZERO,
            retry_backoff: Duration::ZERO..=Duration::ZERO,
            ..Self::default()
        }
    }

    fn settle(&self) -> Duration {
        jitter(&self.settle_delay)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        jitter(&self.retry_backoff) * attempt
    }
}

impl Default for FaucetPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            maturity_height: DEFAULT_MATURITY_HEIGHT,
            settle_delay: Duration::from_millis(250)..=Duration::from_millis(750),
            retry_backoff: Duration::from_millis(450)..=Duration::from_millis(750),
        }
    }
}

fn jitter(range: &RangeInclusive<Duration>) -> Duration {
    if range.start() >= range.end() {
        return *range.start();
    }
    rand::thread_rng().gen_range(range.clone())
}

// ==============================================================================
// Target
// ==============================================================================

/// Where the faucet pays to: an address, or a raw output script.
///
/// The destination string doubles as the key for the unspent lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaucetTarget {
    Address(String),
    Script(String),
}

impl FaucetTarget {
    pub fn address(address: &str) -> Self {
        Self::Address(address.to_owned())
    }

    pub fn script(script: &Script) -> Self {
        Self::Script(script.to_hex_string())
    }

    pub fn destination(&self) -> &str {
        match self {
            Self::Address(dest) | Self::Script(dest) => dest,
        }
    }

    fn endpoint(&self) -> &'static str {
        match self {
            Self::Address(_) => "faucet",
            Self::Script(_) => "faucetScript",
        }
    }

    fn param(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Script(_) => "script",
        }
    }
}

// ==============================================================================
// State Machine
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaucetState {
    Requesting,
    RepairingHeight,
    Confirming(Txid),
    Indexing(Txid),
    Exhausted,
}

pub(crate) async fn fund(
    client: &RegtestClient,
    target: &FaucetTarget,
    value: Amount,
    policy: &FaucetPolicy,
) -> Result<Unspent, ClientError> {
    let mut attempts: u32 = 0;
    let mut state = FaucetState::Requesting;

    loop {
        debug!(
            faucet.state = ?state,
            faucet.attempts = attempts,
            faucet.destination = target.destination(),
            "faucet step"
        );

        state = match state {
            FaucetState::Requesting => match request_payout(client, target, value).await {
                Ok(txid) => FaucetState::Confirming(txid),
                Err(err) if err.is_bad_request() => FaucetState::RepairingHeight,
                Err(err) => return Err(err),
            },
            FaucetState::RepairingHeight => {
                let height = client.height().await?;
                if height < policy.maturity_height {
                    let deficit = policy.maturity_height - height;
                    info!(height, deficit, "chain below faucet maturity, mining catch-up blocks");
                    client.mine(deficit).await?;
                }
                FaucetState::Confirming(request_payout(client, target, value).await?)
            }
            FaucetState::Confirming(txid) => {
                client.mine(1).await?;
                tokio::time::sleep(policy.settle()).await;
                FaucetState::Indexing(txid)
            }
            FaucetState::Indexing(txid) => {
                let mut confirmed: Vec<Unspent> = client
                    .unspents(target.destination())
                    .await?
                    .into_iter()
                    .filter(|unspent| unspent.tx_id == txid && unspent.is_confirmed())
                    .collect();
                if let Some(unspent) = confirmed.pop() {
                    return Ok(unspent);
                }

                attempts += 1;
                if attempts >= policy.max_attempts {
                    FaucetState::Exhausted
                } else {
                    info!("Missing Inputs, retry #{attempts}");
                    tokio::time::sleep(policy.backoff(attempts)).await;
                    FaucetState::Requesting
                }
            }
            FaucetState::Exhausted => return Err(ClientError::MissingInputs { attempts }),
        };
    }
}

async fn request_payout(
    client: &RegtestClient,
    target: &FaucetTarget,
    value: Amount,
) -> Result<Txid, ClientError> {
    let url = format!(
        "{}/r/{}?{}={}&value={}&key={}",
        client.api_url(),
        target.endpoint(),
        target.param(),
        target.destination(),
        value.to_sat(),
        client.api_pass(),
    );
    let body = client.dhttp(DhttpRequest::post(url)).await?;
    decode_txid(body)
}
