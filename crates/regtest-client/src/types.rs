//! Records returned by the node's query endpoints.
//!
//! Field names follow the node's JSON (`txId`, `txHex`, ...). Values are in
//! satoshis, scripts travel as hex.

use bitcoin::{Amount, ScriptBuf, Txid};
use serde::{Deserialize, Serialize};

use crate::parsing::lenient_u32;

// ==============================================================================
// Unspent Output
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unspent {
    pub value: Amount,
    pub tx_id: Txid,
    pub vout: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Confirmation height. Absent or negative while unconfirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
}

impl Unspent {
    pub fn is_confirmed(&self) -> bool {
        self.height.is_some_and(|height| height >= 0)
    }
}

// ==============================================================================
// Transaction
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInput {
    pub tx_id: Txid,
    pub vout: u32,
    pub script: ScriptBuf,
    #[serde(deserialize_with = "lenient_u32")]
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutput {
    pub value: Amount,
    pub script: ScriptBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub tx_id: Txid,
    pub tx_hex: String,
    pub vsize: u64,
    pub version: i32,
    pub locktime: u32,
    pub ins: Vec<TxInput>,
    pub outs: Vec<TxOutput>,
}
