//! Protocol constants for the chain the node runs.
//!
//! Only the address-version bytes are consumed by this crate (see
//! [`crate::RegtestClient::random_address`]); the rest is carried so callers
//! building transactions can read them off the same client.

use serde::{Deserialize, Serialize};

/// Extended-key version bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bip32Versions {
    pub public: u32,
    pub private: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkParams {
    pub message_prefix: String,
    pub bech32: String,
    pub bip32: Bip32Versions,
    pub pub_key_hash: u8,
    pub script_hash: u8,
    pub wif: u8,
}

impl NetworkParams {
    pub fn regtest() -> Self {
        Self {
            message_prefix: "\x18Bitcoin Signed Message:\n".to_owned(),
            bech32: "bcrt".to_owned(),
            bip32: Bip32Versions {
                public: 0x0435_87cf,
                private: 0x0435_8394,
            },
            pub_key_hash: 0x6f,
            script_hash: 0xc4,
            wif: 0xef,
        }
    }

    /// Testnet shares every version byte with regtest; only the bech32 HRP differs.
    pub fn testnet() -> Self {
        Self {
            bech32: "tb".to_owned(),
            ..Self::regtest()
        }
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::regtest()
    }
}
