use std::sync::OnceLock;

use rand::RngCore;

/// One random address for the whole process, shared by every client.
///
/// The first caller to reach [`shared_random_address`] decides the value;
/// later callers, whatever their network, observe the same string.
static RANDOM_ADDRESS: OnceLock<String> = OnceLock::new();

/// Base58check-encode `version || 20 random bytes`.
///
/// Structurally a P2PKH address nobody holds a key for.
pub(crate) fn random_address(version: u8) -> String {
    let mut payload = [0u8; 21];
    payload[0] = version;
    rand::thread_rng().fill_bytes(&mut payload[1..]);
    bitcoin::base58::encode_check(&payload)
}

pub(crate) fn shared_random_address(version: u8) -> &'static str {
    RANDOM_ADDRESS.get_or_init(|| random_address(version))
}
