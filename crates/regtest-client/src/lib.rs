pub mod client;
pub mod config;
pub mod error;
pub mod faucet;
pub mod network;
pub mod transport;
pub mod types;

mod address;
mod parsing;

pub use client::RegtestClient;
pub use config::{ClientConfig, ClientOptions};
pub use error::ClientError;
pub use faucet::{FaucetPolicy, FaucetTarget};
pub use network::NetworkParams;
pub use types::{Transaction, TxInput, TxOutput, Unspent};
