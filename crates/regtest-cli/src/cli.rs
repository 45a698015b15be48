use bitcoin::{ScriptBuf, Txid};
use clap::{Parser, Subcommand};

/// regtest — drive a regtest node's HTTP control API from the shell.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Base URL of the node's control API.
    #[arg(long, env = "APIURL")]
    pub api_url: Option<String>,

    /// API key sent with mining and faucet requests.
    #[arg(long, env = "APIPASS")]
    pub api_pass: Option<String>,

    /// Log every request (and failed responses) at info level.
    /// `LOG_REQUESTS` in the environment has the same effect.
    #[arg(long)]
    pub log_requests: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the best block height.
    Height,

    /// Mine blocks and print their ids.
    Mine {
        /// Number of blocks to mine.
        count: u64,
    },

    /// Broadcast a raw transaction given as hex.
    Broadcast { tx_hex: String },

    /// Print a transaction's JSON.
    Fetch { txid: Txid },

    /// List unspent outputs of an address.
    Unspents { address: String },

    /// Fund an address and print the confirmed unspent.
    Faucet {
        address: String,
        /// Amount in satoshis.
        sats: u64,
    },

    /// Fund a raw output script (hex) and print the confirmed unspent.
    FaucetScript {
        #[arg(value_parser = parse_script_hex)]
        script: ScriptBuf,
        /// Amount in satoshis.
        sats: u64,
    },

    /// Check that an output pays the expected address and amount.
    Verify {
        txid: Txid,
        vout: u32,
        #[arg(long)]
        address: Option<String>,
        /// Expected amount in satoshis. Zero is not checked.
        #[arg(long, default_value = "0")]
        value: u64,
    },

    /// Print a fresh random address for the configured network.
    RandomAddress,
}

fn parse_script_hex(hex: &str) -> Result<ScriptBuf, String> {
    ScriptBuf::from_hex(hex).map_err(|e| format!("invalid script hex: {e}"))
}
