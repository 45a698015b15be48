mod cli;

use bitcoin::Amount;
use clap::Parser;
use eyre::{eyre, WrapErr};
use serde_json::json;

use regtest_client::{ClientOptions, RegtestClient, Unspent};

use cli::Command;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let client = RegtestClient::new(ClientOptions {
        api_url: args.api_url,
        api_pass: args.api_pass,
        network: None,
        // `false` means "not passed" here, so the environment still gets a say.
        log_requests: args.log_requests.then_some(true),
    });
    tracing::debug!(?client, "client configured");

    let output = run(&client, args.command).await.map_err(|err| {
        let message = format_request_error(client.api_url(), &err.to_string());
        eyre!(message).wrap_err("regtest API request failed")
    })?;

    println!(
        "{}",
        serde_json::to_string_pretty(&output).wrap_err("encode output")?
    );
    Ok(())
}

async fn run(
    client: &RegtestClient,
    command: Command,
) -> Result<serde_json::Value, regtest_client::ClientError> {
    let value = match command {
        Command::Height => json!(client.height().await?),
        Command::Mine { count } => json!(client.mine(count).await?),
        Command::Broadcast { tx_hex } => json!(client.broadcast(&tx_hex).await?),
        Command::Fetch { txid } => json!(client.fetch(&txid).await?),
        Command::Unspents { address } => json!(client.unspents(&address).await?),
        Command::Faucet { address, sats } => {
            json!(client.faucet(&address, Amount::from_sat(sats)).await?)
        }
        Command::FaucetScript { script, sats } => {
            json!(client.faucet_complex(&script, Amount::from_sat(sats)).await?)
        }
        Command::Verify {
            txid,
            vout,
            address,
            value,
        } => {
            let txo = Unspent {
                value: Amount::from_sat(value),
                tx_id: txid,
                vout,
                address,
                height: None,
            };
            client.verify(&txo).await?;
            json!({ "verified": true, "txId": txid, "vout": vout })
        }
        Command::RandomAddress => json!(client.random_address()),
    };
    Ok(value)
}

fn format_request_error(api_url: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("request to `{api_url}` failed"),
        format!("error: {source_error}"),
    ];

    if source_error.contains("dns error") || source_error.contains("Could not resolve host") {
        lines.push(
            "hint: hostname resolution failed; verify the API URL hostname and your network".into(),
        );
    } else if source_error.contains("error sending request for url") {
        lines.push(
            "hint: the node could not be reached; verify --api-url / APIURL and that it is running"
                .into(),
        );
    } else if source_error.starts_with("Unauthorized") || source_error.starts_with("Forbidden") {
        lines.push("hint: the node rejected the API key; verify --api-pass / APIPASS".into());
    } else if source_error.starts_with("Not Found") {
        lines.push(
            "hint: unknown path or id; the API URL usually ends in the API version, e.g. `/1`"
                .into(),
        );
    } else if source_error == "Missing Inputs" {
        lines.push(
            "hint: the faucet payout never showed up confirmed; check the node's indexer".into(),
        );
    }

    lines.join("\n")
}
