//! Client configuration and its resolution order.
//!
//! Every field resolves the same way: an explicit [`ClientOptions`] value
//! wins, then the process environment, then the built-in default. Nothing
//! here validates the URL or key; a bad value shows up on the first request.

use crate::network::NetworkParams;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/1";
pub const DEFAULT_API_PASS: &str = "satoshi";

pub const ENV_API_URL: &str = "APIURL";
pub const ENV_API_PASS: &str = "APIPASS";
pub const ENV_LOG_REQUESTS: &str = "LOG_REQUESTS";

/// Optional construction overrides.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub api_url: Option<String>,
    pub api_pass: Option<String>,
    pub network: Option<NetworkParams>,
    pub log_requests: Option<bool>,
}

/// Fully resolved, immutable client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_pass: String,
    pub network: NetworkParams,
    pub log_requests: bool,
}

impl ClientConfig {
    /// Resolve against the real process environment.
    pub fn from_env(options: ClientOptions) -> Self {
        Self::resolve(options, |key| std::env::var(key).ok())
    }

    /// Resolve against an arbitrary environment lookup. Empty values count as unset.
    pub fn resolve<F>(options: ClientOptions, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|value| !value.is_empty());

        let api_url = options
            .api_url
            .filter(|url| !url.is_empty())
            .or_else(|| env(ENV_API_URL))
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let api_pass = options
            .api_pass
            .filter(|pass| !pass.is_empty())
            .or_else(|| env(ENV_API_PASS))
            .unwrap_or_else(|| DEFAULT_API_PASS.to_owned());
        let log_requests = options
            .log_requests
            .or_else(|| env(ENV_LOG_REQUESTS).map(|value| is_truthy(&value)))
            .unwrap_or(false);

        Self {
            api_url: api_url.trim_end_matches('/').to_owned(),
            api_pass,
            network: options.network.unwrap_or_default(),
            log_requests,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::resolve(ClientOptions::default(), |_| None)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
