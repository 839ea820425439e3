//! Shared HTTP client construction
//!
//! One transport for every upstream call: bounded by a timeout, tagged
//! with the crate user agent, and wrapped in retry middleware for
//! transient failures.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::HttpConfig;

const USER_AGENT: &str = concat!("pogoda/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client
pub fn build_client(config: &HttpConfig) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .with_context(|| "Failed to create HTTP client")?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_with_defaults() {
        let client = build_client(&HttpConfig::default());
        assert!(client.is_ok());
    }
}
