//! Shared HTTP fetch layer for listing sources
//!
//! One client is built per pipeline run and shared read-only by every
//! provider. Fetch failures never propagate as errors; a source that
//! cannot be fetched simply produces no content.

use crate::Result;
use reqwest::{Client, Proxy as OutboundProxy};
use std::time::Duration;
use tracing::debug;

/// User agent presented to listing sites.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0";

/// Default bound on one listing fetch, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Connection-level errors are retried this many times in total.
/// Non-success statuses are never retried.
const FETCH_ATTEMPTS: usize = 3;

/// Build the client shared by all fetches of one pipeline run,
/// optionally tunneling through an outbound proxy.
pub fn build_client(timeout: Duration, outbound_proxy: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT).timeout(timeout);
    if let Some(url) = outbound_proxy {
        builder = builder.proxy(OutboundProxy::all(url)?);
    }
    Ok(builder.build()?)
}

/// Fetch one listing page, returning `None` on any failure.
pub async fn fetch_page(client: &Client, url: &str) -> Option<String> {
    for attempt in 1..=FETCH_ATTEMPTS {
        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                return response.text().await.ok();
            }
            Ok(response) => {
                debug!(url, status = %response.status(), "listing fetch returned non-success status");
                return None;
            }
            Err(err) if err.is_connect() && attempt < FETCH_ATTEMPTS => {
                debug!(url, attempt, "connect error, retrying: {err}");
            }
            Err(err) => {
                debug!(url, "listing fetch failed: {err}");
                return None;
            }
        }
    }
    None
}
