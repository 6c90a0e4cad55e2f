//! Health checking of candidate proxies
//!
//! A probe fetches a small test URL *through* the candidate proxy, so a
//! success proves the whole path works. Probe failures of any kind are
//! absorbed here; checking one proxy can never fail its caller.

use crate::proxy::models::Proxy;
use crate::Result;
use futures::stream::{self, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::{Client, Proxy as ProbeProxy};
use std::time::Duration;
use tracing::debug;

/// Default bound on one probe, in seconds.
pub(crate) const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Default number of concurrent probes
pub(crate) const DEFAULT_CONCURRENCY: usize = 10;

/// Default URL fetched through candidates
pub(crate) const DEFAULT_TEST_URL: &str = "http://httpbin.org/ip";

/// Configuration for proxy health checks
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// URL fetched through each candidate
    pub test_url: String,
    /// Bound on one probe
    pub timeout: Duration,
    /// Number of concurrent probes
    pub concurrency: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            test_url: DEFAULT_TEST_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_url(mut self, url: impl Into<String>) -> Self {
        self.test_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Probes candidate proxies and records the outcome on each record.
#[derive(Debug, Clone, Default)]
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    /// Create a checker with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Probe one proxy, marking it verified and recording whether it
    /// worked. Returns the outcome.
    pub async fn check(&self, proxy: &mut Proxy) -> bool {
        let working = self.send_probe(proxy).await;
        proxy.mark_checked(working);
        working
    }

    /// Probe every proxy concurrently with bounded fan-out, returning
    /// the collection in its original order once all probes finished.
    pub async fn check_all(&self, proxies: Vec<Proxy>) -> Vec<Proxy> {
        stream::iter(proxies)
            .map(|mut proxy| async move {
                self.check(&mut proxy).await;
                proxy
            })
            .buffered(self.config.concurrency)
            .collect()
            .await
    }

    async fn send_probe(&self, proxy: &Proxy) -> bool {
        let client = match self.probe_client(proxy) {
            Ok(client) => client,
            Err(err) => {
                debug!(proxy = %proxy, "cannot build probe client: {err}");
                return false;
            }
        };

        match client
            .get(&self.config.test_url)
            .header(ACCEPT, "*/*")
            .send()
            .await
        {
            Ok(response) => {
                let ok = response.status().is_success();
                if !ok {
                    debug!(proxy = %proxy, status = %response.status(), "probe returned non-success status");
                }
                ok
            }
            Err(err) => {
                debug!(proxy = %proxy, "probe failed: {err}");
                false
            }
        }
    }

    /// Client whose traffic egresses via the candidate itself.
    fn probe_client(&self, proxy: &Proxy) -> Result<Client> {
        let tunnel = ProbeProxy::all(proxy.url())?;
        Ok(Client::builder()
            .proxy(tunnel)
            .timeout(self.config.timeout)
            .build()?)
    }
}
