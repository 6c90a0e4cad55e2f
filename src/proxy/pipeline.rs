//! Pipeline coordinating concurrent extraction across providers
//!
//! One run builds one shared client, extracts every registered source
//! concurrently, waits for all of them, and merges the sub-collections
//! in registration order. Provider failures never abort a run; the
//! merged pool is simply smaller.

use crate::proxy::checker::{
    CheckerConfig, ProxyChecker, DEFAULT_CONCURRENCY, DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_TEST_URL,
};
use crate::proxy::extract::TableExtractor;
use crate::proxy::fetch::{build_client, DEFAULT_FETCH_TIMEOUT_SECS};
use crate::proxy::provider::Provider;
use crate::proxy::query::ProxyQuery;
use crate::Result;
use futures::future;
use std::time::Duration;
use tracing::info;

/// Bundled HTML-table listing of plain HTTP proxies.
pub const FREE_PROXY_LIST_URL: &str = "https://free-proxy-list.net/";

/// Bundled HTML-table listing of TLS-capable proxies.
pub const SSL_PROXY_LIST_URL: &str = "https://www.sslproxies.org/";

/// Configuration for a harvesting pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Run a bulk health check right after extraction
    pub verify: bool,
    /// URL probed through each candidate when verifying
    pub test_url: String,
    /// Bound on one probe
    pub probe_timeout: Duration,
    /// Number of concurrent probes
    pub probe_concurrency: usize,
    /// Bound on one listing fetch
    pub fetch_timeout: Duration,
    /// Register the bundled listing sources on construction
    pub use_default_sources: bool,
    /// Tunnel outbound listing fetches through this proxy
    pub outbound_proxy: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            verify: false,
            test_url: DEFAULT_TEST_URL.to_string(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            probe_concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            use_default_sources: true,
            outbound_proxy: None,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_test_url(mut self, url: impl Into<String>) -> Self {
        self.test_url = url.into();
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_probe_concurrency(mut self, concurrency: usize) -> Self {
        self.probe_concurrency = concurrency.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_default_sources(mut self, use_default_sources: bool) -> Self {
        self.use_default_sources = use_default_sources;
        self
    }

    pub fn with_outbound_proxy(mut self, url: impl Into<String>) -> Self {
        self.outbound_proxy = Some(url.into());
        self
    }
}

/// Harvesting pipeline over a set of registered providers.
///
/// Registration and [`run`](Self::run) both take `&mut self`, so
/// registering while a run is in flight is rejected at compile time.
#[derive(Debug)]
pub struct ProxyPipeline {
    config: PipelineConfig,
    providers: Vec<Provider>,
}

impl Default for ProxyPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyPipeline {
    /// Create a pipeline with default configuration and the bundled
    /// listing sources.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        let providers = if config.use_default_sources {
            Self::default_providers()
        } else {
            Vec::new()
        };
        Self { config, providers }
    }

    /// The bundled listing sources, all parsed with [`TableExtractor`].
    pub fn default_providers() -> Vec<Provider> {
        vec![
            Provider::with_extractor(FREE_PROXY_LIST_URL, TableExtractor),
            Provider::with_extractor(SSL_PROXY_LIST_URL, TableExtractor),
        ]
    }

    /// Register another source. Registration is append-only and must
    /// happen before [`run`](Self::run).
    pub fn add_provider(&mut self, provider: Provider) {
        self.providers.push(provider);
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Extract every registered source concurrently, merge the results
    /// in registration order, and optionally bulk-verify the merged
    /// pool before returning it.
    ///
    /// Endpoints listed by several sources are kept once per listing;
    /// the merge does not deduplicate.
    ///
    /// Returns `Err` only for configuration errors (a provider without
    /// an extractor). Source failures shrink the result instead.
    pub async fn run(&mut self) -> Result<ProxyQuery> {
        let client = build_client(
            self.config.fetch_timeout,
            self.config.outbound_proxy.as_deref(),
        )?;

        let results = future::join_all(
            self.providers
                .iter_mut()
                .map(|provider| provider.extract(&client)),
        )
        .await;
        for result in results {
            result?;
        }

        let mut query = ProxyQuery::default();
        for provider in &self.providers {
            query += provider.result().clone();
        }
        info!(
            total = query.len(),
            providers = self.providers.len(),
            "merged provider results"
        );

        if self.config.verify {
            let checker = ProxyChecker::with_config(
                CheckerConfig::new()
                    .with_test_url(self.config.test_url.clone())
                    .with_timeout(self.config.probe_timeout)
                    .with_concurrency(self.config.probe_concurrency),
            );
            query.check_health(&checker).await;
        }

        Ok(query)
    }
}
