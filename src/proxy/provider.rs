//! Listing providers
//!
//! A provider binds one source URL to one extraction strategy and owns
//! the sub-collection from its most recent extraction attempt. Failures
//! stay inside the provider: a dead or malformed source degrades to an
//! empty (or stale) sub-collection instead of failing the pipeline.

use crate::error::ConfigError;
use crate::proxy::extract::ProxyExtractor;
use crate::proxy::fetch::fetch_page;
use crate::proxy::query::ProxyQuery;
use crate::Result;
use reqwest::Client;
use tracing::{debug, warn};

pub struct Provider {
    url: String,
    extractor: Option<Box<dyn ProxyExtractor>>,
    query: ProxyQuery,
}

impl Provider {
    /// Create a provider with no extractor bound yet. Extraction will
    /// fail fast until one is set.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extractor: None,
            query: ProxyQuery::default(),
        }
    }

    /// Create a provider with its extraction strategy bound.
    pub fn with_extractor(url: impl Into<String>, extractor: impl ProxyExtractor + 'static) -> Self {
        let mut provider = Self::new(url);
        provider.set_extractor(extractor);
        provider
    }

    pub fn set_extractor(&mut self, extractor: impl ProxyExtractor + 'static) {
        self.extractor = Some(Box::new(extractor));
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the source and replace the stored sub-collection with
    /// whatever the extractor produces.
    ///
    /// Returns `Err` only for the missing-extractor configuration
    /// error. A failed fetch empties the sub-collection; a faulting
    /// extractor leaves the previous sub-collection in place. Both are
    /// reported through `tracing` and absorbed here.
    pub async fn extract(&mut self, client: &Client) -> Result<()> {
        let Some(extractor) = &self.extractor else {
            return Err(ConfigError::ExtractorNotSet(self.url.clone()).into());
        };

        let Some(content) = fetch_page(client, &self.url).await else {
            self.query = ProxyQuery::default();
            return Ok(());
        };

        match extractor.extract(&content) {
            Ok(proxies) => {
                debug!(url = %self.url, count = proxies.len(), "extracted proxies");
                self.query = ProxyQuery::new(proxies);
            }
            Err(err) => {
                warn!(url = %self.url, "failed to extract listing: {err:#}");
            }
        }
        Ok(())
    }

    /// The most recent sub-collection; empty if extraction never
    /// succeeded.
    pub fn result(&self) -> &ProxyQuery {
        &self.query
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("url", &self.url)
            .field("extractor", &self.extractor.is_some())
            .field("proxies", &self.query.len())
            .finish()
    }
}
