//! Proxy harvesting and querying
//!
//! This module provides functionality for:
//! - Fetching proxy listings from multiple sources concurrently
//! - Parsing listings through pluggable extraction strategies
//! - Health-checking candidates by routing probes through them
//! - Filtering, ordering, and drawing from the harvested pool

pub mod checker;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod query;

pub use checker::{CheckerConfig, ProxyChecker};
pub use extract::{from_fn, FnExtractor, ProxyExtractor, TableExtractor, TextListExtractor};
pub use models::{Proxy, ProxyBuilder, ProxyKind};
pub use pipeline::{PipelineConfig, ProxyPipeline, FREE_PROXY_LIST_URL, SSL_PROXY_LIST_URL};
pub use provider::Provider;
pub use query::{FieldMatch, ProxyField, ProxyFilter, ProxyQuery};
