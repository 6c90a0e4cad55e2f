//! Proxy Scout - Proxy Harvester and Checker
//!
//! Harvests candidate proxies from listing sites concurrently, checks
//! their health by routing probes through them, and exposes the pool
//! through a composable query interface.
//!
//! ```no_run
//! use proxy_scout::{PipelineConfig, ProxyFilter, ProxyPipeline};
//!
//! # async fn example() -> proxy_scout::Result<()> {
//! let mut pipeline = ProxyPipeline::with_config(PipelineConfig::new().with_verify(true));
//! let pool = pipeline.run().await?;
//!
//! let fast = pool
//!     .filter(&ProxyFilter::new().working(true).https(true))
//!     .order_by("country_code")?;
//! let pick = fast.random(&mut rand::thread_rng());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod proxy;

pub use error::ConfigError;
pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
