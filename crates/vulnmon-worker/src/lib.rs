//! VulnMon Worker Library
//!
//! Pulls CVE records from a vulnerability feed, normalizes them and keeps a
//! PostgreSQL store in sync.
//!
//! # Pipeline
//!
//! - **feed**: one HTTP GET per poll, returning raw entries in source order
//! - **normalize**: raw entry to canonical record plus affected products
//! - **store**: transactional upsert keyed on `(source, source_id)`
//! - **ingest**: the `WaitingForStore -> Polling -> Sleeping` loop
//!
//! # Example
//!
//! ```no_run
//! use vulnmon_worker::{config::WorkerConfig, FeedClient, Ingestor, PgStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = WorkerConfig::load()?;
//!     let store = PgStore::connect_lazy(&config.database)?;
//!     let feed = FeedClient::new(config.feed.clone())?;
//!
//!     let mut ingestor = Ingestor::new(feed, store, &config.feed.source, &config.schedule);
//!     ingestor.wait_for_store().await;
//!     let stats = ingestor.run_once().await;
//!     println!("stored {} records", stats.stored());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod normalize;
pub mod store;

pub use error::{ConfigError, EntryError, FetchError, NormalizationError, StoreError};
pub use feed::{FeedClient, FeedSource, RawEntry};
pub use ingest::{IngestState, IngestStats, Ingestor};
pub use normalize::{normalize, Normalized};
pub use store::{PgStore, UpsertOutcome, VulnStore};
