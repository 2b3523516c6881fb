//! Persistence of canonical records
//!
//! The ingestion loop only talks to the [`VulnStore`] trait; [`PgStore`] is the
//! PostgreSQL implementation used in production.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;
use vulnmon_common::types::{AffectedProduct, VulnerabilityRecord};

use crate::error::StoreError;

pub use postgres::PgStore;

/// Result of writing one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Store-assigned identity, stable across re-ingestions
    pub id: Uuid,
    /// `true` when the record did not exist before this write
    pub inserted: bool,
    /// Affected-product rows now owned by the record
    pub affected_written: usize,
}

#[async_trait]
pub trait VulnStore: Send + Sync {
    /// Cheap connectivity check
    async fn ping(&self) -> Result<(), StoreError>;

    /// Insert or update `record` by its natural key and replace its affected
    /// products, as one atomic unit.
    async fn upsert(
        &self,
        record: &VulnerabilityRecord,
        affected: &[AffectedProduct],
    ) -> Result<UpsertOutcome, StoreError>;
}
