//! VulnMon Common Library
//!
//! Shared types, logging and error handling for the VulnMon workspace.
//!
//! # Overview
//!
//! - **Types**: canonical vulnerability records and affected products, as
//!   written by the ingestion worker and read by the query layer
//! - **Logging**: `tracing` subscriber set-up shared by every binary
//! - **Errors**: the common error type and result alias
//!
//! # Example
//!
//! ```rust
//! use vulnmon_common::types::{AffectedProduct, VulnerabilityRecord, NVD_SOURCE};
//!
//! let mut record = VulnerabilityRecord::new(NVD_SOURCE, "CVE-2024-0001");
//! record.summary = "Heap overflow in parser".to_string();
//! let affected = vec![AffectedProduct::new("acme", "widget", "")];
//! assert_eq!(affected.len(), 1);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;
pub mod types;

pub use error::{Result, VulnmonError};
