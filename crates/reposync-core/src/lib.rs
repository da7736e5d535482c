//! Repository inventory synchronization
//!
//! Keeps the set of git checkouts on several machines in step through one
//! shared manifest file. A sync run walks through these stages:
//!
//! ```text
//! load manifest -> scan local root -> reconcile -> clone missing -> persist
//! ```
//!
//! - [`scanner`] discovers checkouts breadth-first and reads their metadata
//! - [`reconcile`] merges scanned records with manifest records
//! - [`clone`] materializes manifest-only checkouts behind safety gates
//! - [`filter`] decides which machines a record applies to
//! - [`engine`] sequences the stages and decides whether to persist
//! - [`manifest`] reads and writes the manifest in several formats

pub mod clone;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod manifest;
pub mod reconcile;
pub mod record;
pub mod scanner;

pub use clone::{CloneOrchestrator, ExistingPolicy};
pub use config::Settings;
pub use engine::{SyncEngine, SyncOptions, SyncReport, SyncState};
pub use error::{Error, Result};
pub use manifest::ManifestFormat;
pub use reconcile::{Reconciliation, reconcile};
pub use record::{CloneOutcome, CloneRequest, CloneStatus, RepositoryRecord, SkipReason};
pub use scanner::RepositoryScanner;
