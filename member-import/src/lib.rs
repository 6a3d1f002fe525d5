//! Member Import - batch reconciliation of legacy member records
//!
//! # Pipeline
//!
//! ```text
//! CSV rows -> ingest -> sanitize -> conflict resolution -> validation
//!                                                             |
//!   directory snapshot (users + breeders, fetched once)  -----+
//!                                                             v
//!                              identity matching & sequential upsert
//! ```
//!
//! Records are processed strictly one at a time: conflict side effects are
//! mirrored into the in-memory snapshot so later records in the same batch
//! see them.

pub mod config;
pub mod conflict;
pub mod import;
pub mod ingest;
pub mod logger;
pub mod sanitize;
pub mod snapshot;
pub mod validate;

pub use config::Config;
pub use import::{ImportSummary, Importer};
pub use snapshot::DirectorySnapshot;
