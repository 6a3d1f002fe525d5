//! Client for the remote member directory (GraphQL over HTTP)
//!
//! Fetches the complete user and breeder population page by page and exposes
//! the create/update primitives the importer needs. Transport failures are
//! retried with exponential backoff; structured application errors in the
//! response body are deterministic and never retried.

pub mod client;
pub mod error;
pub mod queries;

pub use client::{Directory, DirectoryClient, PAGE_SIZE};
pub use error::{DirectoryError, DirectoryResult};
