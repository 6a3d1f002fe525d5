//! Shared domain types for the Chromosoft member migration
//!
//! This crate holds everything both the importer binary and the directory
//! client need to agree on:
//!
//! - **Field parsers** (`parse`): pure, locale-aware cell parsers
//! - **Member model** (`models::member`): the normalized legacy member record
//! - **Remote entities** (`models::remote`): directory users/breeders and the
//!   typed mutation payloads projected from a member record
//!
//! No I/O happens in this crate.

pub mod models;
pub mod parse;

// Re-export public types
pub use models::member::{NormalizedMember, RawRow, Region, Sex};
pub use models::remote::{
    BreederPayload, RemoteBreeder, RemoteUser, UserPayload, changed_fields, opt_str_eq,
};
