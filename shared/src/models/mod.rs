//! Domain models

pub mod member;
pub mod remote;
