//! Importer configuration
//!
//! # Environment variables
//!
//! | Variable | Required | Description |
//! |----------|----------|-------------|
//! | DIRECTORY_ENDPOINT | yes | GraphQL endpoint of the member directory |
//! | DIRECTORY_TOKEN | yes | Bearer token for the directory API |
//! | DIRECTORY_REGISTER_PASSWORD | no | Initial password for registered accounts |

use anyhow::{Context, Result};

/// Default initial password, as used by the legacy import scripts
const DEFAULT_REGISTER_PASSWORD: &str = "Startstart123!";

#[derive(Debug, Clone)]
pub struct Config {
    /// GraphQL endpoint URL
    pub endpoint: String,
    /// Bearer token credential
    pub token: String,
    /// Password assigned to newly registered accounts
    pub register_password: String,
}

impl Config {
    /// Load the configuration from the environment
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint: std::env::var("DIRECTORY_ENDPOINT")
                .context("DIRECTORY_ENDPOINT must be set")?,
            token: std::env::var("DIRECTORY_TOKEN").context("DIRECTORY_TOKEN must be set")?,
            register_password: std::env::var("DIRECTORY_REGISTER_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_REGISTER_PASSWORD.into()),
        })
    }
}
