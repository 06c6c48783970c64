//! Configuration model loaded from external sources.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::metadata::ResourceOverrides;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// Path prefix of the resource endpoints.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Permission name to the resource tables it is granted on (`*` for all).
    #[serde(default)]
    pub permissions: HashMap<String, Vec<String>>,
    /// Search and sort whitelist overrides keyed by resource table.
    #[serde(default)]
    pub resources: HashMap<String, ResourceOverrides>,
}

fn default_api_prefix() -> String {
    "/api".to_string()
}
