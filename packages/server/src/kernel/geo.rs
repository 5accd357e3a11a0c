//! Geolocation collaborator: keyed IP -> country-code lookup.
//!
//! The real deployment reads a periodically refreshed binary database; the
//! service only depends on this lookup contract.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// Synchronous keyed lookup of an IP literal to an ISO-3166-1 alpha-2 code.
pub trait GeoLookup: Send + Sync {
    fn lookup(&self, ip: &str) -> Option<String>;
}

/// Table-backed lookup loaded from a JSON object `{ "ip": "CC", ... }`.
///
/// Stands in for the binary-database reader; refreshing the table swaps the
/// whole file on disk and restarts pick it up.
#[derive(Debug, Default, Clone)]
pub struct StaticGeoLookup {
    table: HashMap<String, String>,
}

impl StaticGeoLookup {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self { table }
    }

    /// Empty lookup: every query misses, every occurrence stays untouched.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read geo table {}", path.display()))?;
        let table: HashMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid geo table {}", path.display()))?;
        Ok(Self { table })
    }
}

impl GeoLookup for StaticGeoLookup {
    fn lookup(&self, ip: &str) -> Option<String> {
        self.table.get(ip).cloned()
    }
}
