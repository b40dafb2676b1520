//! Factory configuration
//!
//! Loaded from JSON or from `CLUSTORE_*` environment variables. Every
//! field has a default, so an empty document is a valid configuration.

use crate::error::{Result, StoreError};
use serde::Deserialize;
use std::time::Duration;

/// Prefix shared by the store registry and every store's map and id generator
pub const STORE_PREFIX: &str = "org.apache.servicemix.stores";

/// Configuration for a [`StoreFactory`](crate::StoreFactory)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Naming prefix for the registry, store maps and id generators
    pub prefix: String,

    /// Default retention window in milliseconds (`<= 0` disables eviction)
    pub timeout_ms: i64,

    /// Shard count for a local cluster (None = one per CPU core)
    pub shards: Option<usize>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        FactoryConfig {
            prefix: STORE_PREFIX.to_string(),
            timeout_ms: -1,
            shards: None,
        }
    }
}

impl FactoryConfig {
    /// Parse a configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FactoryConfig =
            serde_json::from_str(json).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read the configuration from the process environment
    ///
    /// Recognized variables: `CLUSTORE_PREFIX`, `CLUSTORE_TIMEOUT_MS`,
    /// `CLUSTORE_SHARDS`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = FactoryConfig::default();

        if let Some(prefix) = lookup("CLUSTORE_PREFIX") {
            config.prefix = prefix;
        }
        if let Some(raw) = lookup("CLUSTORE_TIMEOUT_MS") {
            config.timeout_ms = raw
                .trim()
                .parse()
                .map_err(|_| StoreError::Config(format!("CLUSTORE_TIMEOUT_MS: '{}'", raw)))?;
        }
        if let Some(raw) = lookup("CLUSTORE_SHARDS") {
            let shards = raw
                .trim()
                .parse()
                .map_err(|_| StoreError::Config(format!("CLUSTORE_SHARDS: '{}'", raw)))?;
            config.shards = Some(shards);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the default timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_ms = timeout
            .map(|t| i64::try_from(ttl_to_millis(t)).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        self
    }

    /// Set the naming prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The default timeout as a duration
    pub fn timeout(&self) -> Option<Duration> {
        ttl_from_millis(self.timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(StoreError::Config("prefix must not be empty".into()));
        }
        if self.shards == Some(0) {
            return Err(StoreError::Config("shards must be > 0".into()));
        }
        Ok(())
    }
}

/// Convert a millisecond timeout into a TTL
///
/// Zero and negative values (conventionally `-1`) disable eviction.
pub fn ttl_from_millis(millis: i64) -> Option<Duration> {
    if millis > 0 {
        Some(Duration::from_millis(millis as u64))
    } else {
        None
    }
}

/// Convert a TTL into whole milliseconds
///
/// Sub-millisecond values round up to 1 so a set timeout never reads back
/// as "no timeout". Saturates at `u64::MAX`.
pub fn ttl_to_millis(ttl: Duration) -> u64 {
    if ttl.is_zero() {
        return 0;
    }
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = FactoryConfig::default();
        assert_eq!(config.prefix, STORE_PREFIX);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.shards, None);
    }

    #[test]
    fn test_from_json_partial() {
        let config = FactoryConfig::from_json(r#"{ "timeout_ms": 1500 }"#).unwrap();
        assert_eq!(config.prefix, STORE_PREFIX);
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_from_json_rejects_empty_prefix() {
        let err = FactoryConfig::from_json(r#"{ "prefix": "" }"#).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("CLUSTORE_PREFIX", "acme.stores"),
            ("CLUSTORE_TIMEOUT_MS", " 250 "),
            ("CLUSTORE_SHARDS", "4"),
        ]
        .into_iter()
        .collect();

        let config = FactoryConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.prefix, "acme.stores");
        assert_eq!(config.timeout_ms, 250);
        assert_eq!(config.shards, Some(4));
    }

    #[test]
    fn test_from_lookup_bad_timeout() {
        let err = FactoryConfig::from_lookup(|k| {
            (k == "CLUSTORE_TIMEOUT_MS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("CLUSTORE_TIMEOUT_MS"));
    }

    #[test]
    fn test_ttl_from_millis() {
        assert_eq!(ttl_from_millis(-1), None);
        assert_eq!(ttl_from_millis(0), None);
        assert_eq!(ttl_from_millis(10), Some(Duration::from_millis(10)));
    }

    #[test]
    fn test_ttl_to_millis_rounds_up() {
        assert_eq!(ttl_to_millis(Duration::ZERO), 0);
        assert_eq!(ttl_to_millis(Duration::from_micros(500)), 1);
        assert_eq!(ttl_to_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(ttl_to_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_with_timeout_keeps_sub_millisecond() {
        let config = FactoryConfig::default().with_timeout(Some(Duration::from_micros(500)));
        assert_eq!(config.timeout(), Some(Duration::from_millis(1)));

        let config = FactoryConfig::default().with_timeout(Some(Duration::MAX));
        assert_eq!(config.timeout_ms, i64::MAX);
    }

    #[test]
    fn test_with_timeout_roundtrip() {
        let config = FactoryConfig::default().with_timeout(Some(Duration::from_secs(2)));
        assert_eq!(config.timeout_ms, 2000);
        assert_eq!(config.with_timeout(None).timeout_ms, -1);
    }
}
