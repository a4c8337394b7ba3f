//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Store topology (one shape is used, first match wins)
//! - `POS_STORES` - `owner:store,owner:store` pairs
//! - `POS_OWNER_UID` + `POS_STORE_IDS` - one owner, comma-separated stores
//! - `POS_OWNER_UID` + `POS_STORE_ID` - one owner, one store
//!
//! ## Optional
//! - `BAZAAR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `BAZAAR_CURRENCY` - Display and order currency (default: GHS)
//! - `BAZAAR_STOCK_FILTER` - `source` or `caller` (default: caller)
//! - `BAZAAR_CATALOG_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `BAZAAR_CART_PATH` - Cart file (default: .bazaar-cart.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! An empty topology loads fine; the catalog reports it when first used.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use tracing::warn;

use bazaar_core::{CurrencyCode, StoreRef};

use crate::catalog::StockFilter;

const DEFAULT_CATALOG_TTL_SECS: u64 = 300;
const DEFAULT_CART_PATH: &str = ".bazaar-cart.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// POS stores to aggregate, in configuration order
    pub stores: Vec<StoreRef>,
    /// Currency recorded on orders
    pub currency: CurrencyCode,
    /// Where the in-stock rule is applied
    pub stock_filter: StockFilter,
    /// How long an aggregated catalog is served from cache
    pub catalog_ttl: Duration,
    /// File the session cart persists to
    pub cart_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("stores", &self.stores)
            .field("currency", &self.currency)
            .field("stock_filter", &self.stock_filter)
            .field("catalog_ttl", &self.catalog_ttl)
            .field("cart_path", &self.cart_path)
            .field("sentry_dsn", &self.sentry_dsn)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an optional variable is set to an invalid
    /// value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Source(&lookup);

        let currency = env
            .or_default("BAZAAR_CURRENCY", CurrencyCode::GHS.code())
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_CURRENCY".to_string(), e))?;
        let stock_filter = env
            .or_default("BAZAAR_STOCK_FILTER", "caller")
            .parse::<StockFilter>()
            .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_STOCK_FILTER".to_string(), e))?;
        let catalog_ttl = env
            .or_default("BAZAAR_CATALOG_TTL_SECS", &DEFAULT_CATALOG_TTL_SECS.to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BAZAAR_CATALOG_TTL_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            database_url: env.database_url("BAZAAR_DATABASE_URL"),
            stores: parse_topology(&env),
            currency,
            stock_filter,
            catalog_ttl,
            cart_path: PathBuf::from(env.or_default("BAZAAR_CART_PATH", DEFAULT_CART_PATH)),
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }

    /// The database URL, for commands that need `PostgreSQL`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` when no URL is configured.
    pub fn require_database_url(&self) -> Result<&SecretString, ConfigError> {
        self.database_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("BAZAAR_DATABASE_URL".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Source<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Source<'_, F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Option<SecretString> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
    }
}

fn parse_store(owner: &str, store: &str, source: &str) -> Option<StoreRef> {
    match StoreRef::parse(owner, store) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(variable = source, error = %e, "Skipping malformed store entry");
            None
        }
    }
}

/// Resolve the store topology from the first shape that is present.
///
/// `POS_STORES` takes precedence whenever it is set, even if every pair in
/// it is malformed.
fn parse_topology<F: Fn(&str) -> Option<String>>(env: &Source<'_, F>) -> Vec<StoreRef> {
    let mut stores: Vec<StoreRef> = Vec::new();
    let mut push = |store: StoreRef| {
        if !stores.contains(&store) {
            stores.push(store);
        }
    };

    if let Some(pairs) = env.optional("POS_STORES") {
        for pair in pairs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((owner, store)) = pair.split_once(':') else {
                warn!(variable = "POS_STORES", pair, "Skipping store entry without ':'");
                continue;
            };
            if let Some(store) = parse_store(owner, store, "POS_STORES") {
                push(store);
            }
        }
        return stores;
    }

    let Some(owner) = env.optional("POS_OWNER_UID") else {
        return stores;
    };
    if let Some(ids) = env.optional("POS_STORE_IDS") {
        for id in ids.split(',').map(str::trim).filter(|id| !id.is_empty()) {
            if let Some(store) = parse_store(&owner, id, "POS_STORE_IDS") {
                push(store);
            }
        }
    } else if let Some(id) = env.optional("POS_STORE_ID")
        && let Some(store) = parse_store(&owner, &id, "POS_STORE_ID")
    {
        push(store);
    }
    stores
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_source(|key| map.get(key).cloned())
    }

    fn store(owner: &str, id: &str) -> StoreRef {
        StoreRef::parse(owner, id).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert!(config.stores.is_empty());
        assert!(config.database_url.is_none());
        assert_eq!(config.currency, CurrencyCode::GHS);
        assert_eq!(config.stock_filter, StockFilter::Deferred);
        assert_eq!(config.catalog_ttl, Duration::from_secs(300));
        assert_eq!(config.cart_path, PathBuf::from(".bazaar-cart.json"));
        assert!(config.require_database_url().is_err());
    }

    #[test]
    fn test_pos_stores_pairs() {
        let config = load(&[("POS_STORES", "ownerA:s1, ownerB:s2,ownerA:s1")]).unwrap();
        assert_eq!(config.stores, vec![store("ownerA", "s1"), store("ownerB", "s2")]);
    }

    #[test]
    fn test_malformed_pairs_are_skipped() {
        let config = load(&[("POS_STORES", "ownerA:s1,broken,:s2,o|x:s3,ownerB:s4")]).unwrap();
        assert_eq!(config.stores, vec![store("ownerA", "s1"), store("ownerB", "s4")]);
    }

    #[test]
    fn test_pos_stores_wins_even_when_empty_after_parsing() {
        let config = load(&[
            ("POS_STORES", "broken"),
            ("POS_OWNER_UID", "ownerA"),
            ("POS_STORE_ID", "s1"),
        ])
        .unwrap();
        assert!(config.stores.is_empty());
    }

    #[test]
    fn test_owner_with_store_ids() {
        let config = load(&[
            ("POS_OWNER_UID", "ownerA"),
            ("POS_STORE_IDS", "s1,s2"),
            ("POS_STORE_ID", "ignored"),
        ])
        .unwrap();
        assert_eq!(config.stores, vec![store("ownerA", "s1"), store("ownerA", "s2")]);
    }

    #[test]
    fn test_owner_with_single_store() {
        let config = load(&[("POS_OWNER_UID", "ownerA"), ("POS_STORE_ID", "s1")]).unwrap();
        assert_eq!(config.stores, vec![store("ownerA", "s1")]);

        let config = load(&[("POS_STORE_ID", "s1")]).unwrap();
        assert!(config.stores.is_empty());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("BAZAAR_CATALOG_TTL_SECS", "soon")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "BAZAAR_CATALOG_TTL_SECS"
        ));
        assert!(matches!(
            load(&[("BAZAAR_STOCK_FILTER", "nowhere")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "BAZAAR_STOCK_FILTER"
        ));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/fallback")]).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://localhost/fallback"
        );
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("BAZAAR_DATABASE_URL", "postgres://user:hunter2@db/bazaar")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }
}
