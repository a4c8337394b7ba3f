//! Fixture loading.
//!
//! Fixture files mirror the POS document layout: an object keyed by
//! collection path whose values are objects keyed by document id. Files
//! ending in `.yaml` or `.yml` are read as YAML, anything else as JSON.
//!
//! ```yaml
//! users:
//!   ownerA: { storeName: Accra Central }
//! users/ownerA/stores/s1/inventory:
//!   d1: { name: iPhone 13, price: 4500, stock: 3 }
//! ```

use std::path::Path;

use serde_json::Value;
use tracing::info;

use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::db::{self, MemoryDocumentStore, PgDocumentStore};

/// Read and parse a fixture file.
async fn read_fixture(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    info!(path = %path.display(), "Loading fixture file");
    let content = tokio::fs::read_to_string(path).await?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let seed: Value = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(seed)
}

/// Build an in-memory store from a fixture file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not shaped as
/// collections of documents.
pub async fn memory_store(path: &Path) -> Result<MemoryDocumentStore, Box<dyn std::error::Error>> {
    let store = MemoryDocumentStore::from_seed(read_fixture(path).await?)?;
    Ok(store)
}

/// Upsert every fixture document into `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the file is invalid, the database URL is missing, or
/// a write fails.
pub async fn into_postgres(
    config: &StorefrontConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    // Validate the file before connecting to the database
    let documents = db::parse_seed(read_fixture(path).await?)?;
    info!(documents = documents.len(), "Parsed fixture");

    let pool = db::create_pool(config.require_database_url()?).await?;
    let store = PgDocumentStore::new(pool);

    for (collection, document) in documents {
        store.upsert(&collection, &document.id, document.data).await?;
    }

    info!("Seeding complete!");
    Ok(())
}
