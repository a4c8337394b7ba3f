//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! bazaar migrate
//! ```
//!
//! # Environment Variables
//!
//! - `BAZAAR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Storefront migrations: `crates/storefront/migrations/`

use tracing::info;

use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::db;

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn storefront(config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Connecting to storefront database...");
    let pool = db::create_pool(config.require_database_url()?).await?;

    info!("Running storefront migrations...");
    db::run_migrations(&pool).await?;

    info!("Storefront migrations complete!");
    Ok(())
}
