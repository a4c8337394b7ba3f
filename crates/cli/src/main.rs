//! Bazaar CLI - Storefront operations over the POS document store.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! bazaar migrate
//!
//! # Load POS fixture documents into PostgreSQL
//! bazaar seed fixtures/demo.yaml
//!
//! # Browse the aggregated catalog
//! bazaar catalog --category devices --search iphone
//!
//! # Work against an in-memory store instead of PostgreSQL
//! bazaar --seed fixtures/demo.yaml catalog --featured
//!
//! # Manage the cart and check out
//! bazaar cart add "ownerA|s1|d1" --quantity 2
//! bazaar checkout --customer cust-1 --full-name "Ama Mensah" \
//!     --address "12 Oxford St" --city Accra --country Ghana --cash
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Load a fixture file into `PostgreSQL`
//! - `catalog` / `product` - Browse the aggregated catalog
//! - `cart` - Add, remove, and adjust cart lines
//! - `checkout` - Place orders for the cart
//! - `orders` - List or view a customer's orders

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_core::CategoryFilter;
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::db::{DocumentStore, PgDocumentStore, create_pool};
use bazaar_storefront::state::AppState;

#[allow(clippy::print_stdout)] // command output goes to stdout
mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar storefront tools")]
struct Cli {
    /// Use an in-memory store seeded from a JSON or YAML file
    #[arg(long, global = true, value_name = "FILE")]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Load a JSON or YAML fixture file into `PostgreSQL`
    Seed {
        /// Fixture file keyed by collection path, then document id
        file: PathBuf,
    },
    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that run against a document store.
#[derive(Subcommand)]
enum StoreCommand {
    /// List the aggregated catalog
    Catalog(CatalogArgs),
    /// Show one product with its store names
    Product {
        /// Product id, bare or `owner|store|doc`
        id: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place orders for everything in the cart
    Checkout(CheckoutArgs),
    /// List a customer's orders, or show one
    Orders {
        /// Customer id
        #[arg(short, long)]
        customer: String,
        /// Order ref id to show
        ref_id: Option<String>,
    },
}

#[derive(Args)]
struct CatalogArgs {
    /// Category tab (all, devices, accessories, screens, others)
    #[arg(short, long, default_value = "all")]
    category: CategoryFilter,
    /// Case-insensitive name or description search
    #[arg(short, long)]
    search: Option<String>,
    /// Show the featured selection only
    #[arg(long)]
    featured: bool,
    /// Include sold-out listings
    #[arg(long)]
    include_sold_out: bool,
    /// Re-read inventory instead of using the cached snapshot
    #[arg(long)]
    refresh: bool,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product
    Add {
        /// Product id, bare or `owner|store|doc`
        id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product
    Remove { id: String },
    /// Set a line's quantity (0 removes it)
    Set { id: String, quantity: u32 },
    /// Empty the cart
    Clear,
    /// Show the cart
    Show,
}

#[derive(Args)]
struct CheckoutArgs {
    /// Customer id
    #[arg(long)]
    customer: String,
    /// Customer email
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    full_name: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    country: String,
    /// Pay in cash at the store
    #[arg(long, conflicts_with = "reference")]
    cash: bool,
    /// Mobile money transaction reference
    #[arg(long, required_unless_present = "cash")]
    reference: Option<String>,
    /// Mobile money sender name
    #[arg(long, requires = "reference")]
    sender: Option<String>,
    /// Amount sent by mobile money
    #[arg(long, requires = "reference")]
    amount: Option<String>,
    /// Accept paying the balance before delivery
    #[arg(long)]
    acknowledge_partial: bool,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Keep log lines as breadcrumbs; events come from `StorefrontError::report`.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN | tracing::Level::INFO => {
            sentry_tracing::EventFilter::Breadcrumb
        }
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Configuration error: {e}");
            }
            std::process::exit(2);
        }
    };

    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_storefront=info,bazaar_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront(&config).await?,
        Commands::Seed { file } => commands::seed::into_postgres(&config, &file).await?,
        Commands::Store(command) => {
            if let Some(path) = &cli.seed {
                let db = commands::seed::memory_store(path).await?;
                dispatch(&AppState::new(config, db), command).await?;
            } else {
                let pool = create_pool(config.require_database_url()?).await?;
                dispatch(&AppState::new(config, PgDocumentStore::new(pool)), command).await?;
            }
        }
    }
    Ok(())
}

async fn dispatch<S: DocumentStore + 'static>(
    state: &AppState<S>,
    command: StoreCommand,
) -> Result<(), CommandError> {
    let result = match command {
        StoreCommand::Catalog(args) => commands::catalog::list(state, &args).await,
        StoreCommand::Product { id, json } => commands::catalog::show(state, &id, json).await,
        StoreCommand::Cart { action } => commands::cart::run(state, action).await,
        StoreCommand::Checkout(args) => commands::checkout::run(state, args).await,
        StoreCommand::Orders { customer, ref_id } => {
            commands::orders::run(state, &customer, ref_id.as_deref()).await
        }
    };
    result.inspect_err(|e| {
        if let CommandError::Storefront(err) = e {
            err.report();
        }
    })
}
