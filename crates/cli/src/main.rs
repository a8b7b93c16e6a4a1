//! Shopsync CLI - diagnostics against the storefront services.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shopsync products list
//! shopsync products search "teapot"
//! shopsync products get 42
//!
//! # Inspect and mutate a user's cart
//! shopsync cart show -u 7
//! shopsync cart add -u 7 -p 42 -q 2
//! shopsync cart remove -u 7 -p 42
//! shopsync cart clear -u 7
//!
//! # Orders
//! shopsync orders list -u 7
//! shopsync orders place -u 7
//! ```
//!
//! Session-scoped commands read the bearer token from
//! `SHOPSYNC_SESSION_TOKEN`; service endpoints come from the `SHOPSYNC_*`
//! variables documented in `shopsync-client`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "shopsync")]
#[command(author, version, about = "Shopsync storefront diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Inspect and mutate a user's cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect and place orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List the full catalog
    List,
    /// Search the catalog
    Search {
        /// Search query
        query: String,
    },
    /// Show one product
    Get {
        /// Product identifier
        id: i64,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart with line totals and subtotal
    Show {
        /// User identifier
        #[arg(short, long)]
        user: i64,
    },
    /// Add a product to the cart
    Add {
        /// User identifier
        #[arg(short, long)]
        user: i64,

        /// Product identifier
        #[arg(short, long)]
        product: i64,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product's line from the cart
    Remove {
        /// User identifier
        #[arg(short, long)]
        user: i64,

        /// Product identifier
        #[arg(short, long)]
        product: i64,
    },
    /// Empty the cart
    Clear {
        /// User identifier
        #[arg(short, long)]
        user: i64,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List the user's orders
    List {
        /// User identifier
        #[arg(short, long)]
        user: i64,
    },
    /// Show one order
    Get {
        /// Order identifier
        id: i64,
    },
    /// Place an order from the current cart
    Place {
        /// User identifier
        #[arg(short, long)]
        user: i64,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List => commands::products::list().await?,
            ProductAction::Search { query } => commands::products::search(&query).await?,
            ProductAction::Get { id } => commands::products::get(id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show { user } => commands::cart::show(user).await?,
            CartAction::Add {
                user,
                product,
                quantity,
            } => commands::cart::add(user, product, quantity).await?,
            CartAction::Remove { user, product } => commands::cart::remove(user, product).await?,
            CartAction::Clear { user } => commands::cart::clear(user).await?,
        },
        Commands::Orders { action } => match action {
            OrderAction::List { user } => commands::orders::list(user).await?,
            OrderAction::Get { id } => commands::orders::get(id).await?,
            OrderAction::Place { user } => commands::orders::place(user).await?,
        },
    }
    Ok(())
}
