//! SCAMP CLI - Browse the catalog and manage a cart from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # List products
//! scamp products
//!
//! # Show one product
//! scamp product 8123456789
//!
//! # Work with the cart (remembered in .scamp/local-storage.json)
//! scamp cart add 44012345678 -q 2
//! scamp cart show
//! scamp cart checkout
//! ```
//!
//! # Commands
//!
//! - `products` - List the first page of products
//! - `product` - Show a product and its variants
//! - `cart` - Show, add, update, remove, clear, checkout
//!
//! Shopify settings are read from the same environment variables as the
//! storefront (`SHOPIFY_STORE`, `SHOPIFY_STOREFRONT_TOKEN`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod local_storage;
mod render;

use commands::CommandError;
use commands::cart::LocalCart;
use local_storage::LocalStorage;

#[derive(Parser)]
#[command(name = "scamp")]
#[command(author, version, about = "SCAMP storefront CLI")]
struct Cli {
    /// JSON file that remembers the cart between runs
    #[arg(long, global = true, default_value = ".scamp/local-storage.json")]
    state_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products,
    /// Show a product
    Product {
        /// Product ID (numeric or gid://shopify/Product/...)
        id: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product variant
    Add {
        /// Variant ID (numeric or gid://shopify/ProductVariant/...)
        variant_id: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Set a line's quantity (0 removes the line)
    Update {
        /// Cart line ID, as shown by `cart show`
        line_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Cart line ID, as shown by `cart show`
        line_id: String,
    },
    /// Empty the cart
    Clear,
    /// Print the checkout URL
    Checkout,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            #[allow(clippy::print_stdout)]
            {
                print!("{output}");
            }
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String, CommandError> {
    match cli.command {
        Commands::Products => commands::products::list().await,
        Commands::Product { id } => commands::products::show(&id).await,
        Commands::Cart { action } => {
            let cart = LocalCart::open(LocalStorage::new(cli.state_file)).await?;
            match action {
                CartAction::Show => cart.show().await,
                CartAction::Add {
                    variant_id,
                    quantity,
                } => cart.add(&variant_id, quantity).await,
                CartAction::Update { line_id, quantity } => cart.update(&line_id, quantity).await,
                CartAction::Remove { line_id } => cart.remove(&line_id).await,
                CartAction::Clear => cart.clear().await,
                CartAction::Checkout => cart.checkout().await,
            }
        }
    }
}
