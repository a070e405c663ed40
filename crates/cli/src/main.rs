//! MangaVerse CLI - the storefront from a terminal.
//!
//! Cart and session are kept in `MANGAVERSE_DATA_DIR` between invocations.
//!
//! # Usage
//!
//! ```bash
//! mv-cli products list
//! mv-cli cart add 665f1c2e9b1e8a0012345678
//! mv-cli auth login -e reader@example.com --password '...'
//! mv-cli checkout --full-name "Ash Lynx" --address-line1 "1 Bank St" \
//!     --city "New York" --country USA --phone 5550100 --method cod
//! mv-cli orders
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use mangaverse_core::{Email, ProductId};

mod commands;

use commands::checkout::CheckoutArgs;

#[derive(Parser)]
#[command(name = "mv-cli")]
#[command(author, version, about = "MangaVerse storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in, register and recover passwords
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// List your orders
    Orders,
    /// Place an order for the current cart
    Checkout(Box<CheckoutArgs>),
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List all products
    List,
    /// Show one product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add one of a product
    Add { id: ProductId },
    /// Remove a product line
    Remove { id: ProductId },
    /// Increase a line's quantity by one
    Inc { id: ProductId },
    /// Decrease a line's quantity by one (never below one)
    Dec { id: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: Email,

        #[arg(long, env = "MANGAVERSE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: Email,

        #[arg(long, env = "MANGAVERSE_PASSWORD", hide_env_values = true)]
        password: String,

        /// Repeat the password
        #[arg(long)]
        confirm: String,
    },
    /// Sign out
    Logout,
    /// Request a password reset link
    ForgotPassword {
        #[arg(short, long)]
        email: Email,
    },
    /// Set a new password with the token from the reset link
    ResetPassword {
        #[arg(short, long)]
        token: Option<String>,

        #[arg(long, env = "MANGAVERSE_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        confirm: String,
    },
    /// Show the signed-in user
    Whoami,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mangaverse_cli=info,mangaverse_storefront=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::load()?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List => commands::products::list(&ctx).await?,
            ProductsAction::Show { id } => commands::products::show(&ctx, &id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add { id } => commands::cart::add(&ctx, &id).await?,
            CartAction::Remove { id } => commands::cart::remove(&ctx, &id),
            CartAction::Inc { id } => commands::cart::increase(&ctx, &id),
            CartAction::Dec { id } => commands::cart::decrease(&ctx, &id),
            CartAction::Clear => commands::cart::clear(&ctx),
        },
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                commands::auth::login(&ctx, &email, &password).await?;
            }
            AuthAction::Register {
                name,
                email,
                password,
                confirm,
            } => commands::auth::register(&ctx, &name, &email, &password, &confirm).await?,
            AuthAction::Logout => commands::auth::logout(&ctx),
            AuthAction::ForgotPassword { email } => {
                commands::auth::forgot_password(&ctx, &email).await?;
            }
            AuthAction::ResetPassword {
                token,
                password,
                confirm,
            } => {
                commands::auth::reset_password(&ctx, token.as_deref(), &password, &confirm)
                    .await?;
            }
            AuthAction::Whoami => commands::auth::whoami(&ctx),
        },
        Commands::Orders => commands::orders::list(&ctx).await?,
        Commands::Checkout(args) => commands::checkout::run(&ctx, *args).await?,
    }
    Ok(())
}
