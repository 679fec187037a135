//! # Mercado Admin
//!
//! Composition root for the commerce engine on SQLite, with admin
//! subcommands.
//!
//! ## Usage
//! ```bash
//! mercado-admin migrate
//! mercado-admin seed
//! mercado-admin availability --sku TAZA-BARRO
//! mercado-admin adjust --sku TAZA-BARRO --delta -3 --reason "merma"
//! mercado-admin add-to-cart --user u-1 --sku VAJILLA-2 --qty 1 --bundle-mode sum-with-discount --discount-pct 10
//! mercado-admin checkout --user u-1
//! mercado-admin review-claim --claim <id> --decision approve
//! ```
//!
//! Failures print the `{ code, message }` error body on stderr and exit 1.

mod commands;
mod config;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mercado_core::types::ClaimDecision;
use mercado_core::BundlePriceMode;
use mercado_db::Database;
use mercado_engine::{Commerce, CommerceError};

use crate::config::AdminConfig;

#[derive(Parser)]
#[command(name = "mercado-admin")]
#[command(author, version, about = "Mercado commerce engine admin tools")]
struct Cli {
    /// Tenant to act on; defaults to MERCADO_TENANT_ID
    #[arg(long, global = true)]
    tenant: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create demo stores, products and stock
    Seed,
    /// Show stock for a SKU
    Availability {
        #[arg(long)]
        sku: String,
    },
    /// Correct stock for a SKU (negative deltas clamp at zero)
    Adjust {
        #[arg(long)]
        sku: String,
        #[arg(long, allow_hyphen_values = true)]
        delta: i64,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Add a SKU to a user's cart
    AddToCart {
        #[arg(long)]
        user: String,
        #[arg(long)]
        sku: String,
        #[arg(long, default_value_t = 1)]
        qty: i64,
        #[arg(long, value_enum)]
        bundle_mode: Option<BundleModeArg>,
        /// Discount for sum-with-discount, 0-100
        #[arg(long)]
        discount_pct: Option<f64>,
    },
    /// Settle a user's cart into a paid order
    Checkout {
        #[arg(long)]
        user: String,
    },
    /// Approve or reject a pending store claim
    ReviewClaim {
        #[arg(long)]
        claim: String,
        #[arg(long, value_enum)]
        decision: DecisionArg,
        #[arg(long, default_value = "admin")]
        admin: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BundleModeArg {
    Fixed,
    Sum,
    SumWithDiscount,
}

impl From<BundleModeArg> for BundlePriceMode {
    fn from(arg: BundleModeArg) -> Self {
        match arg {
            BundleModeArg::Fixed => BundlePriceMode::Fixed,
            BundleModeArg::Sum => BundlePriceMode::Sum,
            BundleModeArg::SumWithDiscount => BundlePriceMode::SumWithDiscount,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DecisionArg {
    Approve,
    Reject,
}

impl From<DecisionArg> for ClaimDecision {
    fn from(arg: DecisionArg) -> Self {
        match arg {
            DecisionArg::Approve => ClaimDecision::Approve,
            DecisionArg::Reject => ClaimDecision::Reject,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AdminConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    init_tracing(&config.log_filter);

    if let Err(err) = run(cli, config).await {
        match err.downcast_ref::<CommerceError>() {
            Some(commerce_err) => match serde_json::to_string(&commerce_err.to_body()) {
                Ok(body) => eprintln!("{body}"),
                Err(_) => eprintln!("{commerce_err}"),
            },
            None => {
                error!(error = %err, "Command failed");
                eprintln!("{err:#}");
            }
        }
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over `MERCADO_LOG`.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, config: AdminConfig) -> anyhow::Result<()> {
    let tenant_id = cli.tenant.unwrap_or_else(|| config.tenant_id.clone());

    let db = Database::new(config.db_config()).await?;
    info!(path = %config.database_path.display(), tenant_id = %tenant_id, "Database ready");
    let commerce = Commerce::with_limits(db.repositories(), config.cart_limits());

    let result = match cli.command {
        Commands::Migrate => commands::migrate(&db).await,
        Commands::Seed => commands::seed(&commerce, &tenant_id).await,
        Commands::Availability { sku } => commands::availability(&commerce, &tenant_id, &sku).await,
        Commands::Adjust { sku, delta, reason } => {
            commands::adjust(&commerce, &tenant_id, sku, delta, reason).await
        }
        Commands::AddToCart {
            user,
            sku,
            qty,
            bundle_mode,
            discount_pct,
        } => {
            commands::add_to_cart(
                &commerce,
                &tenant_id,
                &user,
                sku,
                qty,
                bundle_mode.map(BundlePriceMode::from),
                discount_pct,
            )
            .await
        }
        Commands::Checkout { user } => commands::checkout(&commerce, &tenant_id, &user).await,
        Commands::ReviewClaim {
            claim,
            decision,
            admin,
        } => commands::review_claim(&commerce, &tenant_id, &admin, claim, decision.into()).await,
    };

    db.close().await;
    result
}
