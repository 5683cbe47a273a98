//! Carte harvest tool.
//!
//! Pulls set menus from the upstream catalog API and writes them into the
//! Carte database.
//!
//! Usage:
//!   cargo run -p carte-harvest -- --delay-ms 500
//!   cargo run -p carte-harvest -- --every 3600

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use carte_kernel::db;
use carte_kernel::harvest::{DEFAULT_SOURCE_URL, HarvestConfig, Harvester};
use carte_kernel::listing::PgMenuStore;

/// Harvest configuration.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Upstream set menu endpoint.
    #[arg(long, env = "HARVEST_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    source_url: String,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Pause between menu writes in milliseconds.
    #[arg(long, env = "HARVEST_DELAY_MS", default_value = "1000")]
    delay_ms: u64,

    /// Repeat the harvest every N seconds instead of running once.
    #[arg(long, env = "HARVEST_EVERY")]
    every: Option<u64>,

    /// Maximum database connections.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value = "5")]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let args = Args::parse();

    let pool = db::create_pool(&args.database_url, args.max_connections)
        .await
        .context("failed to create database pool")?;
    db::run_migrations(&pool).await?;

    let harvester = Harvester::new(
        Arc::new(PgMenuStore::new(pool)),
        HarvestConfig {
            source_url: args.source_url.clone(),
            delay: Duration::from_millis(args.delay_ms),
        },
    )
    .context("failed to build HTTP client")?;

    info!(
        source = %args.source_url,
        delay_ms = args.delay_ms,
        every = ?args.every,
        "Starting harvest"
    );

    let Some(every) = args.every else {
        let report = harvester.run().await.inspect_err(|e| {
            error!(error = %e, "harvest failed");
        })?;
        info!(
            menus_created = report.menus_created,
            cuisines_upserted = report.cuisines_upserted,
            "Harvest complete"
        );
        return Ok(());
    };

    let mut interval = tokio::time::interval(Duration::from_secs(every.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match harvester.run().await {
            Ok(report) => info!(
                menus_created = report.menus_created,
                cuisines_upserted = report.cuisines_upserted,
                "Harvest complete"
            ),
            Err(e) => error!(error = %e, "harvest failed; retrying next interval"),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
