//! Species Dashboard - windowed login aggregation
//!
//! Renders the leaderboard, the day x species pivot and the per-diet Top-K for
//! the last N days, once or on an interval.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin species-dashboard -- --days 30 --ranked
//! cargo run --release --bin species-dashboard -- --watch 60 --output jsonl
//! ```
//!
//! ## Environment Variables
//!
//! See [`species_pulse::config::DashboardConfig::from_env`]. Flags override them.
//! - RUST_LOG - Logging level (optional, default: info)

use chrono::Utc;
use clap::Parser;
use species_pulse::aggregator_core::{
    ClassificationSource, ColumnOrder, JsonClassificationFile, ReshapeOptions, SqliteLoginStore,
    WindowCache, WindowDays,
};
use species_pulse::config::DashboardConfig;
use species_pulse::dashboard::{Dashboard, DashboardView, OutputBackend, ReportWriter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{interval, Duration};

type StoreDashboard = Dashboard<Arc<SqliteLoginStore>>;

#[derive(Debug, Parser)]
#[command(name = "species-dashboard", about = "Aggregate species logins over a lookback window")]
struct Args {
    /// SQLite database holding species_logins
    #[arg(long, env = "SPECIES_DB_PATH")]
    db: Option<PathBuf>,

    /// Lookback window in days
    #[arg(short, long)]
    days: Option<u32>,

    /// Order pivot columns by total logins instead of alphabetically
    #[arg(long)]
    ranked: bool,

    /// Species listed per diet
    #[arg(long)]
    top_k: Option<usize>,

    /// JSON file mapping species to diet (defaults to the species_diets table)
    #[arg(long)]
    classifications: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputBackend::Console)]
    output: OutputBackend,

    /// Destination for --output jsonl
    #[arg(long, default_value = "reports/dashboard.jsonl")]
    output_path: PathBuf,

    /// Re-render every N seconds until Ctrl+C
    #[arg(long)]
    watch: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let args = Args::parse();
    let mut config = DashboardConfig::from_env()?;
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(path) = args.classifications {
        config.classifications_path = Some(path);
    }
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    let window = match args.days {
        Some(days) => config.window_bounds.check(days)?,
        None => config.default_window,
    };

    log::info!("🚀 Starting Species Dashboard");
    log::info!("   Database: {}", config.db_path.display());
    log::info!("   Window: {}", window);
    log::info!("   Cache TTL: {}s", config.cache_ttl.as_secs());
    log::info!("   Top-K: {}", config.top_k);
    log::info!("   Unclassified species: {}", config.unclassified);

    let store = Arc::new(SqliteLoginStore::open_read_only(&config.db_path)?);

    let options = ReshapeOptions {
        column_order: if args.ranked {
            ColumnOrder::Ranked
        } else {
            ColumnOrder::Alphabetical
        },
        top_k: config.top_k,
        unclassified: config.unclassified.clone(),
    };

    let classifications: Box<dyn ClassificationSource> = match &config.classifications_path {
        Some(path) => {
            log::info!("   Diets: {}", path.display());
            Box::new(JsonClassificationFile::new(path))
        }
        None => {
            log::info!("   Diets: species_diets table");
            Box::new(Arc::clone(&store))
        }
    };

    let dashboard = Arc::new(
        Dashboard::new(Arc::clone(&store), WindowCache::new(config.cache_ttl), options)
            .with_classifications(classifications),
    );

    let mut writer = ReportWriter::new(args.output, args.output_path)?;
    log::info!("📊 Output: {}", writer.backend_type());

    let Some(every) = args.watch else {
        let view = render(&dashboard, window).await?;
        writer.write_view(&view).await?;
        writer.flush().await?;
        return Ok(());
    };

    let mut ticker = interval(Duration::from_secs(every.max(1)));
    log::info!("✅ Dashboard running - refreshing every {}s", every.max(1));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match render(&dashboard, window).await {
                    Ok(view) => {
                        if let Err(e) = writer.write_view(&view).await {
                            log::error!("Failed to write dashboard view: {}", e);
                        } else if let Err(e) = writer.flush().await {
                            log::error!("Failed to flush dashboard view: {}", e);
                        }
                    }
                    Err(e) => log::error!("Dashboard render failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("🛑 Shutting down dashboard");
                break;
            }
        }
    }

    writer.flush().await?;
    Ok(())
}

/// SQLite calls block, so renders run off the async workers
async fn render(
    dashboard: &Arc<StoreDashboard>,
    window: WindowDays,
) -> Result<DashboardView, Box<dyn std::error::Error>> {
    let dashboard = Arc::clone(dashboard);
    let view = tokio::task::spawn_blocking(move || dashboard.render(window, Utc::now())).await??;
    Ok(view)
}
