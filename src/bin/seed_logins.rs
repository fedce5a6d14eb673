//! Seed Logins - synthetic bot inserts for local development
//!
//! Writes random species logins spread over the past N days, plus the
//! species -> diet table the dashboard classifies with.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin seed-logins -- --count 500 --days 30
//! ```

use chrono::{Duration, Utc};
use clap::Parser;
use rand::seq::SliceRandom;
use rand::Rng;
use species_pulse::aggregator_core::{SqliteLoginStore, SECS_PER_DAY};
use std::path::PathBuf;

/// Species and their diet. `None` leaves the species unclassified.
const SPECIES: &[(&str, Option<&str>)] = &[
    ("Raptor", Some("carnivore")),
    ("Trex", Some("carnivore")),
    ("Stego", Some("herbivore")),
    ("Bronto", Some("herbivore")),
    ("Ankylo", Some("herbivore")),
    ("Oviraptor", Some("omnivore")),
    ("Dodo", None),
];

#[derive(Debug, Parser)]
#[command(name = "seed-logins", about = "Insert random species logins")]
struct Args {
    #[arg(long, env = "SPECIES_DB_PATH", default_value = "data/species.db")]
    db: PathBuf,

    /// Number of logins to insert
    #[arg(long, default_value_t = 500)]
    count: usize,

    /// Spread logins over this many past days
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    days: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let args = Args::parse();
    let store = SqliteLoginStore::open(&args.db)?;

    for (species, diet) in SPECIES {
        if let Some(diet) = diet {
            store.upsert_diet(species, diet)?;
        }
    }

    let now = Utc::now();
    let span = i64::from(args.days) * SECS_PER_DAY;
    let mut rng = rand::thread_rng();
    let logins: Vec<_> = (0..args.count)
        .filter_map(|_| {
            let (species, _) = SPECIES.choose(&mut rng)?;
            let ts = now - Duration::seconds(rng.gen_range(0..span));
            Some((ts, *species))
        })
        .collect();

    let written = store.insert_logins(logins)?;

    log::info!(
        "🌱 Seeded {} logins over {} days into {} ({} total)",
        written,
        args.days,
        args.db.display(),
        store.login_count()?
    );
    Ok(())
}
