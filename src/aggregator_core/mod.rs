//! Aggregator Core - windowed species-login aggregation
//!
//! Turns the raw `species_logins` table into the tables a dashboard plots.
//!
//! # Architecture
//!
//! ```text
//! species_logins (SQLite) → SqliteLoginStore (LoginSource)
//!     ↓
//! WindowCache (TTL per window length)
//!     ↓
//! Aggregator (daily counts, totals, per-diet split)
//!     ↓
//! Reshaper (leaderboard, day x species pivot, Top-K per diet)
//! ```

pub mod aggregator;
pub mod cache;
pub mod classification;
pub mod reshaper;
pub mod source;
pub mod sqlite_store;
pub mod types;

pub use aggregator::{classification_totals, Aggregator};
pub use cache::{CachedRows, WindowCache, DEFAULT_CACHE_TTL};
pub use classification::{JsonClassificationFile, UnclassifiedPolicy};
pub use reshaper::{
    pivot, reshape, top_k_by_classification, totals, ColumnOrder, ReshapeOptions, Reshaped,
    DEFAULT_TOP_K,
};
pub use source::{AggregateError, ClassificationLookup, ClassificationSource, LoginSource};
pub use sqlite_store::SqliteLoginStore;
pub use types::{
    CategoryTotal, ClassificationTotal, DailyCount, PivotTable, WindowDays, WindowError,
    SECS_PER_DAY,
};
