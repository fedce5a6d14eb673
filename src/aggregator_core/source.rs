//! Query capabilities the aggregator depends on
//!
//! The aggregator never opens connections itself. The surrounding application
//! owns a store (see [`super::sqlite_store::SqliteLoginStore`]) and lends it
//! through these traits.

use super::types::{CategoryTotal, DailyCount, WindowDays};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Species name -> classification label (e.g. diet)
pub type ClassificationLookup = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum AggregateError {
    /// The event source could not be reached or the query failed to execute.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),
}

impl From<rusqlite::Error> for AggregateError {
    fn from(err: rusqlite::Error) -> Self {
        AggregateError::DataUnavailable(format!("database error: {}", err))
    }
}

impl From<std::io::Error> for AggregateError {
    fn from(err: std::io::Error) -> Self {
        AggregateError::DataUnavailable(format!("io error: {}", err))
    }
}

impl From<serde_json::Error> for AggregateError {
    fn from(err: serde_json::Error) -> Self {
        AggregateError::DataUnavailable(format!("malformed classification data: {}", err))
    }
}

/// Grouped-count queries over the login event table
pub trait LoginSource: Send + Sync {
    /// One row per (UTC day, species) with `cutoff <= ts <= now`,
    /// ordered by day ascending, then species ascending.
    fn daily_counts(
        &self,
        window: WindowDays,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyCount>, AggregateError>;

    /// One row per species over the same range, ordered by total descending,
    /// then species ascending.
    fn category_totals(
        &self,
        window: WindowDays,
        now: DateTime<Utc>,
    ) -> Result<Vec<CategoryTotal>, AggregateError>;
}

/// Full species -> classification mapping
pub trait ClassificationSource: Send + Sync {
    fn load(&self) -> Result<ClassificationLookup, AggregateError>;
}

impl<T: LoginSource + ?Sized> LoginSource for std::sync::Arc<T> {
    fn daily_counts(
        &self,
        window: WindowDays,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyCount>, AggregateError> {
        (**self).daily_counts(window, now)
    }

    fn category_totals(
        &self,
        window: WindowDays,
        now: DateTime<Utc>,
    ) -> Result<Vec<CategoryTotal>, AggregateError> {
        (**self).category_totals(window, now)
    }
}

impl<T: ClassificationSource + ?Sized> ClassificationSource for std::sync::Arc<T> {
    fn load(&self) -> Result<ClassificationLookup, AggregateError> {
        (**self).load()
    }
}

impl<T: ClassificationSource + ?Sized> ClassificationSource for Box<T> {
    fn load(&self) -> Result<ClassificationLookup, AggregateError> {
        (**self).load()
    }
}

/// A fixed in-memory mapping
impl ClassificationSource for ClassificationLookup {
    fn load(&self) -> Result<ClassificationLookup, AggregateError> {
        Ok(self.clone())
    }
}
