//! SQLite-backed login event store
//!
//! Holds one long-lived connection for the lifetime of the application. Every
//! query takes the connection through a mutex guard, so it is released on all
//! exit paths including query failure.

use super::source::{AggregateError, ClassificationLookup, ClassificationSource, LoginSource};
use super::types::{CategoryTotal, DailyCount, WindowDays};
use crate::sqlite_pragma::{apply_optimized_pragmas, apply_query_only};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA_SQL: &str = include_str!("../../sql/001_species_logins.sql");

const DAILY_COUNTS_SQL: &str = "
    SELECT date(ts, 'unixepoch') AS day,
           species,
           COUNT(*) AS count
    FROM species_logins
    WHERE ts >= ?1 AND ts <= ?2
    GROUP BY 1, 2
    ORDER BY 1 ASC, 2 ASC";

const CATEGORY_TOTALS_SQL: &str = "
    SELECT species,
           COUNT(*) AS total
    FROM species_logins
    WHERE ts >= ?1 AND ts <= ?2
    GROUP BY species
    ORDER BY total DESC, species ASC";

pub struct SqliteLoginStore {
    conn: Mutex<Connection>,
}

impl SqliteLoginStore {
    /// Open (or create) a read-write store and apply the schema.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, AggregateError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        apply_optimized_pragmas(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;

        log::info!("📂 Login store opened: {}", db_path.display());
        Ok(store)
    }

    /// Open an existing store for dashboard reads. Writes are refused.
    pub fn open_read_only(db_path: impl AsRef<Path>) -> Result<Self, AggregateError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        apply_optimized_pragmas(&conn)?;
        apply_query_only(&conn)?;

        log::info!("📖 Login store opened read-only: {}", db_path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, AggregateError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Idempotent; every statement uses IF NOT EXISTS.
    pub fn ensure_schema(&self) -> Result<(), AggregateError> {
        self.connection()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    pub fn insert_login(&self, ts: DateTime<Utc>, species: &str) -> Result<(), AggregateError> {
        self.connection()?.execute(
            "INSERT INTO species_logins (ts, species) VALUES (?1, ?2)",
            params![ts.timestamp(), species],
        )?;
        Ok(())
    }

    /// Insert a batch of logins in one transaction. Returns the number written.
    pub fn insert_logins<'a, I>(&self, logins: I) -> Result<usize, AggregateError>
    where
        I: IntoIterator<Item = (DateTime<Utc>, &'a str)>,
    {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO species_logins (ts, species) VALUES (?1, ?2)")?;
            for (ts, species) in logins {
                stmt.execute(params![ts.timestamp(), species])?;
                written += 1;
            }
        }
        tx.commit()?;

        log::debug!("Inserted {} logins", written);
        Ok(written)
    }

    pub fn upsert_diet(&self, species: &str, diet: &str) -> Result<(), AggregateError> {
        self.connection()?.execute(
            "INSERT INTO species_diets (species, diet) VALUES (?1, ?2)
             ON CONFLICT(species) DO UPDATE SET diet = excluded.diet",
            params![species, diet],
        )?;
        Ok(())
    }

    pub fn login_count(&self) -> Result<u64, AggregateError> {
        let conn = self.connection()?;
        let count = conn.query_row("SELECT COUNT(*) FROM species_logins", [], |row| {
            count_column(row, 0)
        })?;
        Ok(count)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, AggregateError> {
        self.conn
            .lock()
            .map_err(|_| AggregateError::DataUnavailable("connection lock poisoned".to_string()))
    }
}

impl LoginSource for SqliteLoginStore {
    fn daily_counts(
        &self,
        window: WindowDays,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyCount>, AggregateError> {
        let cutoff = window.cutoff(now);
        let conn = self.connection()?;
        let mut stmt = conn.prepare_cached(DAILY_COUNTS_SQL)?;

        let rows = stmt
            .query_map(params![cutoff.timestamp(), now.timestamp()], |row| {
                Ok(DailyCount {
                    day: row.get(0)?,
                    category: row.get(1)?,
                    count: count_column(row, 2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("📥 {} daily rows for window {}", rows.len(), window);
        Ok(rows)
    }

    fn category_totals(
        &self,
        window: WindowDays,
        now: DateTime<Utc>,
    ) -> Result<Vec<CategoryTotal>, AggregateError> {
        let cutoff = window.cutoff(now);
        let conn = self.connection()?;
        let mut stmt = conn.prepare_cached(CATEGORY_TOTALS_SQL)?;

        let rows = stmt
            .query_map(params![cutoff.timestamp(), now.timestamp()], |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total: count_column(row, 1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("📥 {} category totals for window {}", rows.len(), window);
        Ok(rows)
    }
}

impl ClassificationSource for SqliteLoginStore {
    fn load(&self) -> Result<ClassificationLookup, AggregateError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare_cached("SELECT species, diet FROM species_diets")?;
        let lookup = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<ClassificationLookup, _>>()?;
        Ok(lookup)
    }
}

fn count_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let n: i64 = row.get(idx)?;
    u64::try_from(n).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, n))
}
