//! Connection tuning shared by every SQLite handle the crate opens

use rusqlite::Connection;
use std::time::Duration;

/// WAL journal, relaxed fsync, in-memory temp store and a 2s busy timeout
pub fn apply_optimized_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_secs(2))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "cache_size", -16_000)?;
    Ok(())
}

/// Refuse writes on this handle. Must run after [`apply_optimized_pragmas`].
pub fn apply_query_only(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "query_only", "ON")
}
