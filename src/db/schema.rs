use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn initialize_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshots (
            key TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS quiz_runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_name TEXT NOT NULL,
            industry TEXT NOT NULL,
            total_score INTEGER NOT NULL,
            max_score INTEGER NOT NULL,
            percentage INTEGER NOT NULL,
            suggested_agent TEXT NOT NULL,
            answers TEXT NOT NULL,
            completed_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_quiz_runs_completed ON quiz_runs(completed_at);
        ",
    )
    .context("Failed to create tables")?;

    Ok(())
}

pub fn open_db() -> Result<Connection> {
    crate::config::settings::ensure_parsec_dir()?;
    let db_path = crate::config::settings::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    initialize_db(&conn)?;
    Ok(conn)
}
