//! Schema upgrades for the `slots` database.
//!
//! The whole portal state lives in one `slots(key, value, updated_at)`
//! table, so upgrades are rare. `user_version` records the last step
//! applied; opening a [`crate::SqliteStorage`] replays the steps above it.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> std::result::Result<(), rusqlite::Error>;

/// `(version reached, name, step)`, in order.
const STEPS: &[(u32, &str, Step)] = &[(1, "v001_initial", v001_initial::up)];

fn schema_version(conn: &Connection) -> Result<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let from = schema_version(conn)?;

    for &(version, name, step) in STEPS.iter().filter(|(v, _, _)| *v > from) {
        tracing::info!(version, name, "upgrading slots schema");
        step(conn).map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
        conn.pragma_update(None, "user_version", version)?;
    }

    tracing::debug!(from, to = schema_version(conn)?, "slots schema ready");
    Ok(())
}
