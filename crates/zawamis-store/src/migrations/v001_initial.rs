//! v001 -- Initial schema creation.
//!
//! A single `slots` table mirrors browser local storage: one row per named
//! slot, the value being the slot's JSON text.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS slots (
    key        TEXT PRIMARY KEY NOT NULL,   -- slot name, e.g. "userComments"
    value      TEXT NOT NULL,               -- JSON text, not validated here
    updated_at TEXT NOT NULL                -- RFC-3339 time of the last write
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
