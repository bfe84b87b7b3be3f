//! Schema scripts for the dashboard collections.
//!
//! Script `n` (1-based) upgrades the schema to version `n`. The applied
//! version is kept in `PRAGMA user_version`, and each script commits in its
//! own transaction so a failing script leaves the previous version intact.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

const SCRIPTS: &[&str] = &[
    include_str!("0001_init.sql"),
    include_str!("0002_lookup_indexes.sql"),
];

/// Schema version written by this build.
pub const LATEST_VERSION: u32 = SCRIPTS.len() as u32;

/// Upgrades `conn` to `LATEST_VERSION` and returns the version it started at.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the database is newer.
/// - `DbError::Migration` naming the first script that failed.
pub fn migrate(conn: &mut Connection) -> DbResult<u32> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if found > LATEST_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: LATEST_VERSION,
        });
    }

    for (version, script) in (1u32..).zip(SCRIPTS).skip(found as usize) {
        let tx = conn.transaction()?;
        tx.execute_batch(script)
            .map_err(|source| DbError::Migration { version, source })?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        info!("event=db_migrate module=db status=ok version={version}");
    }
    Ok(found)
}
