//! Connection factory.
//!
//! # Invariants
//! - Every returned connection has `foreign_keys=ON`, a busy timeout and the
//!   latest schema.

use super::migrations::migrate;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a dashboard database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private database that disappears with its connection.
    Memory,
}

impl DbLocation {
    /// Opens, configures and migrates a connection.
    ///
    /// Missing parent directories of a database file are created.
    pub fn open(&self) -> DbResult<Connection> {
        let started_at = Instant::now();
        let result = self.connect().and_then(|mut conn| {
            conn.pragma_update(None, "foreign_keys", true)?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            let from_version = migrate(&mut conn)?;
            Ok((conn, from_version))
        });

        let duration_ms = started_at.elapsed().as_millis();
        match result {
            Ok((conn, from_version)) => {
                info!(
                    "event=db_open module=db status=ok target={} from_version={} duration_ms={}",
                    self.label(),
                    from_version,
                    duration_ms
                );
                Ok(conn)
            }
            Err(err) => {
                error!(
                    "event=db_open module=db status=error target={} duration_ms={} error={}",
                    self.label(),
                    duration_ms,
                    err
                );
                Err(err)
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }

    fn connect(&self) -> DbResult<Connection> {
        match self {
            Self::File(path) => {
                if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                Ok(Connection::open(path)?)
            }
            Self::Memory => Ok(Connection::open_in_memory()?),
        }
    }
}

pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    DbLocation::File(path.as_ref().to_path_buf()).open()
}

pub fn open_db_in_memory() -> DbResult<Connection> {
    DbLocation::Memory.open()
}
