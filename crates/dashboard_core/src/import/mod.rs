//! Import document parsing.
//!
//! # Responsibility
//! - Parse backup documents and browser bookmark exports into entities.
//! - Reject malformed input before any write is attempted.
//!
//! # Invariants
//! - Parsing is pure; persistence happens in `service::import_service`.

pub mod backup;
pub mod bookmarks;

use crate::repo::collection_repo::RepoError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub type ImportResult<T> = Result<T, ImportError>;

/// Errors from import parsing and merge.
#[derive(Debug)]
pub enum ImportError {
    /// Input is malformed; nothing was written.
    Validation(String),
    /// The requested merge mode is not available for this format.
    UnsupportedMode {
        format: ImportFormat,
        mode: MergeMode,
    },
    /// Writing the imported entities failed.
    Repo(RepoError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid import document: {message}"),
            Self::UnsupportedMode { format, mode } => {
                write!(f, "{mode} import is not supported for {format} documents")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Input document shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    /// JSON backup produced by `export_snapshot`.
    Backup,
    /// Netscape bookmark HTML exported by browsers.
    Bookmarks,
}

/// How imported entities combine with existing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Clear all collections, then insert everything imported.
    Replace,
    /// Keep existing data and add what is new.
    Merge,
}

impl Display for ImportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Backup => "backup",
            Self::Bookmarks => "bookmarks",
        })
    }
}

impl Display for MergeMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Replace => "replace",
            Self::Merge => "merge",
        })
    }
}

impl FromStr for ImportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "backup" | "json" => Ok(Self::Backup),
            "bookmarks" | "html" => Ok(Self::Bookmarks),
            other => Err(format!(
                "unsupported import format `{other}`; expected backup|bookmarks"
            )),
        }
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(format!(
                "unsupported merge mode `{other}`; expected replace|merge"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ImportFormat, MergeMode};

    #[test]
    fn format_and_mode_parse_case_insensitively() {
        assert_eq!("HTML".parse::<ImportFormat>().unwrap(), ImportFormat::Bookmarks);
        assert_eq!(" backup ".parse::<ImportFormat>().unwrap(), ImportFormat::Backup);
        assert_eq!("Merge".parse::<MergeMode>().unwrap(), MergeMode::Merge);
        assert!("upsert".parse::<MergeMode>().is_err());
    }
}
