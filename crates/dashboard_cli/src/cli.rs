//! Command-line definitions.

use clap::{Parser, Subcommand};
use dashboard_core::{ImportFormat, MergeMode};
use std::path::PathBuf;

/// Personal dashboard: links, notes, events and categories.
#[derive(Parser)]
#[command(name = "dashboard")]
#[command(version)]
#[command(about = "Manage a local personal dashboard", long_about = None)]
pub struct Cli {
    /// TOML config file; built-in defaults when omitted
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Override the database path from the config
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check core linkage
    Ping,

    /// Print links grouped by category, then notes and upcoming events
    List {
        /// Category names to print collapsed
        #[arg(long = "collapsed", value_name = "NAME")]
        collapsed: Vec<String>,
    },

    /// Write a backup document
    Export {
        /// Directory receiving `<product>-backup-<date>.<ext>`
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Import a backup or browser bookmark export
    Import {
        /// Document to read
        file: PathBuf,

        /// backup | bookmarks
        #[arg(long, default_value = "backup")]
        format: ImportFormat,

        /// replace | merge (bookmarks only merge)
        #[arg(long, default_value = "merge")]
        mode: MergeMode,
    },
}
