//! Rolling file logs for the dashboard core.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend from `CoreConfig`, once per process.
//! - Record panics as single-line log events.
//!
//! # Invariants
//! - Log lines carry metadata only (`event=... module=... status=...`);
//!   urls, titles and note bodies are never logged.
//! - Starting again with the same settings is a no-op; different settings
//!   are rejected with `LoggingError::AlreadyStarted`.

use crate::config::CoreConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Once;

const LOG_FILE_BASENAME: &str = "dashboard";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_MESSAGE_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Validated logging target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Absolute directory receiving `dashboard*.log` files.
    pub dir: PathBuf,
}

impl LogSettings {
    pub fn new(level: &str, dir: &Path) -> Result<Self, LoggingError> {
        if !dir.is_absolute() {
            return Err(LoggingError::RelativeDir(dir.to_path_buf()));
        }
        Ok(Self {
            level: parse_level(level)?,
            dir: dir.to_path_buf(),
        })
    }

    /// Settings for `config`, or `None` when it has no `log_dir`.
    pub fn from_config(config: &CoreConfig) -> Result<Option<Self>, LoggingError> {
        config
            .log_dir
            .as_deref()
            .map(|dir| Self::new(config.log_level(), dir))
            .transpose()
    }
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    RelativeDir(PathBuf),
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
    /// Logging already runs with other settings.
    AlreadyStarted {
        active: LogSettings,
        requested: LogSettings,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeDir(dir) => {
                write!(f, "log_dir must be an absolute path, got `{}`", dir.display())
            }
            Self::CreateDir { path, source } => {
                write!(f, "failed to create log directory `{}`: {source}", path.display())
            }
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::AlreadyStarted { active, requested } => write!(
                f,
                "logging already runs at {} in `{}`; cannot switch to {} in `{}`",
                active.level,
                active.dir.display(),
                requested.level,
                requested.dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FlexiLoggerError> for LoggingError {
    fn from(value: FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

/// Starts rolling file logs in `log_dir` at `level`.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    start_logging(LogSettings::new(level, log_dir)?)
}

/// Starts logging as configured; returns `Ok(false)` when `log_dir` is unset.
pub fn init_logging_from_config(config: &CoreConfig) -> Result<bool, LoggingError> {
    match LogSettings::from_config(config)? {
        Some(settings) => start_logging(settings).map(|()| true),
        None => Ok(false),
    }
}

pub fn start_logging(settings: LogSettings) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| start_backend(&settings))?;
    if active.settings != settings {
        return Err(LoggingError::AlreadyStarted {
            active: active.settings.clone(),
            requested: settings,
        });
    }
    Ok(())
}

/// `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Parses a level name; `warning` is accepted for `warn`, `off` is not.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    let normalized = level.trim().to_ascii_lowercase();
    let name = if normalized == "warning" {
        "warn"
    } else {
        normalized.as_str()
    };
    match name.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::UnsupportedLevel(level.to_string())),
        Ok(filter) => Ok(filter),
    }
}

fn start_backend(settings: &LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|source| LoggingError::CreateDir {
        path: settings.dir.clone(),
        source,
    })?;

    let spec = settings.level.to_string().to_ascii_lowercase();
    let handle = Logger::try_with_str(&spec)?
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    PANIC_HOOK.call_once(install_panic_hook);
    info!(
        "event=core_start module=core status=ok version={} level={} os={}",
        env!("CARGO_PKG_VERSION"),
        spec,
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        error!(
            "event=panic module=core status=error location={} message={}",
            location,
            panic_message(panic_info.payload())
        );
        previous(panic_info);
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    single_line(message, MAX_PANIC_MESSAGE_CHARS)
}

fn single_line(value: &str, max_chars: usize) -> String {
    let mut line: String = value
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(max_chars)
        .collect();
    if value.chars().count() > max_chars {
        line.push_str("...");
    }
    line
}
