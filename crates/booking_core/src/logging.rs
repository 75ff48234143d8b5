//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start the rolling file logger exactly once per process.
//! - Optionally mirror records to stderr for foreground server runs.
//! - Capture panics as sanitized log records.
//!
//! # Invariants
//! - Initialization is idempotent for an identical configuration.
//! - A second initialization with a different level, directory or echo mode
//!   is rejected instead of silently reconfiguring.
//! - Initialization never panics.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, LoggerHandle, Naming,
    WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "booking";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;
const BUILD_MODE: &str = if cfg!(debug_assertions) {
    "debug"
} else {
    "release"
};

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

/// Requested logger setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`, case-insensitive.
    pub level: String,
    /// Absolute directory for rotated log files.
    pub log_dir: String,
    /// Mirror `info` and above to stderr.
    pub echo_stderr: bool,
}

impl LoggingConfig {
    pub fn new(level: impl Into<String>, log_dir: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            log_dir: log_dir.into(),
            echo_stderr: false,
        }
    }

    pub fn with_stderr_echo(mut self, enabled: bool) -> Self {
        self.echo_stderr = enabled;
        self
    }
}

struct ActiveLogger {
    level: LevelFilter,
    log_dir: PathBuf,
    echo_stderr: bool,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn ensure_matches(
        &self,
        level: LevelFilter,
        log_dir: &Path,
        echo_stderr: bool,
    ) -> Result<(), String> {
        if self.log_dir != log_dir {
            return Err(format!(
                "logging already writes to `{}`; refusing to switch to `{}`",
                self.log_dir.display(),
                log_dir.display()
            ));
        }
        if self.level != level {
            return Err(format!(
                "logging already runs at level `{}`; refusing to switch to `{}`",
                self.level, level
            ));
        }
        if self.echo_stderr != echo_stderr {
            return Err("logging stderr echo mode cannot change after start".to_string());
        }
        Ok(())
    }
}

/// Starts the process logger.
///
/// Returns a human-readable error when the level is unknown, the directory is
/// empty, relative or cannot be created, the backend fails to start, or a
/// different configuration is already active.
pub fn init_logging(config: &LoggingConfig) -> Result<(), String> {
    let level = parse_level(&config.level)?;
    let log_dir = absolute_log_dir(&config.log_dir)?;
    let echo_stderr = config.echo_stderr;

    if let Some(active) = ACTIVE_LOGGER.get() {
        return active.ensure_matches(level, &log_dir, echo_stderr);
    }

    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(level, &log_dir, echo_stderr))?;
    active.ensure_matches(level, &log_dir, echo_stderr)
}

fn start_logger(
    level: LevelFilter,
    log_dir: &Path,
    echo_stderr: bool,
) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(log_dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            log_dir.display()
        )
    })?;

    let duplicate = if echo_stderr {
        Duplicate::Info
    } else {
        Duplicate::None
    };

    let handle = Logger::with(LogSpecification::builder().default(level).build())
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .duplicate_to_stderr(duplicate)
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    PANIC_HOOK_INSTALLED.get_or_init(install_panic_hook);

    info!(
        "event=process_start module=core status=ok platform={} build_mode={} version={}",
        std::env::consts::OS,
        BUILD_MODE,
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "event=logging_init module=core status=ok level={} log_dir={} echo_stderr={}",
        level,
        log_dir.display(),
        echo_stderr
    );

    Ok(ActiveLogger {
        level,
        log_dir: log_dir.to_path_buf(),
        echo_stderr,
        _handle: handle,
    })
}

/// Level and directory of the running logger, if one was started.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Accepts the `log` level names plus `warning`; `off` is refused.
fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    let raw = raw.trim();
    let parsed = if raw.eq_ignore_ascii_case("warning") {
        Ok(LevelFilter::Warn)
    } else {
        raw.parse::<LevelFilter>()
    };
    match parsed {
        Ok(LevelFilter::Off) | Err(_) => Err(format!(
            "unsupported log level `{raw}`; expected trace|debug|info|warn|error"
        )),
        Ok(level) => Ok(level),
    }
}

fn absolute_log_dir(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw.trim());
    if path.as_os_str().is_empty() {
        Err("log_dir cannot be empty".to_string())
    } else if path.is_relative() {
        Err(format!("log_dir must be an absolute path, got `{}`", path.display()))
    } else {
        Ok(path)
    }
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |at| format!("{}:{}", at.file(), at.line()));
        let payload = panic_info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string panic payload");
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            sanitize_message(message, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous(panic_info);
    }));
}

/// Single-line, at most `max_chars` characters plus an ellipsis marker.
pub(crate) fn sanitize_message(value: &str, max_chars: usize) -> String {
    let mut chars = value
        .chars()
        .map(|c| if matches!(c, '\n' | '\r') { ' ' } else { c });
    let mut line: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        line.push_str("...");
    }
    line
}
