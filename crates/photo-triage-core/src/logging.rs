use log::{error, info, warn, LevelFilter};
use std::path::{Path, PathBuf};

// For file-based logging with rotation
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::error::DecodeError;

/// Environment variable that overrides the log level filter
pub const LOG_LEVEL_ENV: &str = "TRIAGE_LOG";

/// Initialize a rotating file logger in `log_dir` with timestamp, level and module path.
/// Logs go to file only so they do not interfere with progress bars.
pub fn init_logger(log_dir: &Path, debug: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(log_dir)?;

    let log_file_path = log_dir.join("triage.log");
    let archived_logs_pattern = format!("{}/triage.{{}}.log", log_dir.display());

    // Rotate at 10MB, keep 5 archived log files
    let file_trigger = SizeTrigger::new(10 * 1024 * 1024);
    let file_roller = FixedWindowRoller::builder()
        .build(&archived_logs_pattern, 5)
        .map_err(|e| format!("Failed to create log roller: {}", e))?;
    let compound_policy = CompoundPolicy::new(Box::new(file_trigger), Box::new(file_roller));

    let rolling_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] [{M}:{L}] - {m}{n}",
        )))
        .build(&log_file_path, Box::new(compound_policy))
        .map_err(|e| format!("Failed to create log appender: {}", e))?;

    let level = level_filter(debug);
    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(rolling_file)))
        .build(Root::builder().appender("file").build(level))
        .map_err(|e| format!("Failed to build log config: {}", e))?;

    log4rs::init_config(config).map_err(|e| format!("Failed to initialize log4rs: {}", e))?;
    log::set_max_level(level);

    info!("Photo triage started");
    info!("Logging to file: {}", log_file_path.display());
    Ok(log_file_path)
}

/// Console logging through env_logger, for interactive use
pub fn init_console_logger(debug: bool) {
    let _ = env_logger::Builder::new()
        .filter_level(level_filter(debug))
        .format_timestamp_secs()
        .try_init();
}

/// Debug when asked for, otherwise whatever `TRIAGE_LOG` says (default info)
fn level_filter(debug: bool) -> LevelFilter {
    if debug {
        return LevelFilter::Debug;
    }

    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Per-user directory for log files
pub fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "photo-triage")
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Log an image that could not be decoded
pub fn log_decode_error(error: &DecodeError) {
    warn!(
        "Decode failed - Path: {}, Error: {}",
        error.path().display(),
        error
    );
}

/// Log an action that did not complete
pub fn log_action_failure(path: &Path, operation: &str, reason: &str) {
    error!(
        "Action failed - Operation: {}, Path: {}, Error: {}",
        operation,
        path.display(),
        reason
    );
}

/// Log file system modification
pub fn log_fs_modification(operation: &str, path: &Path, details: Option<&str>) {
    let details_str = details.unwrap_or("");
    info!(
        "FS CHANGE - Operation: {}, Path: {}{}",
        operation,
        path.display(),
        if details_str.is_empty() {
            "".to_string()
        } else {
            format!(", Details: {}", details_str)
        }
    );
}
