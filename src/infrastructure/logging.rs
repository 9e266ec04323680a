//! Logging system configuration and initialization
//!
//! Console output with optional file logging, KST (Korea Standard Time)
//! timestamps, and EnvFilter-based level control.

use anyhow::{Result, anyhow};
use std::path::PathBuf;
use tracing::info;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    layer::SubscriberExt,
    util::SubscriberInitExt,
    fmt::{self, time::FormatTime},
    EnvFilter,
    Registry,
};
use chrono::{Utc, FixedOffset};
use lazy_static::lazy_static;
use std::sync::Mutex;

pub use crate::infrastructure::config::LoggingSettings;

// Global guard to keep the log file writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

/// Custom time formatter for KST (Korea Standard Time, UTC+9)
struct KstTimeFormatter;

impl FormatTime for KstTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Utc::now();
        let kst_offset = FixedOffset::east_opt(9 * 3600).unwrap(); // UTC+9
        let kst_time = now.with_timezone(&kst_offset);
        write!(w, "{}", kst_time.format("%Y-%m-%d %H:%M:%S%.3f %Z"))
    }
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingSettings::default())
}

/// Initialize logging with custom configuration
///
/// Verbose dependency logs (tokio runtime internals) are suppressed unless
/// TRACE is requested. The RUST_LOG environment variable overrides
/// everything.
pub fn init_logging_with_config(settings: &LoggingSettings) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(&settings.level);

        if !settings.level.to_lowercase().contains("trace") {
            filter = filter
                .add_directive("tokio=info".parse().unwrap())
                .add_directive("runtime=warn".parse().unwrap())
                .add_directive(format!("nutriscan_lib={}", settings.level).parse().unwrap());
        }

        filter
    });

    let registry = Registry::default().with(env_filter);

    if settings.file_logging {
        let log_dir = PathBuf::from(&settings.log_dir);
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

        let file_appender = rolling::never(&log_dir, "nutriscan.log");
        let (file_writer, file_guard) = non_blocking(file_appender);
        LOG_GUARDS.lock().unwrap().push(file_guard);

        // File layer with minimal formatting (time + level + message only)
        let file_layer = fmt::Layer::new()
            .with_writer(file_writer)
            .with_timer(KstTimeFormatter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(false);
        let console_layer = fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_timer(KstTimeFormatter)
            .with_target(false);

        registry.with(file_layer).with(console_layer).init();
        info!("Log directory: {:?}", log_dir);
    } else {
        let console_layer = fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_timer(KstTimeFormatter)
            .with_target(false);

        registry.with(console_layer).init();
    }

    info!("Logging system initialized");
    info!("Log level: {}", settings.level);

    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== NutriScan v2 System Information ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {:?}", current_dir);
    }

    info!("=======================================");
}
