//! Structured logging for DealDesk
//!
//! This module provides a clean, ergonomic logging API with:
//! - Automatic debug mode filtering from command-line arguments
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via --debug-<module> flags
//! - Dual output: colored console + file persistence
//!
//! ## Usage
//!
//! ```rust
//! use dealdesk::logger::{self, LogTag};
//!
//! logger::error(LogTag::Api, "Request failed");
//! logger::warning(LogTag::Scorer, "Falling back to recovered score");
//! logger::info(LogTag::Deals, "Deal 17 added");
//! logger::debug(LogTag::Api, "Request payload: ..."); // Only with --debug-api
//! logger::verbose(LogTag::Db, "Row values: ...");     // Only with --verbose
//! ```
//!
//! ## Initialization
//!
//! Call once at startup, before any logging occurs:
//! ```rust
//! # use dealdesk::logger;
//! logger::init();
//! ```
//!
//! This scans the command line for --debug-<module> flags, configures the
//! filtering rules, and opens the daily log file.

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

// Re-export public types
pub use config::{
    apply_config_level, get_logger_config, init_from_args, set_logger_config, LoggerConfig,
};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system
///
/// Must be called once at application startup. Parses command-line
/// arguments for debug flags and opens the log file.
pub fn init() {
    config::init_from_args();
    file::init_file_logging();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (shown unless --quiet)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level
///
/// Only shown when --debug or --debug-<module> matches the tag:
/// ```rust
/// # use dealdesk::logger::{self, LogTag};
/// // Only shown with --debug-scorer
/// logger::debug(LogTag::Scorer, "Raw model response: {...}");
/// ```
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (only with --verbose)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Log with an arbitrary type column, bypassing level filtering
///
/// Used by the maintenance tools for START/SUCCESS style progress lines.
pub fn log(tag: LogTag, log_type: &str, message: &str) {
    format::format_and_log(tag, log_type, message);
}

/// Force flush pending log writes. Call during shutdown.
pub fn flush() {
    file::flush_file_logging();
}
