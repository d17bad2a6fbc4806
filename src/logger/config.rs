/// Runtime logger configuration
///
/// Built once at startup from command line flags:
/// - --debug            enable debug output for every tag
/// - --debug-<module>   enable debug output for one tag (e.g. --debug-scorer)
/// - --verbose          show verbose output for every tag
/// - --verbose-<module> verbose output for one tag
/// - --quiet            only warnings and errors
///
/// The config file log level applies only when no explicit flag was given.

use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level that gets displayed
    pub min_level: LogLevel,
    /// Debug output enabled for every tag
    pub debug_all: bool,
    /// Tags with debug output enabled via --debug-<module>
    pub debug_tags: HashSet<String>,
    /// Tags with verbose output enabled via --verbose-<module>
    pub verbose_tags: HashSet<String>,
    /// When non-empty, only these tags are displayed
    pub enabled_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_all: false,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> = Lazy::new(|| {
    RwLock::new(LoggerConfig::default())
});

pub fn get_logger_config() -> LoggerConfig {
    if let Ok(config) = LOGGER_CONFIG.read() {
        config.clone()
    } else {
        LoggerConfig::default()
    }
}

pub fn set_logger_config(config: LoggerConfig) {
    if let Ok(mut current) = LOGGER_CONFIG.write() {
        *current = config;
    }
}

/// Scan the command line and build the logger configuration
pub fn init_from_args() {
    let args = crate::global::cli_args();
    let mut config = LoggerConfig::default();

    for arg in &args {
        if arg == "--debug" {
            config.debug_all = true;
        } else if arg == "--verbose" {
            config.min_level = LogLevel::Verbose;
        } else if arg == "--quiet" {
            config.min_level = LogLevel::Warning;
        } else if let Some(module) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(module.to_lowercase());
        } else if let Some(module) = arg.strip_prefix("--verbose-") {
            config.verbose_tags.insert(module.to_lowercase());
        }
    }

    // Debug flags imply raising the threshold so debug lines pass rule 2
    if config.debug_all || !config.debug_tags.is_empty() {
        if config.min_level < LogLevel::Debug {
            config.min_level = LogLevel::Debug;
        }
    }
    if !config.verbose_tags.is_empty() {
        config.min_level = LogLevel::Verbose;
    }

    set_logger_config(config);
}

/// Apply the log level from the config file. Explicit command line flags win.
pub fn apply_config_level(level_str: &str) {
    let args = crate::global::cli_args();
    let has_explicit_flag = args.iter().any(|a| {
        a == "--debug" ||
            a == "--verbose" ||
            a == "--quiet" ||
            a.starts_with("--debug-") ||
            a.starts_with("--verbose-")
    });
    if has_explicit_flag {
        return;
    }

    if let Some(level) = LogLevel::from_str(level_str) {
        if let Ok(mut config) = LOGGER_CONFIG.write() {
            config.min_level = level;
        }
    }
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = get_logger_config();
    config.debug_all || config.debug_tags.contains(&tag.to_debug_key())
}

pub fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    let config = get_logger_config();
    config.verbose_tags.contains(&tag.to_debug_key())
}
