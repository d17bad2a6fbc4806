/// Central log filtering
///
/// Decides whether a message is displayed based on its level and tag,
/// then hands it to the format module for writing.

use super::config::{ get_logger_config, is_debug_enabled_for_tag, is_verbose_enabled_for_tag };
use super::levels::LogLevel;
use super::tags::LogTag;

/// Filtering rules:
/// 1. Errors are always shown
/// 2. Message level must not exceed the minimum level threshold
/// 3. Debug level requires --debug or --debug-<module> for that tag
/// 4. Verbose level requires --verbose or --verbose-<module> for that tag
/// 5. If enabled_tags is non-empty, the tag must be in the set
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    let config = get_logger_config();

    if level == LogLevel::Error {
        return true;
    }

    if level > config.min_level {
        return false;
    }

    if level == LogLevel::Debug {
        return is_debug_enabled_for_tag(tag);
    }

    if level == LogLevel::Verbose {
        return config.min_level == LogLevel::Verbose || is_verbose_enabled_for_tag(tag);
    }

    if !config.enabled_tags.is_empty() {
        let tag_name = tag.to_debug_key();
        if !config.enabled_tags.contains(&tag_name) {
            return false;
        }
    }

    true
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level.as_str(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_always_pass() {
        assert!(should_log(&LogTag::Api, LogLevel::Error));
    }

    #[test]
    fn test_debug_suppressed_by_default() {
        assert!(!should_log(&LogTag::Api, LogLevel::Debug));
    }
}
