//! Log formatting and output
//!
//! Handles:
//! - Colorized console output with aligned tag and level columns
//! - Word-boundary text wrapping for long messages
//! - Dual output (console + file, ANSI codes stripped for the file)
//! - Broken pipe handling so piped commands exit cleanly

use super::file::write_to_file;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{ stdout, ErrorKind, Write };

/// Display configuration
const LOG_SHOW_DATE: bool = false;
const LOG_SHOW_TIME: bool = true;

/// Column widths for alignment
const TAG_WIDTH: usize = 10;
const LOG_TYPE_WIDTH: usize = 10;
const BRACKET_SPACE_WIDTH: usize = 3;
const TOTAL_PREFIX_WIDTH: usize = TAG_WIDTH + LOG_TYPE_WIDTH + BRACKET_SPACE_WIDTH * 2;

/// Maximum line length before wrapping
const MAX_LINE_LENGTH: usize = 145;

/// Format a log message and write it to console and file
pub fn format_and_log(tag: LogTag, log_type: &str, message: &str) {
    let now = Local::now();

    let mut prefix = String::new();
    if LOG_SHOW_DATE {
        prefix.push_str(&now.format("%Y-%m-%d ").to_string());
    }
    if LOG_SHOW_TIME {
        prefix.push_str(&now.format("%H:%M:%S ").to_string());
    }
    let prefix = if prefix.is_empty() { prefix } else { prefix.dimmed().to_string() };

    let base_line = format!("{}[{}] [{}] ", prefix, format_tag(&tag), format_log_type(log_type));

    let base_length = strip_ansi_codes(&base_line).chars().count().max(TOTAL_PREFIX_WIDTH);
    let available_space = if MAX_LINE_LENGTH > base_length {
        MAX_LINE_LENGTH - base_length
    } else {
        50
    };

    let chunks = wrap_text(message, available_space);

    print_stdout_safe(&format!("{}{}", base_line, chunks[0]));

    let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let tag_clean = tag.to_plain_string();
    write_to_file(&format!("{} [{}] [{}] {}", timestamp, tag_clean, log_type, chunks[0]));

    if chunks.len() > 1 {
        let continuation_prefix = " ".repeat(
            strip_ansi_codes(&prefix).chars().count() + TOTAL_PREFIX_WIDTH
        );
        for chunk in &chunks[1..] {
            print_stdout_safe(&format!("{}{}", continuation_prefix, chunk));
            write_to_file(&format!("{} [{}] [{}] {}", timestamp, tag_clean, log_type, chunk));
        }
    }
}

/// Paint the padded tag column
fn format_tag(tag: &LogTag) -> ColoredString {
    let padded = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => padded.bright_yellow().bold(),
        LogTag::Deals => padded.bright_green().bold(),
        LogTag::Scorer => padded.bright_cyan().bold(),
        LogTag::Api => padded.bright_purple().bold(),
        LogTag::Db => padded.bright_magenta().bold(),
        LogTag::Config => padded.bright_white().bold(),
        LogTag::Test => padded.bright_blue().bold(),
        LogTag::Other(_) => padded.white().bold(),
    }
}

/// Paint the padded level/type column
fn format_log_type(log_type: &str) -> ColoredString {
    let padded = format!("{:<width$}", log_type, width = LOG_TYPE_WIDTH);
    match log_type.to_uppercase().as_str() {
        "ERROR" => padded.bright_red().bold(),
        "WARNING" => padded.bright_yellow().bold(),
        _ => padded.white().bold(),
    }
}

/// Print to stdout but ignore broken pipe errors
fn print_stdout_safe(message: &str) {
    if let Err(e) = writeln!(stdout(), "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
    if let Err(e) = stdout().flush() {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}

/// Remove ANSI color codes from text
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::new();
    let mut in_escape = false;

    for ch in text.chars() {
        if ch == '\x1b' {
            in_escape = true;
        } else if in_escape && ch == 'm' {
            in_escape = false;
        } else if !in_escape {
            result.push(ch);
        }
    }
    result
}

/// Wrap text at word boundaries, respecting existing newlines
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for line in text.split('\n') {
        if line.chars().count() <= max_width {
            result.push(line.to_string());
            continue;
        }

        let mut current_line = String::new();
        let mut current_width = 0;

        for word in line.split_whitespace() {
            let word_width = word.chars().count();

            if word_width > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                    current_width = 0;
                }
                result.extend(break_long_word(word, max_width));
            } else if current_line.is_empty() {
                current_line = word.to_string();
                current_width = word_width;
            } else if current_width + word_width + 1 <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_width += word_width + 1;
            } else {
                result.push(std::mem::replace(&mut current_line, word.to_string()));
                current_width = word_width;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    if result.is_empty() {
        result.push(String::new());
    }

    result
}

/// Hard-break an overlong word at character boundaries
fn break_long_word(word: &str, max_width: usize) -> Vec<String> {
    let width = max_width.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in word.chars() {
        if count == width {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes() {
        let colored = "\x1b[1;32mGREEN\x1b[0m plain";
        assert_eq!(strip_ansi_codes(colored), "GREEN plain");
    }

    #[test]
    fn test_wrap_text_preserves_newlines() {
        let chunks = wrap_text("first\nsecond", 80);
        assert_eq!(chunks, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_wrap_text_breaks_at_words() {
        let chunks = wrap_text("alpha beta gamma", 11);
        assert_eq!(chunks, vec!["alpha beta".to_string(), "gamma".to_string()]);
    }

    #[test]
    fn test_break_long_word_respects_char_boundaries() {
        let chunks = break_long_word("ééééé", 2);
        assert_eq!(chunks, vec!["éé".to_string(), "éé".to_string(), "é".to_string()]);
    }
}
