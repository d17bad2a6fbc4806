/// File sink for log output
///
/// Appends every displayed log line (ANSI codes stripped) to a daily
/// log file under the logs directory. All writes are best-effort so a
/// full disk or missing directory never takes the process down.

use chrono::Local;
use once_cell::sync::Lazy;
use std::fs::{ File, OpenOptions };
use std::io::Write;
use std::sync::Mutex;

static LOG_FILE: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

/// Open today's log file for appending. Called once from logger::init().
pub fn init_file_logging() {
    let logs_dir = crate::paths::get_logs_directory();
    if !logs_dir.exists() {
        let _ = std::fs::create_dir_all(&logs_dir);
    }

    let filename = format!("dealdesk_{}.log", Local::now().format("%Y-%m-%d"));
    let path = logs_dir.join(filename);

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            if let Ok(mut guard) = LOG_FILE.lock() {
                *guard = Some(file);
            }
        }
        Err(e) => {
            eprintln!("⚠️ Could not open log file {}: {}", path.display(), e);
        }
    }
}

pub fn write_to_file(line: &str) {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(file) = guard.as_mut() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

pub fn flush_file_logging() {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(file) = guard.as_mut() {
            let _ = file.flush();
        }
    }
}
