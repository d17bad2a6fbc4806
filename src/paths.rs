//! Centralized path resolution for DealDesk
//!
//! All file and directory paths are resolved through this module so the CLI
//! and the maintenance tools agree on where data lives, on every platform.
//!
//! ## Path Strategy
//!
//! The base directory follows platform standards:
//! - **macOS**: `~/Library/Application Support/DealDesk/`
//! - **Windows**: `%LOCALAPPDATA%\DealDesk\`
//! - **Linux**: `$XDG_DATA_HOME/DealDesk/` (fallback `~/.local/share/DealDesk/`)
//!
//! ## Directory Structure
//!
//! ```text
//! ~/DealDesk/
//! ├── data/
//! │ ├── config.json
//! │ └── deals.db
//! └── logs/
//! └── dealdesk_*.log
//! ```

use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

// =============================================================================
// BASE DIRECTORY RESOLUTION
// =============================================================================

/// Tracks whether initialization logging has been done
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Lazy-initialized base directory (thread-safe)
static BASE_DIRECTORY: Lazy<PathBuf> = Lazy::new(|| {
  let base_dir = resolve_base_directory();
  INITIALIZED.store(true, Ordering::SeqCst);
  base_dir
});

/// Resolves the base directory for all DealDesk data
///
/// Uses platform-specific application data locations:
/// - macOS: ~/Library/Application Support/DealDesk
/// - Windows: %LOCALAPPDATA%\DealDesk
/// - Linux: $XDG_DATA_HOME/DealDesk (fallback ~/.local/share/DealDesk)
fn resolve_base_directory() -> PathBuf {
  const APP_DIR: &str = "DealDesk";

  if let Some(dir) = dirs::data_local_dir() {
    return dir.join(APP_DIR);
  }

  if let Some(dir) = dirs::data_dir() {
    return dir.join(APP_DIR);
  }

  if let Some(home) = dirs::home_dir() {
    return home.join(APP_DIR);
  }

  PathBuf::from(APP_DIR)
}

// =============================================================================
// PRIMARY DIRECTORY ACCESSORS
// =============================================================================

/// Returns the base directory for all DealDesk data
pub fn get_base_directory() -> PathBuf {
  BASE_DIRECTORY.clone()
}

/// Returns the data directory path
///
/// Contains the deals database and the config file.
pub fn get_data_directory() -> PathBuf {
  BASE_DIRECTORY.join("data")
}

/// Returns the logs directory path
///
/// Contains daily log files.
pub fn get_logs_directory() -> PathBuf {
  BASE_DIRECTORY.join("logs")
}

// =============================================================================
// FILE PATHS
// =============================================================================

/// Returns the main configuration file path
pub fn get_config_path() -> PathBuf {
  get_data_directory().join("config.json")
}

/// Returns the deals database path
pub fn get_deals_db_path() -> PathBuf {
  get_data_directory().join("deals.db")
}

// =============================================================================
// DATABASE WAL/SHM HELPERS
// =============================================================================

/// Returns all related files for a SQLite database (main DB, SHM, WAL)
///
/// SQLite creates additional files for write-ahead logging and shared
/// memory. This helper returns all three for cleanup operations.
///
/// ## Returns
///
/// Vector containing paths to: `[db, db-shm, db-wal]`
pub fn get_db_with_wal_files(db_path: PathBuf) -> Vec<PathBuf> {
  vec![
    db_path.clone(),
    db_path.with_extension("db-shm"),
    db_path.with_extension("db-wal"),
  ]
}

// =============================================================================
// DIRECTORY CREATION
// =============================================================================

/// Ensures all required directories exist
///
/// Creates the base directory and all subdirectories needed for operation.
/// Call this early in application startup, before opening the database or
/// the log file.
///
/// ## Returns
///
/// - `Ok(())` if all directories exist or were created successfully
/// - `Err(String)` if any directory creation failed
pub fn ensure_all_directories() -> Result<(), String> {
  // Safe to log here, outside of lazy init
  if !is_initialized() {
    eprintln!("Base directory: {}", get_base_directory().display());
  }

  let dirs_to_create = vec![
    ("base", get_base_directory()),
    ("data", get_data_directory()),
    ("logs", get_logs_directory()),
  ];

  for (name, dir) in dirs_to_create {
    if !dir.exists() {
      std::fs::create_dir_all(&dir).map_err(|e| {
        format!(
          "Failed to create {} directory at {}: {}",
          name,
          dir.display(),
          e
        )
      })?;

      eprintln!("Created directory: {}", dir.display());
    }
  }

  Ok(())
}

// =============================================================================
// UTILITY FUNCTIONS
// =============================================================================

/// Returns a display string for the base directory (for user-facing messages)
pub fn get_base_directory_display() -> String {
  BASE_DIRECTORY.display().to_string()
}

/// Checks if the base directory has been initialized
pub fn is_initialized() -> bool {
  INITIALIZED.load(Ordering::SeqCst)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_base_directory_not_empty() {
    let base = get_base_directory();
    assert!(!base.as_os_str().is_empty());
  }

  #[test]
  fn test_data_directory_is_subdir() {
    let base = get_base_directory();
    let data = get_data_directory();
    assert!(data.starts_with(&base));
  }

  #[test]
  fn test_logs_directory_is_subdir() {
    let base = get_base_directory();
    let logs = get_logs_directory();
    assert!(logs.starts_with(&base));
  }

  #[test]
  fn test_deals_db_in_data_dir() {
    let data = get_data_directory();
    assert!(get_deals_db_path().starts_with(&data));
    assert_eq!(get_deals_db_path().file_name().unwrap(), "deals.db");
  }

  #[test]
  fn test_config_path_in_data_dir() {
    let data = get_data_directory();
    let config = get_config_path();
    assert!(config.starts_with(&data));
    assert_eq!(config.file_name().unwrap(), "config.json");
  }

  #[test]
  fn test_wal_file_list() {
    let files = get_db_with_wal_files(PathBuf::from("/tmp/deals.db"));
    assert_eq!(files.len(), 3);
    assert!(files[1].to_string_lossy().ends_with("deals.db-shm"));
    assert!(files[2].to_string_lossy().ends_with("deals.db-wal"));
  }
}
