use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| { Mutex::new(env::args().collect()) });

/// Snapshot of the command line arguments captured at startup
pub fn cli_args() -> Vec<String> {
    if let Ok(args) = CMD_ARGS.lock() {
        args.clone()
    } else {
        Vec::new()
    }
}

/// Check if a literal flag is present on the command line
pub fn has_cli_flag(flag: &str) -> bool {
    if let Ok(args) = CMD_ARGS.lock() {
        args.iter().any(|a| a == flag)
    } else {
        false
    }
}
