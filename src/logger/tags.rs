//! Log tags identifying the subsystem a message came from

/// Subsystem tag attached to every log line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Deals,
    Scorer,
    Api,
    Db,
    Config,
    Test,
    /// Escape hatch for one-off callers
    Other(String),
}

impl LogTag {
    /// Key used for --debug-<key> and --verbose-<key> command line flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Deals => "deals".to_string(),
            LogTag::Scorer => "scorer".to_string(),
            LogTag::Api => "api".to_string(),
            LogTag::Db => "db".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Test => "test".to_string(),
            LogTag::Other(name) => name.to_lowercase(),
        }
    }

    /// Uppercase tag text as it appears inside the log line brackets
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::System => "SYSTEM".to_string(),
            LogTag::Deals => "DEALS".to_string(),
            LogTag::Scorer => "SCORER".to_string(),
            LogTag::Api => "API".to_string(),
            LogTag::Db => "DB".to_string(),
            LogTag::Config => "CONFIG".to_string(),
            LogTag::Test => "TEST".to_string(),
            LogTag::Other(name) => name.to_uppercase(),
        }
    }
}
