/// Logger configuration and global access
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

use super::levels::LogLevel;
use super::tags::LogTag;

/// Runtime logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Messages above this level are dropped
    pub min_level: LogLevel,

    /// Tags whose debug output is enabled
    pub debug_tags: HashSet<LogTag>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
        }
    }
}

impl LoggerConfig {
    /// Build from a level name and a list of debug tag keys; unknown names are ignored
    pub fn from_names<S: AsRef<str>>(level: &str, debug_tags: &[S]) -> Self {
        let debug_tags: HashSet<LogTag> = debug_tags
            .iter()
            .filter_map(|key| LogTag::from_debug_key(key.as_ref()))
            .collect();
        let mut min_level = LogLevel::parse(level).unwrap_or(LogLevel::Info);
        // Per-tag debug output needs the threshold to let debug lines through
        if !debug_tags.is_empty() {
            min_level = LogLevel::Debug;
        }
        Self {
            min_level,
            debug_tags,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Get a copy of the current logger configuration
pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

/// Replace the logger configuration
pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Check whether debug output is enabled for a tag
pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = LOGGER_CONFIG.read();
    config.min_level >= LogLevel::Debug
        && (config.debug_tags.is_empty() || config.debug_tags.contains(tag))
}
