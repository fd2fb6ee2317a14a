//! Tagged, leveled console logging
//!
//! ## Usage
//!
//! ```rust
//! use tickethub::logger::{self, LogTag};
//!
//! logger::error(LogTag::Webserver, "Failed to bind listener");
//! logger::warning(LogTag::Hub, "Evicting slow connection");
//! logger::info(LogTag::System, "Hub started");
//! logger::debug(LogTag::Connection, "Probe sent"); // Only if --debug-connection
//! ```
//!
//! ## Initialization
//!
//! Call once at startup with the configuration derived from the config file
//! and command-line flags:
//! ```rust
//! use tickethub::logger::{self, LoggerConfig};
//!
//! logger::init(LoggerConfig::from_names("info", &["hub"]));
//! ```

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system
///
/// Safe to call more than once; the last configuration wins.
pub fn init(config: LoggerConfig) {
    config::set_logger_config(config);
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (detailed diagnostics)
///
/// Debug logs are ONLY shown when debug output is enabled for the tag.
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Check whether debug output is enabled for a tag
///
/// Use to skip building expensive debug messages.
pub fn is_debug_enabled(tag: LogTag) -> bool {
    config::is_debug_enabled_for_tag(&tag)
}
