/// Log tags identify the subsystem a message comes from

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Hub,
    Connection,
    Webserver,
}

impl LogTag {
    /// Key used by `--debug-<key>` flags and `logging.debug_tags`
    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Hub => "hub",
            LogTag::Connection => "connection",
            LogTag::Webserver => "webserver",
        }
    }

    /// Uppercase label without color codes (file/plain output)
    pub fn to_plain_string(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Hub => "HUB",
            LogTag::Connection => "CONN",
            LogTag::Webserver => "WEBSERVER",
        }
    }

    /// Parse a debug key back into a tag
    pub fn from_debug_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "system" => Some(LogTag::System),
            "config" => Some(LogTag::Config),
            "hub" => Some(LogTag::Hub),
            "connection" | "conn" => Some(LogTag::Connection),
            "webserver" | "web" => Some(LogTag::Webserver),
            _ => None,
        }
    }
}
