// RUNTIME PREFERENCES (User Experience)

use crate::logging::events::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;

/// Standard library include appended when a unit has no INCLUDE command or
/// asks for auto-include mode. Resolved like any other include URI.
pub const DEFAULT_STANDARD_LIBRARY: &str = "stdlib.une";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Tab stop width used for column accounting (user preference)
    pub tab_width: u32,

    /// Whether to log a per-kind token summary after tokenizing a unit
    pub log_token_summary: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            tab_width: env::var("UNE_TAB_WIDTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
            log_token_summary: env::var("UNE_LEXICAL_LOG_SUMMARY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverPreferences {
    /// Standard library URI for auto-include; `None` disables auto-include
    pub standard_library: Option<String>,

    /// Character set assumed for the root unit and all includes
    pub default_charset: String,
}

impl Default for ResolverPreferences {
    fn default() -> Self {
        Self {
            // An empty UNE_STDLIB disables the standard library entirely
            standard_library: match env::var("UNE_STDLIB") {
                Ok(v) if v.trim().is_empty() => None,
                Ok(v) => Some(v),
                Err(_) => Some(DEFAULT_STANDARD_LIBRARY.to_string()),
            },
            default_charset: env::var("UNE_CHARSET")
                .ok()
                .unwrap_or_else(|| "utf-8".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitPreferences {
    /// Whether the code channel renders pretty JSON (one-line when false)
    pub pretty: bool,

    /// Source lines shown above the offending line in report blocks
    pub report_context_lines: u32,
}

impl Default for EmitPreferences {
    fn default() -> Self {
        Self {
            pretty: env::var("UNE_EMIT_PRETTY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            report_context_lines: env::var("UNE_REPORT_CONTEXT_LINES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to emit structured JSON log lines (user preference)
    pub use_structured_logging: bool,

    /// Minimum level an event must reach to be logged
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("UNE_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("UNE_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "success" => Some(LogLevel::Success),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub lexical: LexicalPreferences,
    pub resolver: ResolverPreferences,
    pub emit: EmitPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Lexical
    pub const TAB_WIDTH: &str = "UNE_TAB_WIDTH";
    pub const LEXICAL_LOG_SUMMARY: &str = "UNE_LEXICAL_LOG_SUMMARY";

    // Resolver
    pub const STDLIB: &str = "UNE_STDLIB";
    pub const CHARSET: &str = "UNE_CHARSET";

    // Emit
    pub const EMIT_PRETTY: &str = "UNE_EMIT_PRETTY";
    pub const REPORT_CONTEXT_LINES: &str = "UNE_REPORT_CONTEXT_LINES";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "UNE_LOGGING_USE_STRUCTURED";
    pub const LOGGING_MIN_LEVEL: &str = "UNE_LOGGING_MIN_LEVEL";
}
