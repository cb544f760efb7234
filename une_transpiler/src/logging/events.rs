//! Event system for transpiler logging

use super::codes::Code;
use crate::utils::Position;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Log severity levels, least important first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Success = 2,
    Warning = 3,
    Error = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub position: Option<Position>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    /// Create a new error event
    pub fn error(error_code: Code, message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            level: LogLevel::Error,
            code: error_code,
            message: message.to_string(),
            position: None,
            context: HashMap::new(),
        }
    }

    /// Create a new warning event (warnings may not have codes)
    pub fn warning(message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            level: LogLevel::Warning,
            code: Code::new("W000"), // Generic warning code
            message: message.to_string(),
            position: None,
            context: HashMap::new(),
        }
    }

    /// Create warning with specific code
    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            level: LogLevel::Warning,
            code: warning_code,
            message: message.to_string(),
            position: None,
            context: HashMap::new(),
        }
    }

    /// Create a new info event (info may not need codes)
    pub fn info(message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            level: LogLevel::Info,
            code: Code::new("I000"), // Generic info code
            message: message.to_string(),
            position: None,
            context: HashMap::new(),
        }
    }

    /// Create info with specific code
    pub fn info_with_code(info_code: Code, message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            level: LogLevel::Info,
            code: info_code,
            message: message.to_string(),
            position: None,
            context: HashMap::new(),
        }
    }

    /// Create a success event
    pub fn success(success_code: Code, message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            level: LogLevel::Success,
            code: success_code,
            message: message.to_string(),
            position: None,
            context: HashMap::new(),
        }
    }

    /// Create a debug event
    pub fn debug(message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            level: LogLevel::Debug,
            code: Code::new("D000"), // Generic debug code
            message: message.to_string(),
            position: None,
            context: HashMap::new(),
        }
    }

    /// Create debug with specific code
    pub fn debug_with_code(debug_code: Code, message: &str) -> Self {
        Self {
            timestamp: Local::now(),
            level: LogLevel::Debug,
            code: debug_code,
            message: message.to_string(),
            position: None,
            context: HashMap::new(),
        }
    }

    /// Add source position information
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Add context data
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    /// Add source unit context
    pub fn with_unit(self, uri: &str) -> Self {
        self.with_context("unit", uri)
    }

    /// Check if this is an error event
    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    /// Check if this is a warning event
    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    /// Check if this is a success event
    pub fn is_success(&self) -> bool {
        self.level == LogLevel::Success
    }

    /// Check if this is an info event
    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    /// Check if this is a debug event
    pub fn is_debug(&self) -> bool {
        self.level == LogLevel::Debug
    }

    /// Get severity from error code
    pub fn severity(&self) -> &'static str {
        super::codes::get_severity(self.code.as_str()).as_str()
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        super::codes::get_category(self.code.as_str())
    }

    /// Get error description
    pub fn description(&self) -> &'static str {
        super::codes::get_description(self.code.as_str())
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        super::codes::is_recoverable(self.code.as_str())
    }

    /// Format for display
    pub fn format(&self) -> String {
        let position_str = self
            .position
            .as_ref()
            .map(|p| format!(" at {}:{}", p.line, p.column))
            .unwrap_or_default();

        format!(
            "[{}] {} - {}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            position_str
        )
    }

    /// Format with detailed error information
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();

        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", self.severity()));

        if self.is_error() {
            output.push_str(&format!("\n  Recoverable: {}", self.is_recoverable()));
        }

        let description = self.description();
        if description != "Unknown error" {
            output.push_str(&format!("\n  Description: {}", description));
        }

        if !self.context.is_empty() {
            output.push_str("\n  Context:");
            for (key, value) in &self.context {
                output.push_str(&format!("\n    {}: {}", key, value));
            }
        }

        output
    }

    /// Format as JSON for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        // Add error-specific metadata
        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "recoverable": self.is_recoverable(),
                "description": self.description(),
            });
        }

        // Add position information
        if let Some(position) = &self.position {
            json["position"] = serde_json::json!({
                "line": position.line,
                "column": position.column,
            });
        }

        // Add context
        if !self.context.is_empty() {
            json["context"] = serde_json::Value::Object(
                self.context
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            );
        }

        serde_json::to_string(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::loading::SOURCE_NOT_FOUND, "Source not found");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "U010");
        assert_eq!(event.message, "Source not found");
        assert_eq!(event.category(), "Loading");
    }

    #[test]
    fn test_success_event_creation() {
        let event = LogEvent::success(codes::success::RUN_COMPLETE, "Run finished");

        assert!(event.is_success());
        assert_eq!(event.code.as_str(), "I001");
        assert_eq!(event.message, "Run finished");
    }

    #[test]
    fn test_event_with_context() {
        let event = LogEvent::error(codes::loading::SOURCE_TOO_LARGE, "Source too large")
            .with_context("size", "8388608")
            .with_context("limit", "4194304");

        assert_eq!(event.context.get("size"), Some(&"8388608".to_string()));
        assert_eq!(event.context.get("limit"), Some(&"4194304".to_string()));
    }

    #[test]
    fn test_event_formatting() {
        let event = LogEvent::error(codes::lexical::INVALID_CHARACTER, "Invalid character")
            .with_position(Position::new(10, 3, 7));
        let formatted = event.format();

        assert!(formatted.contains("[ERROR]"));
        assert!(formatted.contains("U020"));
        assert!(formatted.contains("Invalid character"));
        assert!(formatted.contains("at 3:7"));
    }

    #[test]
    fn test_event_metadata() {
        let event = LogEvent::error(codes::system::INTERNAL_ERROR, "Transpiler failure");

        assert_eq!(event.severity(), "Critical");
        assert_eq!(event.category(), "System");
        assert!(!event.is_recoverable());
    }

    #[test]
    fn test_warning_events() {
        let generic_warning = LogEvent::warning("Generic warning");
        assert!(generic_warning.is_warning());
        assert_eq!(generic_warning.code.as_str(), "W000");

        let specific_warning =
            LogEvent::warning_with_code(codes::semantic::UNUSED_ALIAS, "Alias never used");
        assert!(specific_warning.is_warning());
        assert_eq!(specific_warning.code.as_str(), "U066");
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::loading::UNSUPPORTED_CHARSET, "Bad charset")
            .with_context("charset", "utf-7");

        let json_result = event.format_json();
        assert!(json_result.is_ok());

        let json = json_result.unwrap();
        assert!(json.contains("\"level\":\"ERROR\""));
        assert!(json.contains("\"code\":\"U013\""));
        assert!(json.contains("\"message\":\"Bad charset\""));
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Success);
        assert!(LogLevel::Success < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }
}
