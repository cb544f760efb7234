//! Global logging module for the Une transpiler
//!
//! Provides thread-safe global logging with unit-aware context
//! propagation and a clean macro interface.

pub mod codes;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

use crate::config::runtime::LoggingPreferences;
use crate::utils::Position;

// Re-export main types
pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static UNIT_CONTEXT: RefCell<Option<String>> = RefCell::new(None);
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging system
pub fn init_global_logging(preferences: &LoggingPreferences) -> Result<(), String> {
    let logging_service = Arc::new(LoggingService::from_preferences(preferences));

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    // Validate error code system
    let test_codes = ["U001", "U010", "U020", "U040"];
    for &code in &test_codes {
        if codes::get_description(code) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_debug("Global logging system initialized");

    Ok(())
}

/// Initialize with custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

/// Check if global logging is initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

/// Get global logger (panics if not initialized)
pub fn get_global_logger() -> &'static LoggingService {
    GLOBAL_LOGGER
        .get()
        .expect("Global logger not initialized. Call init_global_logging() first.")
        .as_ref()
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// UNIT CONTEXT MANAGEMENT
// ============================================================================

/// Set source unit context for current thread
pub fn set_unit_context(uri: &str) {
    UNIT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(uri.to_string());
    });
}

/// Clear source unit context for current thread
pub fn clear_unit_context() {
    UNIT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Execute function with source unit context
pub fn with_unit_context<F, R>(uri: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_unit_context();
    set_unit_context(uri);
    let result = f();
    UNIT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

/// Get current source unit context (used by macros)
pub fn get_current_unit_context() -> Option<String> {
    UNIT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(
    code: Code,
    message: &str,
    position: Option<Position>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);

    if let Some(p) = position {
        event = event.with_position(p);
    }

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if let Some(unit) = get_current_unit_context() {
        event = event.with_unit(&unit);
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Log success with context (used by log_success! macro)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::success(code, message);

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if let Some(unit) = get_current_unit_context() {
        event = event.with_unit(&unit);
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Log info with context (used by log_info! macro)
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::info(message);

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if let Some(unit) = get_current_unit_context() {
        event = event.with_unit(&unit);
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

// ============================================================================
// SAFE FALLBACK LOGGING
// ============================================================================

/// Safe error logging (won't panic if uninitialized)
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        let event = LogEvent::error(code, message);
        logger.log_event(event);
    } else {
        eprintln!("[ERROR] {} - {}", code.as_str(), message);
    }
}
