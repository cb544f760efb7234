//! Grammar definitions for the Une DSL

pub mod commands;
pub mod language;

// Re-export command types
pub use commands::{
    Action, ActionKind, Command, ConfigItem, DataType, DeviceCommand, DriverCommand,
    IncludeCommand, RewriteRule, RuleCommand, TableValue, UseAsTable, UseCommand,
};

// Re-export language rules
pub use language::{is_reserved_word, Keyword};
