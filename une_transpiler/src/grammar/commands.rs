//! Normalized command values produced by parsing
//!
//! These are plain data types with no parsing side effects; all
//! validation happens in the syntax module and every field here is
//! already normalized (names lower-cased where the grammar says so,
//! unit suffixes folded, macros applied).

use crate::tokens::Lexeme;
use crate::utils::Position;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// === DATA TYPES ===

/// Driver config item types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataType {
    Any,
    Number,
    Boolean,
    String,
}

impl DataType {
    /// Parse data type from source text, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Some(Self::Any),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
        }
    }
}

// === CONFIG ITEMS ===

/// One declared driver config item
///
/// Equality covers all three fields; duplicates are detected through
/// set collision when parsing a CONFIG clause.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConfigItem {
    pub name: String,
    pub data_type: DataType,
    pub required: bool,
}

// === ACTIONS ===

/// What one THEN item does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Invoke a rule or script by name
    RuleOrScript { name: String },
    /// Evaluate an expression for its side effects
    Expression { code: String },
    /// Copy another device's state into the target
    AssignDevice { target: String, source_device: String },
    /// Assign a basic data literal to the target
    AssignBasicData { target: String, value: Lexeme },
    /// Assign an expression result to the target
    AssignExpression { target: String, code: String },
}

/// One THEN action with its optional delay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    /// Delay before execution in milliseconds, 0 for immediate
    pub delay_ms: u64,
}

impl Action {
    pub fn immediate(kind: ActionKind) -> Self {
        Self { kind, delay_ms: 0 }
    }
}

// === COMMANDS ===

/// DEVICE command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCommand {
    pub name: String,
    pub driver_name: Option<String>,
    /// CONFIG properties forwarded to the driver, keyed lower-case
    pub driver_init: BTreeMap<String, Lexeme>,
    /// INIT properties applied to the device itself, keyed lower-case
    pub device_init: BTreeMap<String, Lexeme>,
    pub position: Position,
}

/// DRIVER command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverCommand {
    pub name: String,
    pub script: String,
    pub config: BTreeSet<ConfigItem>,
    pub position: Position,
}

/// RULE command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCommand {
    /// Declared name, if the rule had one
    pub name: Option<String>,
    /// Name the rule goes by when anonymous; mirrors a declared name
    pub generated_name: String,
    pub when: Vec<Lexeme>,
    pub if_clause: Option<Vec<Lexeme>>,
    pub then: Vec<Action>,
    pub position: Position,
}

impl RuleCommand {
    /// The name this rule is known by
    pub fn effective_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.generated_name)
    }
}

/// INCLUDE command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludeCommand {
    pub uris: Vec<String>,
    /// A literal "*" among the URIs requests auto-include mode
    pub auto: bool,
    pub use_table: Option<UseAsTable>,
    pub position: Position,
}

/// Parameterized-include table attached to an INCLUDE command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseAsTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<TableValue>>,
}

/// One cell of a parameterized-include row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableValue {
    pub text: String,
    pub is_string: bool,
}

/// USE command (global macro declarations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCommand {
    pub rewrites: Vec<RewriteRule>,
    pub position: Position,
}

/// One pattern/replacement pair from a USE command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub pattern: Vec<Lexeme>,
    pub replacement: Vec<Lexeme>,
}

/// All parsed command forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Device(DeviceCommand),
    Driver(DriverCommand),
    Rule(RuleCommand),
    Include(IncludeCommand),
    Use(UseCommand),
}

impl Command {
    /// The declared or generated name, if this command form has one
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Device(device) => Some(&device.name),
            Self::Driver(driver) => Some(&driver.name),
            Self::Rule(rule) => Some(rule.effective_name()),
            Self::Include(_) | Self::Use(_) => None,
        }
    }

    /// Category label for uniqueness checks and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Device(_) => "device",
            Self::Driver(_) => "driver",
            Self::Rule(_) => "rule",
            Self::Include(_) => "include",
            Self::Use(_) => "use",
        }
    }

    /// Include/Use exist only to drive resolution and never serialize
    pub fn is_resolution_only(&self) -> bool {
        matches!(self, Self::Include(_) | Self::Use(_))
    }

    pub fn position(&self) -> Position {
        match self {
            Self::Device(device) => device.position,
            Self::Driver(driver) => driver.position,
            Self::Rule(rule) => rule.position,
            Self::Include(include) => include.position,
            Self::Use(use_command) => use_command.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_parsing() {
        assert_eq!(DataType::parse("number"), Some(DataType::Number));
        assert_eq!(DataType::parse("NUMBER"), Some(DataType::Number));
        assert_eq!(DataType::parse("Any"), Some(DataType::Any));
        assert_eq!(DataType::parse("banana"), None);
    }

    #[test]
    fn test_config_item_set_collision() {
        let mut config = BTreeSet::new();
        let item = ConfigItem {
            name: "x".to_string(),
            data_type: DataType::Number,
            required: true,
        };

        assert!(config.insert(item.clone()));
        assert!(!config.insert(item.clone()));
        assert_eq!(config.len(), 1);

        // A different required flag is a distinct item
        assert!(config.insert(ConfigItem {
            required: false,
            ..item
        }));
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_rule_effective_name() {
        let named = RuleCommand {
            name: Some("night_mode".to_string()),
            generated_name: "rule-1".to_string(),
            when: vec![],
            if_clause: None,
            then: vec![],
            position: Position::start(),
        };
        assert_eq!(named.effective_name(), "night_mode");

        let anonymous = RuleCommand {
            name: None,
            ..named
        };
        assert_eq!(anonymous.effective_name(), "rule-1");
    }

    #[test]
    fn test_command_categories() {
        let include = Command::Include(IncludeCommand {
            uris: vec!["lib.une".to_string()],
            auto: false,
            use_table: None,
            position: Position::start(),
        });

        assert_eq!(include.category(), "include");
        assert!(include.is_resolution_only());
        assert_eq!(include.name(), None);
    }
}
