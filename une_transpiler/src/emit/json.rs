//! Code-channel serialization.
//!
//! Renders the surviving command list as one JSON document. Only
//! error-free units contribute commands; Include and Use render to
//! nothing because the resolver already consumed them. Literal values
//! keep their natural JSON types so the runtime never re-parses source
//! text for numbers and booleans.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::grammar::{Action, ActionKind, Command, DeviceCommand, DriverCommand, RuleCommand};
use crate::logging::{codes, Code};
use crate::resolve::TranspilationUnit;
use crate::tokens::{join_source, Lexeme, TokenKind};

/// Command-list format version understood by the runtime
pub const CODE_VERSION: &str = "1.0";

// ===== Errors =====

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not write output to '{path}': {detail}")]
    OutputWrite { path: String, detail: String },
}

impl EmitError {
    pub fn output_write(path: &str, error: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.to_string(),
            detail: error.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Json(_) => codes::emit::JSON_ENCODING_FAILED,
            Self::OutputWrite { .. } => codes::emit::OUTPUT_WRITE_FAILED,
        }
    }
}

// ===== Document =====

/// The complete code-channel output of one run
#[derive(Debug, Serialize)]
pub struct Document {
    pub transpiler: String,

    #[serde(rename = "code-version")]
    pub code_version: String,

    /// Random id distinguishing this run's output
    pub uid: String,

    /// Local generation time, ISO-8601
    pub generated: String,

    pub commands: Vec<Value>,
}

impl Document {
    /// Collect every error-free unit's command fragments into one
    /// document. Units with any diagnostic contribute nothing.
    pub fn assemble(units: &[TranspilationUnit]) -> Self {
        let mut commands = Vec::new();
        for unit in units {
            if unit.has_errors() {
                crate::log_debug!("Unit excluded from code output",
                    "uri" => unit.uri(),
                    "diagnostics" => unit.diagnostic_count()
                );
                continue;
            }
            for command in unit.commands() {
                if let Some(fragment) = command_json(command) {
                    commands.push(fragment);
                }
            }
        }

        Self {
            transpiler: format!(
                "{} ver.{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
            code_version: CODE_VERSION.to_string(),
            uid: uuid::Uuid::new_v4().to_string(),
            generated: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            commands,
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, EmitError> {
        let rendered = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(rendered)
    }
}

/// Write the rendered code channel to a file, or to stdout when no path
/// is given.
pub fn write_output(code: &str, path: Option<&str>) -> Result<(), EmitError> {
    match path {
        Some(path) => {
            std::fs::write(path, code).map_err(|error| EmitError::output_write(path, error))?
        }
        None => println!("{code}"),
    }
    crate::log_success!(codes::success::EMIT_COMPLETE, "Code channel written",
        "target" => path.unwrap_or("<stdout>"),
        "bytes" => code.len()
    );
    Ok(())
}

// ===== Command Fragments =====

/// One command's canonical JSON fragment. Resolution-only commands
/// render to nothing.
pub fn command_json(command: &Command) -> Option<Value> {
    match command {
        Command::Device(device) => Some(device_json(device)),
        Command::Driver(driver) => Some(driver_json(driver)),
        Command::Rule(rule) => Some(rule_json(rule)),
        Command::Include(_) | Command::Use(_) => None,
    }
}

fn device_json(device: &DeviceCommand) -> Value {
    let mut fragment = json!({
        "type": "device",
        "name": device.name,
    });
    if let Some(driver) = &device.driver_name {
        fragment["driver"] = json!(driver);
    }
    if !device.driver_init.is_empty() {
        fragment["driver-init"] = property_map(&device.driver_init);
    }
    if !device.device_init.is_empty() {
        fragment["init"] = property_map(&device.device_init);
    }
    fragment
}

fn driver_json(driver: &DriverCommand) -> Value {
    let mut fragment = json!({
        "type": "driver",
        "name": driver.name,
        "script": driver.script,
    });
    if !driver.config.is_empty() {
        let items: Vec<Value> = driver
            .config
            .iter()
            .map(|item| {
                json!({
                    "name": item.name,
                    "type": item.data_type.as_str(),
                    "required": item.required,
                })
            })
            .collect();
        fragment["config"] = Value::Array(items);
    }
    fragment
}

fn rule_json(rule: &RuleCommand) -> Value {
    let mut fragment = json!({
        "type": "rule",
        "name": rule.effective_name(),
        "when": join_source(&rule.when),
    });
    if let Some(condition) = &rule.if_clause {
        fragment["if"] = json!(join_source(condition));
    }
    fragment["then"] = Value::Array(rule.then.iter().map(action_json).collect());
    fragment
}

fn action_json(action: &Action) -> Value {
    let mut fragment = match &action.kind {
        ActionKind::RuleOrScript { name } => json!({ "run": name }),
        ActionKind::Expression { code } => json!({ "expression": code }),
        ActionKind::AssignDevice {
            target,
            source_device,
        } => json!({
            "assign-device": { "target": target, "source": source_device }
        }),
        ActionKind::AssignBasicData { target, value } => json!({
            "assign-data": { "target": target, "value": literal_value(value) }
        }),
        ActionKind::AssignExpression { target, code } => json!({
            "assign-expression": { "target": target, "code": code }
        }),
    };
    if action.delay_ms > 0 {
        fragment["after"] = json!(action.delay_ms);
    }
    fragment
}

// ===== Literal Values =====

fn property_map(properties: &BTreeMap<String, Lexeme>) -> Value {
    Value::Object(
        properties
            .iter()
            .map(|(key, value)| (key.clone(), literal_value(value)))
            .collect(),
    )
}

/// A literal lexeme as its natural JSON type. Anything that is not a
/// recognizable number, boolean or string keeps its source text.
fn literal_value(token: &Lexeme) -> Value {
    match token.kind {
        TokenKind::Number => number_value(&token.text),
        TokenKind::Boolean => json!(token.text.eq_ignore_ascii_case("true")),
        TokenKind::String => json!(token.string_content()),
        TokenKind::InlineCode => json!(inline_content(token)),
        _ => json!(token.text),
    }
}

fn number_value(text: &str) -> Value {
    if let Ok(whole) = text.parse::<i64>() {
        return json!(whole);
    }
    match text.parse::<f64>() {
        Ok(number) => json!(number),
        Err(_) => json!(text),
    }
}

fn inline_content(token: &Lexeme) -> &str {
    token
        .text
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .map(str::trim)
        .unwrap_or(&token.text)
}
