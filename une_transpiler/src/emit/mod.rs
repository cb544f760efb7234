//! Output rendering: the code channel and the diagnostics channel.

pub mod json;
pub mod report;

pub use json::{command_json, write_output, Document, EmitError, CODE_VERSION};
pub use report::{run_report, unit_report};
