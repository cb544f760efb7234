//! Diagnostics-channel rendering.
//!
//! One block per unit: a header with the unit's command count, then
//! either `0 errors found` or every Diagnostic rendered with its
//! offending source line and a caret under the column.

use crate::config::constants::compile_time::emit::MAX_REPORT_DIAGNOSTICS;
use crate::config::runtime::EmitPreferences;
use crate::resolve::TranspilationUnit;
use crate::utils::SourceMap;

/// Render the per-file report for one unit
pub fn unit_report(unit: &TranspilationUnit, preferences: &EmitPreferences) -> String {
    let mut out = String::new();

    let command_count = unit
        .commands()
        .iter()
        .filter(|command| !command.is_resolution_only())
        .count();
    out.push_str(&format!(
        "{}: {} {}\n",
        unit.uri(),
        command_count,
        plural(command_count, "command", "commands")
    ));

    let total = unit.diagnostic_count();
    if total == 0 {
        out.push_str("0 errors found\n");
        return out;
    }
    out.push_str(&format!(
        "{} {} found\n",
        total,
        plural(total, "error", "errors")
    ));

    // SECURITY: cap the rendered blocks; the count above stays exact
    if unit.is_terminal() {
        // A unit that never loaded has no source to echo
        for diagnostic in unit.diagnostics().take(MAX_REPORT_DIAGNOSTICS) {
            out.push_str(&format!(
                "{} at {}:{}\n",
                diagnostic.message, diagnostic.line, diagnostic.column
            ));
        }
    } else {
        let map = SourceMap::new(unit.source().raw_code.clone());
        for diagnostic in unit.diagnostics().take(MAX_REPORT_DIAGNOSTICS) {
            out.push_str(&map.format_error_with_context(
                &diagnostic.message,
                diagnostic.line,
                diagnostic.column,
                preferences.report_context_lines,
            ));
        }
    }
    if total > MAX_REPORT_DIAGNOSTICS {
        out.push_str(&format!(
            "... and {} more\n",
            total - MAX_REPORT_DIAGNOSTICS
        ));
    }

    out
}

/// Render the full diagnostics report for a run, one block per unit
/// in load order
pub fn run_report(units: &[TranspilationUnit], preferences: &EmitPreferences) -> String {
    units
        .iter()
        .map(|unit| unit_report(unit, preferences))
        .collect::<Vec<_>>()
        .join("\n")
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}
