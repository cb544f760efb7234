//! DRIVER command parser.
//!
//! `DRIVER <name> SCRIPT <script> [CONFIG <name> AS <type> [REQUIRED];...]`
//!
//! The config clause declares what a device may pass to this driver.
//! Items live in a set keyed over all three fields, so the same name may
//! legitimately appear with two types; only an exact re-declaration is a
//! duplicate.

use std::collections::BTreeSet;

use crate::diagnostics::Diagnostic;
use crate::grammar::{Command, ConfigItem, DataType, DriverCommand, Keyword};
use crate::syntax::{
    bounded_items, report_semantic, report_syntax, validated_name, SemanticError, SyntaxError,
};
use crate::tokens::Lexeme;

pub(crate) fn parse_driver(
    chunk: &[Lexeme],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Command> {
    let position = chunk.first()?.position;
    let clauses =
        crate::tokens::split_clauses(chunk, &[Keyword::Driver, Keyword::Script, Keyword::Config]);

    let name_clause = clauses.get(Keyword::Driver)?;
    let name_token = match name_clause.tokens.first() {
        Some(token) => token,
        None => {
            report_syntax(
                SyntaxError::missing_clause("name", "DRIVER", position),
                diagnostics,
            );
            return None;
        }
    };
    let name = validated_name(name_token, diagnostics)?;

    let script_clause = match clauses.get(Keyword::Script) {
        Some(clause) => clause,
        None => {
            report_syntax(
                SyntaxError::missing_clause("SCRIPT", "DRIVER", position),
                diagnostics,
            );
            return None;
        }
    };
    let script_token = match script_clause.tokens.first() {
        Some(token) => token,
        None => {
            report_syntax(
                SyntaxError::empty_clause("SCRIPT", script_clause.opener.position),
                diagnostics,
            );
            return None;
        }
    };
    if script_clause.tokens.len() > 1 {
        report_syntax(
            SyntaxError::WrongArity {
                expected: "exactly one script name",
                found: script_clause.tokens.len(),
                position: script_clause.opener.position,
            },
            diagnostics,
        );
    }
    let script = validated_name(script_token, diagnostics)?;

    let config = match clauses.get(Keyword::Config) {
        Some(clause) => parse_config_items(&clause.tokens, diagnostics),
        None => BTreeSet::new(),
    };

    Some(Command::Driver(DriverCommand {
        name,
        script,
        config,
        position,
    }))
}

/// Parse `<name> AS <type> [REQUIRED]` items. A bad item contributes
/// nothing; the clause keeps going.
fn parse_config_items(
    tokens: &[Lexeme],
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeSet<ConfigItem> {
    let mut config: BTreeSet<ConfigItem> = BTreeSet::new();

    for item in bounded_items("CONFIG", tokens, diagnostics) {
        let name = match validated_name(&item[0], diagnostics) {
            Some(name) => name,
            None => continue,
        };

        match item.get(1) {
            Some(token) if token.keyword() == Some(Keyword::As) => {}
            Some(token) => {
                report_syntax(
                    SyntaxError::unexpected_token("AS", &token.text, token.position),
                    diagnostics,
                );
                continue;
            }
            None => {
                report_syntax(
                    SyntaxError::unexpected_token("AS", "end of item", item[0].position),
                    diagnostics,
                );
                continue;
            }
        }

        let data_type = match item.get(2) {
            Some(token) => match DataType::parse(&token.text) {
                Some(data_type) => data_type,
                None => {
                    report_semantic(
                        SemanticError::invalid_data_type(&token.text, token.position),
                        diagnostics,
                    );
                    continue;
                }
            },
            None => {
                report_syntax(
                    SyntaxError::unexpected_token("a data type", "end of item", item[0].position),
                    diagnostics,
                );
                continue;
            }
        };

        let mut required = false;
        for extra in &item[3..] {
            if extra.keyword() == Some(Keyword::Required) && !required {
                required = true;
            } else {
                report_syntax(
                    SyntaxError::unexpected_token("REQUIRED", &extra.text, extra.position),
                    diagnostics,
                );
            }
        }

        let config_item = ConfigItem {
            name,
            data_type,
            required,
        };
        if !config.insert(config_item.clone()) {
            report_semantic(
                SemanticError::duplicate_config_item(&config_item.name, item[0].position),
                diagnostics,
            );
        }
    }

    config
}
