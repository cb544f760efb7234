//! Include resolution and the two-phase parse driver.
//!
//! Loading is depth-first: a unit is loaded, its INCLUDE/USE chunks are
//! parsed (phase 1), then each include target is resolved, expanded,
//! and recursed into. A seen set keyed by resolved URI plus parameter
//! bindings guarantees no source is loaded twice in one run. Once every
//! unit is in, the macro table is frozen and phase 2 parses the
//! remaining chunks of every unit. Finally command names are checked
//! for uniqueness across the whole run, one namespace per category.

mod source_unit;
mod unit;

pub use source_unit::SourceUnit;
pub use unit::TranspilationUnit;

use std::collections::HashSet;

use crate::config::constants::compile_time::resolution::{MAX_INCLUDE_DEPTH, MAX_UNITS_PER_RUN};
use crate::config::runtime::RuntimeConfig;
use crate::diagnostics::Diagnostic;
use crate::eval::Evaluator;
use crate::grammar::{RewriteRule, TableValue, UseAsTable};
use crate::loader::SourceLoader;
use crate::logging::{codes, with_unit_context};
use crate::rewrite::MacroContext;
use crate::syntax::{report_semantic, ParseContext, SemanticError};
use crate::tokens::{Lexeme, TokenKind};
use crate::utils::Position;

pub struct Resolver<'a> {
    loader: &'a dyn SourceLoader,
    evaluator: &'a dyn Evaluator,
    config: &'a RuntimeConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(
        loader: &'a dyn SourceLoader,
        evaluator: &'a dyn Evaluator,
        config: &'a RuntimeConfig,
    ) -> Self {
        Self {
            loader,
            evaluator,
            config,
        }
    }

    /// Load the root URI and every transitive include, then parse the
    /// full set. The returned units are in load order, root first.
    pub fn run(&self, root_uri: &str) -> Vec<TranspilationUnit> {
        let mut macros = MacroContext::new();
        let mut units = Vec::new();
        let mut seen = HashSet::new();

        let root = self.loader.resolve("", root_uri);
        self.load_unit(
            &root,
            MacroContext::new(),
            String::new(),
            0,
            None,
            &mut units,
            &mut seen,
            &mut macros,
        );

        // Phase barrier: the macro table is complete before any phase 2.
        crate::log_success!(codes::success::PHASE_ONE_COMPLETE, "Macro table frozen",
            "rules" => macros.len(),
            "units" => units.len()
        );
        let mut context = ParseContext::new(self.evaluator);
        for unit in units.iter_mut() {
            let uri = unit.uri().to_string();
            with_unit_context(&uri, || unit.phase_two(&macros, &mut context));
        }
        let commands: usize = units.iter().map(|unit| unit.commands().len()).sum();
        crate::log_success!(codes::success::PHASE_TWO_COMPLETE, "Command parsing complete",
            "units" => units.len(),
            "commands" => commands
        );

        self.enforce_unique_names(&mut units);
        units
    }

    #[allow(clippy::too_many_arguments)]
    fn load_unit(
        &self,
        uri: &str,
        bindings: MacroContext,
        binding_key: String,
        depth: usize,
        requested_at: Option<(usize, Position)>,
        units: &mut Vec<TranspilationUnit>,
        seen: &mut HashSet<String>,
        macros: &mut MacroContext,
    ) {
        let key = if binding_key.is_empty() {
            uri.to_string()
        } else {
            format!("{uri}?{binding_key}")
        };
        if seen.contains(&key) {
            crate::log_debug!("Include skipped, already loaded", "uri" => uri);
            return;
        }

        // SECURITY: bound recursion depth and total unit count.
        if depth > MAX_INCLUDE_DEPTH {
            crate::log_error!(codes::resolution::INCLUDE_DEPTH_EXCEEDED, "Include depth exceeded",
                "uri" => uri,
                "limit" => MAX_INCLUDE_DEPTH
            );
            if let Some((parent, position)) = requested_at {
                units[parent].push_external(Diagnostic::at(
                    format!("Include depth limit of {MAX_INCLUDE_DEPTH} exceeded."),
                    position,
                ));
            }
            return;
        }
        if units.len() >= MAX_UNITS_PER_RUN {
            crate::log_error!(codes::resolution::TOO_MANY_UNITS, "Unit limit exceeded",
                "uri" => uri,
                "limit" => MAX_UNITS_PER_RUN
            );
            if let Some((parent, position)) = requested_at {
                units[parent].push_external(Diagnostic::at(
                    format!("Unit limit of {MAX_UNITS_PER_RUN} sources exceeded."),
                    position,
                ));
            }
            return;
        }
        seen.insert(key.clone());

        let source = SourceUnit::load(self.loader, uri, &self.config.resolver.default_charset);
        let mut unit = TranspilationUnit::new(source, key, bindings);
        let includes = with_unit_context(uri, || {
            unit.tokenize(&self.config.lexical);
            unit.phase_one(macros)
        });
        let terminal = unit.is_terminal();
        units.push(unit);
        let unit_index = units.len() - 1;

        for include in &includes {
            for target in &include.uris {
                let resolved = self.loader.resolve(uri, target);
                let expanded = match self.loader.expand(&resolved) {
                    Ok(expanded) => expanded,
                    Err(error) => {
                        crate::log_error!(error.error_code(), "Include expansion failed",
                            "pattern" => resolved
                        );
                        units[unit_index].push_external(Diagnostic::at(
                            error.to_string(),
                            include.position,
                        ));
                        continue;
                    }
                };
                if expanded.is_empty() {
                    crate::log_warning!("Include pattern matched no files",
                        "pattern" => resolved
                    );
                }
                for concrete in expanded {
                    match &include.use_table {
                        Some(table) => self.load_rows(
                            &concrete,
                            table,
                            include.position,
                            depth,
                            unit_index,
                            units,
                            seen,
                            macros,
                        ),
                        None => self.load_unit(
                            &concrete,
                            MacroContext::new(),
                            String::new(),
                            depth + 1,
                            Some((unit_index, include.position)),
                            units,
                            seen,
                            macros,
                        ),
                    }
                }
            }
        }

        // Zero includes or an auto-mode include pulls in the standard
        // library, resolved like any other include.
        let auto = !terminal && (includes.is_empty() || includes.iter().any(|include| include.auto));
        if auto {
            if let Some(stdlib) = &self.config.resolver.standard_library {
                let resolved = self.loader.resolve(uri, stdlib);
                self.load_unit(
                    &resolved,
                    MacroContext::new(),
                    String::new(),
                    depth + 1,
                    Some((unit_index, Position::start())),
                    units,
                    seen,
                    macros,
                );
            }
        }
    }

    /// One parameterized inclusion per table row: each row becomes a
    /// fresh unit whose bindings rewrite the column names to that row's
    /// values.
    #[allow(clippy::too_many_arguments)]
    fn load_rows(
        &self,
        uri: &str,
        table: &UseAsTable,
        position: Position,
        depth: usize,
        parent: usize,
        units: &mut Vec<TranspilationUnit>,
        seen: &mut HashSet<String>,
        macros: &mut MacroContext,
    ) {
        for row in &table.rows {
            let mut bindings = MacroContext::new();
            let mut binding_key = String::new();
            let mut scratch = Vec::new();
            for (column, value) in table.columns.iter().zip(row) {
                bindings.register(&binding_rewrite(column, value, position), position, &mut scratch);
                binding_key.push_str(&format!("{column}={};", value.text));
            }
            for diagnostic in scratch {
                units[parent].push_external(diagnostic);
            }
            self.load_unit(
                uri,
                bindings,
                binding_key,
                depth + 1,
                Some((parent, position)),
                units,
                seen,
                macros,
            );
        }
    }

    /// Command names share one namespace per category across the whole
    /// run, compared case-insensitively. The later unit takes the blame
    /// for a collision.
    fn enforce_unique_names(&self, units: &mut [TranspilationUnit]) {
        let mut seen: HashSet<(&'static str, String)> = HashSet::new();
        let mut injections: Vec<(usize, Diagnostic)> = Vec::new();

        for (index, unit) in units.iter().enumerate() {
            for command in unit.commands() {
                let name = match command.name() {
                    Some(name) => name,
                    None => continue,
                };
                if !seen.insert((command.category(), name.to_lowercase())) {
                    let mut scratch = Vec::new();
                    report_semantic(
                        SemanticError::duplicate_name(command.category(), name, command.position()),
                        &mut scratch,
                    );
                    injections.extend(scratch.into_iter().map(|diagnostic| (index, diagnostic)));
                }
            }
        }

        for (index, diagnostic) in injections {
            units[index].push_external(diagnostic);
        }
    }
}

fn binding_rewrite(column: &str, value: &TableValue, position: Position) -> RewriteRule {
    let replacement = if value.is_string {
        Lexeme::new(TokenKind::String, format!("\"{}\"", value.text), position)
    } else {
        Lexeme::classified(value.text.clone(), position)
    };
    RewriteRule {
        pattern: vec![Lexeme::classified(column.to_string(), position)],
        replacement: vec![replacement],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::ResolverPreferences;
    use crate::eval::LiteralEvaluator;
    use crate::grammar::Command;
    use crate::loader::MemoryLoader;

    fn config_without_stdlib() -> RuntimeConfig {
        RuntimeConfig {
            resolver: ResolverPreferences {
                standard_library: None,
                default_charset: "utf-8".to_string(),
            },
            ..RuntimeConfig::default()
        }
    }

    fn run(loader: &MemoryLoader, config: &RuntimeConfig, root: &str) -> Vec<TranspilationUnit> {
        let evaluator = LiteralEvaluator;
        Resolver::new(loader, &evaluator, config).run(root)
    }

    #[test]
    fn test_includes_load_depth_first() {
        let loader = MemoryLoader::new()
            .with_source("main.une", "INCLUDE \"lib/a.une\"\n\nDEVICE lamp")
            .with_source("lib/a.une", "INCLUDE \"b.une\"\n\nDRIVER x SCRIPT x")
            .with_source("lib/b.une", "DRIVER y SCRIPT y");
        let config = config_without_stdlib();
        let units = run(&loader, &config, "main.une");

        let uris: Vec<&str> = units.iter().map(|unit| unit.uri()).collect();
        assert_eq!(uris, vec!["main.une", "lib/a.une", "lib/b.une"]);
        assert!(units.iter().all(|unit| !unit.has_errors()));
    }

    #[test]
    fn test_same_uri_never_loads_twice() {
        let loader = MemoryLoader::new()
            .with_source("main.une", "INCLUDE \"a.une\" \"b.une\"\n\nDEVICE lamp")
            .with_source("a.une", "INCLUDE \"common.une\"\n\nDRIVER a SCRIPT a")
            .with_source("b.une", "INCLUDE \"common.une\"\n\nDRIVER b SCRIPT b")
            .with_source("common.une", "DRIVER c SCRIPT c");
        let config = config_without_stdlib();
        let units = run(&loader, &config, "main.une");

        assert_eq!(units.len(), 4);
        let commons = units.iter().filter(|unit| unit.uri() == "common.une").count();
        assert_eq!(commons, 1);
    }

    #[test]
    fn test_macro_from_included_file_applies_to_root() {
        let loader = MemoryLoader::new()
            .with_source(
                "main.une",
                "INCLUDE \"aliases.une\"\n\nRULE r WHEN temp EQUALS 30 THEN fan",
            )
            .with_source("aliases.une", "USE EQUALS AS \"==\"");
        let config = config_without_stdlib();
        let units = run(&loader, &config, "main.une");

        let rule = units[0]
            .commands()
            .iter()
            .find_map(|command| match command {
                Command::Rule(rule) => Some(rule),
                _ => None,
            })
            .unwrap();
        assert_eq!(crate::tokens::join_source(&rule.when), "temp == 30");
    }

    #[test]
    fn test_zero_includes_pulls_standard_library() {
        let loader = MemoryLoader::new()
            .with_source("main.une", "DEVICE lamp")
            .with_source("stdlib.une", "DRIVER gpio SCRIPT gpio");
        let config = RuntimeConfig {
            resolver: ResolverPreferences {
                standard_library: Some("stdlib.une".to_string()),
                default_charset: "utf-8".to_string(),
            },
            ..RuntimeConfig::default()
        };
        let units = run(&loader, &config, "main.une");

        assert_eq!(units.len(), 2);
        assert_eq!(units[1].uri(), "stdlib.une");
    }

    #[test]
    fn test_auto_include_star_pulls_standard_library() {
        let loader = MemoryLoader::new()
            .with_source("main.une", "INCLUDE \"*\"\n\nDEVICE lamp")
            .with_source("stdlib.une", "DRIVER gpio SCRIPT gpio");
        let config = RuntimeConfig {
            resolver: ResolverPreferences {
                standard_library: Some("stdlib.une".to_string()),
                default_charset: "utf-8".to_string(),
            },
            ..RuntimeConfig::default()
        };
        let units = run(&loader, &config, "main.une");

        assert_eq!(units.len(), 2);
        assert_eq!(units[1].uri(), "stdlib.une");
    }

    #[test]
    fn test_explicit_includes_suppress_standard_library() {
        // Both units carry an explicit include, so neither goes auto.
        // The mutual include lands on the seen set instead of looping.
        let loader = MemoryLoader::new()
            .with_source("main.une", "INCLUDE \"lib.une\"\n\nDEVICE lamp")
            .with_source("lib.une", "INCLUDE \"main.une\"\n\nDRIVER gpio SCRIPT gpio")
            .with_source("stdlib.une", "DRIVER std SCRIPT std");
        let config = RuntimeConfig {
            resolver: ResolverPreferences {
                standard_library: Some("stdlib.une".to_string()),
                default_charset: "utf-8".to_string(),
            },
            ..RuntimeConfig::default()
        };
        let units = run(&loader, &config, "main.une");

        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|unit| unit.uri() != "stdlib.une"));
        assert!(units.iter().all(|unit| !unit.has_errors()));
    }

    #[test]
    fn test_missing_include_is_terminal_not_fatal() {
        let loader = MemoryLoader::new()
            .with_source("main.une", "INCLUDE \"ghost.une\"\n\nDEVICE lamp");
        let config = config_without_stdlib();
        let units = run(&loader, &config, "main.une");

        assert_eq!(units.len(), 2);
        assert!(!units[0].has_errors());
        assert!(units[1].is_terminal());
        assert!(units[1].has_errors());
        // The root still parsed its device despite the broken include.
        assert!(units[0]
            .commands()
            .iter()
            .any(|command| command.category() == "device"));
    }

    #[test]
    fn test_parameterized_include_loads_once_per_row() {
        let loader = MemoryLoader::new()
            .with_source(
                "main.une",
                "INCLUDE \"motor.une\" USE _name, _pin AS m1, 1; m2, 2",
            )
            .with_source("motor.une", "DEVICE _name DRIVER gpio CONFIG pin = _pin");
        let config = config_without_stdlib();
        let units = run(&loader, &config, "main.une");

        assert_eq!(units.len(), 3);
        let devices: Vec<(String, String)> = units
            .iter()
            .flat_map(|unit| unit.commands())
            .filter_map(|command| match command {
                Command::Device(device) => Some((
                    device.name.clone(),
                    device.driver_init.get("pin").unwrap().text.clone(),
                )),
                _ => None,
            })
            .collect();
        assert_eq!(
            devices,
            vec![
                ("m1".to_string(), "1".to_string()),
                ("m2".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_duplicate_names_blame_the_later_unit() {
        let loader = MemoryLoader::new()
            .with_source("main.une", "INCLUDE \"lib.une\"\n\nDEVICE lamp")
            .with_source("lib.une", "DEVICE LAMP");
        let config = config_without_stdlib();
        let units = run(&loader, &config, "main.une");

        assert!(!units[0].has_errors());
        assert!(units[1].has_errors());
        let message = units[1].diagnostics().next().unwrap().message.clone();
        assert!(message.contains("Duplicate device name"));
    }

    #[test]
    fn test_include_depth_ceiling_charges_the_requester() {
        let mut loader = MemoryLoader::new();
        for index in 0..40 {
            loader.insert(
                format!("f{index}.une"),
                format!("INCLUDE \"f{}.une\"\n\nDEVICE d{index}", index + 1),
            );
        }
        let config = config_without_stdlib();
        let units = run(&loader, &config, "f0.une");

        // Depth cap admits the root plus MAX_INCLUDE_DEPTH descendants.
        assert_eq!(units.len(), MAX_INCLUDE_DEPTH + 1);
        let last = units.last().unwrap();
        assert!(last.has_errors());
        let message = last.diagnostics().next().unwrap().message.clone();
        assert!(message.contains("Include depth limit"));
        assert!(units[..units.len() - 1]
            .iter()
            .all(|unit| !unit.has_errors()));
    }
}
