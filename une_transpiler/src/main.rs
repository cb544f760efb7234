use std::env;

use une_transpiler::config::runtime::RuntimeConfig;
use une_transpiler::{emit, logging, pipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RuntimeConfig::default();

    // Initialize global logging system
    logging::init_global_logging(&config.logging)?;

    // Validate pipeline configuration
    pipeline::validate_pipeline()?;

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <root.une> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    // Parse additional options
    let options = parse_run_options(&args[2..], config);

    run(&args[1], &options)
}

fn print_help(program_name: &str) {
    println!("Une Transpiler v{}", env!("CARGO_PKG_VERSION"));
    println!("Transpiles a Une source tree into one normalized JSON command list");
    println!();
    println!("USAGE:");
    println!("    {} <root.une> [options]", program_name);
    println!();
    println!("ARGUMENTS:");
    println!("    <root.une>     Path of the root Une unit; includes are resolved");
    println!("                   relative to the unit that names them");
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --out FILE          Write the JSON code channel to FILE instead of stdout");
    println!("    --compact           Emit one-line JSON instead of pretty-printed");
    println!("    --stdlib URI        Standard library pulled in by auto-include");
    println!("    --no-stdlib         Disable the standard library auto-include");
    println!("    --charset NAME      Character set assumed for all source files");
    println!("    --context N         Source lines shown above each reported error");
    println!("    --report-only       Suppress the code channel; print the report only");
    println!("    --quiet             Suppress the diagnostics report");
    println!();
    println!("OUTPUT:");
    println!("    Code channel: one JSON document on stdout (or FILE with --out),");
    println!("    omitting every unit that produced a diagnostic");
    println!("    Diagnostics report: per-unit command counts and error blocks on stderr");
    println!();
    println!("EXAMPLES:");
    println!("    {} main.une                        # Pretty JSON to stdout", program_name);
    println!("    {} main.une --out commands.json    # Write to a file", program_name);
    println!("    {} main.une --compact --quiet      # Machine-friendly output", program_name);
    println!("    {} main.une --context 2            # Errors with source context", program_name);
    println!("    {} main.une --no-stdlib            # Skip the standard library", program_name);
}

struct RunOptions {
    config: RuntimeConfig,
    output_path: Option<String>,
    report_only: bool,
    quiet: bool,
}

fn parse_run_options(args: &[String], config: RuntimeConfig) -> RunOptions {
    let mut options = RunOptions {
        config,
        output_path: None,
        report_only: false,
        quiet: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--out" => {
                if i + 1 < args.len() {
                    options.output_path = Some(args[i + 1].clone());
                    i += 1; // Skip the path argument
                } else {
                    eprintln!("Warning: --out requires a file path");
                }
            }
            "--compact" => {
                options.config.emit.pretty = false;
            }
            "--stdlib" => {
                if i + 1 < args.len() {
                    options.config.resolver.standard_library = Some(args[i + 1].clone());
                    i += 1; // Skip the URI argument
                } else {
                    eprintln!("Warning: --stdlib requires a URI");
                }
            }
            "--no-stdlib" => {
                options.config.resolver.standard_library = None;
            }
            "--charset" => {
                if i + 1 < args.len() {
                    options.config.resolver.default_charset = args[i + 1].clone();
                    i += 1; // Skip the name argument
                } else {
                    eprintln!("Warning: --charset requires a name");
                }
            }
            "--context" => {
                if i + 1 < args.len() {
                    if let Ok(lines) = args[i + 1].parse::<u32>() {
                        options.config.emit.report_context_lines = lines;
                    } else {
                        eprintln!(
                            "Warning: Invalid context line count '{}', using default",
                            args[i + 1]
                        );
                    }
                    i += 1; // Skip the number argument
                } else {
                    eprintln!("Warning: --context requires a number");
                }
            }
            "--report-only" => {
                options.report_only = true;
            }
            "--quiet" => {
                options.quiet = true;
            }
            _ => {
                eprintln!("Warning: Unknown option '{}'", args[i]);
            }
        }
        i += 1;
    }

    options
}

fn run(root_uri: &str, options: &RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let result = pipeline::transpile_with_config(root_uri, &options.config);

    if !options.quiet {
        eprint!("{}", result.report(&options.config.emit));
    }

    if !options.report_only {
        let code = result.code(&options.config.emit)?;
        emit::write_output(&code, options.output_path.as_deref())?;
    }

    if let Err(error) = result.require_success() {
        eprintln!("FAILED: {}", error);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RunOptions {
        let owned: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        parse_run_options(&owned, RuntimeConfig::default())
    }

    #[test]
    fn test_parse_run_options() {
        let options = parse(&[
            "--compact",
            "--no-stdlib",
            "--out",
            "code.json",
            "--context",
            "2",
            "--report-only",
        ]);

        assert!(!options.config.emit.pretty);
        assert!(options.config.resolver.standard_library.is_none());
        assert_eq!(options.output_path.as_deref(), Some("code.json"));
        assert_eq!(options.config.emit.report_context_lines, 2);
        assert!(options.report_only);
        assert!(!options.quiet);
    }

    #[test]
    fn test_parse_run_options_invalid() {
        let options = parse(&["--context", "many", "--unknown-option"]);

        // Should keep the default when an invalid number is provided
        assert_eq!(
            options.config.emit.report_context_lines,
            RuntimeConfig::default().emit.report_context_lines
        );
        assert!(options.output_path.is_none());
    }

    #[test]
    fn test_parse_run_options_value_flag_without_value() {
        let options = parse(&["--out"]);
        assert!(options.output_path.is_none());
    }

    #[test]
    fn test_later_stdlib_flag_wins() {
        let options = parse(&["--stdlib", "lib/std.une", "--no-stdlib"]);
        assert!(options.config.resolver.standard_library.is_none());

        let options = parse(&["--no-stdlib", "--stdlib", "lib/std.une"]);
        assert_eq!(
            options.config.resolver.standard_library.as_deref(),
            Some("lib/std.une")
        );
    }
}
