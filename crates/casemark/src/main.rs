//! casemark - derive test fixtures from marker-annotated sources
//!
//! casemark walks a directory for annotated source files, strips their
//! `[[...]]` markers while tracking offsets, resolves references to
//! declarations, and emits one position-accurate test suite per file.

use casemark::config::Config;
use casemark::output::{OutputFormat, render, suite_to_json};
use casemark_core::{GeneratedSuites, WalkSources, generate_suites};
use eyre::{Result, WrapErr};
use facet_args as args;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// CLI arguments
#[derive(Debug, facet::Facet)]
struct Args {
    /// Path to config file (default: <root>/.config/casemark/config.json)
    #[facet(args::named, args::short = 'c', default)]
    config: Option<PathBuf>,

    /// Root directory to scan (default: current directory)
    #[facet(args::named, default)]
    root: Option<PathBuf>,

    /// Only check markers; never write suite files (exit 1 on any failure)
    #[facet(args::named, default)]
    check: bool,

    /// Output format: text, json
    #[facet(args::named, args::short = 'f', default)]
    format: Option<String>,

    /// Directory to write one <suite>.json per generated suite
    #[facet(args::named, args::short = 'o', default)]
    output: Option<PathBuf>,

    /// Show verbose output including every generated case
    #[facet(args::named, args::short = 'v', default)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args: Args =
        facet_args::from_std_args().wrap_err("Failed to parse command line arguments")?;

    let root = args.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| root.join(".config/casemark/config.json"));
    let config = Config::load_or_default(&config_path)?;

    let format = args
        .format
        .as_deref()
        .and_then(OutputFormat::from_str)
        .unwrap_or_default();
    let options = config.suite_options();

    let generated = generate_suites(
        WalkSources::new(&root)
            .include(config.include.clone())
            .exclude(config.exclude.clone()),
        &options,
    )?;

    for warning in &generated.warnings {
        eprintln!("{} {}", "!".yellow().bold(), warning);
    }

    print!("{}", render(&generated, format, args.verbose));

    if !args.check {
        let output_dir = args.output.clone().or_else(|| config.output_dir.clone());
        if let Some(output_dir) = output_dir {
            write_suites(&generated, &output_dir)?;
        }
    }

    if generated.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

/// Write one JSON file per suite, qualified names dotted into the file
/// name so nested suites cannot collide.
fn write_suites(generated: &GeneratedSuites, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create {}", output_dir.display()))?;

    for suite in &generated.suites {
        let file_name = match &suite.qualifier {
            Some(qualifier) => format!("{qualifier}.{}.json", suite.name),
            None => format!("{}.json", suite.name),
        };
        let path = output_dir.join(file_name);
        std::fs::write(&path, suite_to_json(suite))
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        eprintln!("{} Wrote {}", "OK".green().bold(), path.display());
    }

    Ok(())
}
