//! rulesql: compile rule configurations from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Compile a configuration file
//! rulesql compile rule.json --param start_date=2024-01-01
//!
//! # Check a SQL statement (inline or @file)
//! rulesql check "SELECT id FROM users WHERE id = 1"
//!
//! # Show tables, parameters and validation status
//! rulesql explain rule.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use rulesql::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rulesql")]
#[command(version)]
#[command(about = "Compile rule configurations to SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    rulesql compile rule.json
    rulesql compile rule.json --param start_date=2024-01-01 --format json
    rulesql check @query.sql
    rulesql explain rule.json")]
struct Cli {
    /// Settings file (defaults to ./rulesql.toml, then the user config dir)
    #[arg(long, global = true, env = "RULESQL_SETTINGS")]
    settings: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Sql,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON rule configuration to SQL
    Compile {
        /// Path to the configuration file
        config: PathBuf,

        /// Parameter binding, `name=value` (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "sql")]
        format: OutputFormat,
    },
    /// Run the syntax checker on a SQL statement (`@path` reads a file)
    Check {
        /// SQL text, or @file
        sql: String,
    },
    /// Describe a configuration without compiling it for use
    Explain {
        /// Path to the configuration file
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = CompilerSettings::load(cli.settings.as_deref())
        .context("Failed to load settings")
        .and_then(|settings| match &cli.command {
            Commands::Compile {
                config,
                params,
                format,
            } => run_compile(&settings, config, params, *format),
            Commands::Check { sql } => run_check(&settings, sql),
            Commands::Explain { config } => run_explain(&settings, config),
        });

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<RuleConfiguration> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = rulesql::codec::from_json(&text)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(config)
}

/// Turn `name=value` pairs into bindings. Declared parameters are typed by
/// their declaration; undeclared ones are inferred.
fn bind_params(config: &RuleConfiguration, raw: &[String]) -> Result<Parameters> {
    let mut params = Parameters::new();
    for pair in raw {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("Expected name=value, got '{}'", pair))?;
        let name = name.trim();
        let literal = match config.parameters().get(name) {
            Some(def) => def.bind(name, value)?,
            None => infer_literal(value),
        };
        params.insert(name.to_string(), literal);
    }
    Ok(params)
}

fn infer_literal(value: &str) -> Literal {
    if let Ok(n) = value.parse::<i64>() {
        Literal::Int(n)
    } else if let Ok(f) = value.parse::<f64>() {
        Literal::Float(f)
    } else if value == "true" {
        Literal::Bool(true)
    } else if value == "false" {
        Literal::Bool(false)
    } else {
        Literal::String(value.to_string())
    }
}

fn run_compile(
    settings: &CompilerSettings,
    path: &Path,
    raw_params: &[String],
    format: OutputFormat,
) -> Result<bool> {
    let config = load_config(path)?;
    let params = bind_params(&config, raw_params)?;

    let missing = config.missing_parameters(&params);
    if !missing.is_empty() {
        anyhow::bail!("Missing required parameters: {}", missing.join(", "));
    }

    let compiled = Compiler::new(settings.clone()).compile_detailed(&config, &params)?;
    match format {
        OutputFormat::Sql => {
            println!("{}", compiled.sql);
            if !compiled.is_fully_bound() {
                eprintln!(
                    "{} unbound placeholders: {}",
                    "⚠".yellow(),
                    compiled.unresolved.join(", ").yellow()
                );
            }
        }
        OutputFormat::Json => {
            let out = json!({ "sql": compiled.sql, "unresolved": compiled.unresolved });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
    }
    Ok(true)
}

fn run_check(settings: &CompilerSettings, input: &str) -> Result<bool> {
    let sql = match input.strip_prefix('@') {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        }
        None => input.to_string(),
    };

    let report = rulesql::syntax::SyntaxChecker::from_settings(settings).check(&sql);
    if report.is_valid {
        println!("{}", "✓ Valid SQL".green().bold());
    } else {
        println!("{}", "✗ Invalid SQL".red().bold());
    }
    for error in &report.errors {
        println!("  {} {}", "error:".red(), error);
    }
    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }
    Ok(report.is_valid)
}

fn run_explain(settings: &CompilerSettings, path: &Path) -> Result<bool> {
    let config = load_config(path)?;

    println!("{}", "Rule Configuration".cyan().bold());
    println!();
    println!("{} {}", "File:".dimmed(), path.display().to_string().yellow());

    println!("  {}", "Tables:".dimmed());
    for table in config.get_table_names() {
        println!("    • {}", table.white());
    }

    if !config.parameters().is_empty() {
        println!("  {}", "Parameters:".dimmed());
        for (name, def) in config.parameters() {
            let required = if def.required { "required" } else { "optional" };
            let default = def
                .default
                .as_ref()
                .map(|d| format!(" (default {})", d))
                .unwrap_or_default();
            println!(
                "    {} {} {}{}",
                name.cyan(),
                def.kind.as_str().white(),
                required.dimmed(),
                default.dimmed()
            );
        }
    }

    let placeholders = config.placeholders();
    if !placeholders.is_empty() {
        println!("  {} {}", "Placeholders:".dimmed(), placeholders.join(", ").yellow());
    }

    println!();
    match Compiler::new(settings.clone()).compile(&config, &Parameters::new()) {
        Ok(sql) => {
            println!("{}", "✓ Valid configuration".green().bold());
            println!();
            println!("{}", "Generated SQL:".green().bold());
            println!("  {}", sql.white());
            Ok(true)
        }
        Err(e) => {
            println!("{} {}", "✗ Invalid configuration:".red().bold(), e);
            Ok(false)
        }
    }
}
