//! Command-line front end: resolve a schema against layered sources, or
//! describe the keys a schema declares.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use layerconf::config::{ConfigSchema, LayeredSourceOptions};
use layerconf::render;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Command-line options for the layerconf CLI.
#[derive(Parser)]
#[command(name = "layerconf", version, about = "Typed layered configuration resolver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a schema against the layered sources and print the result
    Resolve(ResolveArgs),
    /// List every key a schema declares
    Describe(SchemaArgs),
}

#[derive(Args)]
struct SchemaArgs {
    /// JSON5 schema document; defaults to the built-in MongoDB client schema
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[derive(Args)]
struct ResolveArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// Directory searched for application.properties, application.json5 and .env
    #[arg(long)]
    cwd: Option<PathBuf>,
    /// Extra config file applied after the environment (repeatable)
    #[arg(long = "config")]
    configs: Vec<PathBuf>,
    /// Override applied last, as key=value (repeatable)
    #[arg(long = "set", value_parser = parse_override)]
    overrides: Vec<(String, String)>,
    /// Skip the environment-variable layer
    #[arg(long)]
    no_env: bool,
    /// Reject keys the schema does not declare
    #[arg(long)]
    strict: bool,
    /// Print one line per key with the layer that supplied it
    #[arg(long)]
    explain: bool,
}

/// Entry point for the layerconf CLI.
fn main() -> Result<()> {
    layerconf::init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Resolve(args) => run_resolve(args),
        Command::Describe(args) => {
            let schema = load_schema(args.schema.as_deref())?;
            print!("{}", render::describe(&schema));
            Ok(())
        }
    }
}

fn run_resolve(args: ResolveArgs) -> Result<()> {
    let schema = load_schema(args.schema.schema.as_deref())?;
    let cwd = match args.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir().context("failed to resolve current working directory")?,
    };
    info!(
        "resolving {} (cwd={}, configs={}, overrides={}, strict={})",
        schema.name(),
        cwd.display(),
        args.configs.len(),
        args.overrides.len(),
        args.strict
    );

    let mut options = LayeredSourceOptions::new(&cwd).strict(args.strict);
    options.include_env = !args.no_env;
    options.runtime_paths = args.configs;
    options.overrides = args.overrides;

    let layered = schema
        .load_layered_with_options(options)
        .context("failed to resolve configuration")?;
    debug!("resolved from {} layers", layered.layers.len());

    if args.explain {
        print!("{}", render::explain(&schema, &layered.config));
    } else {
        let json = serde_json::to_string_pretty(&layered.config)
            .context("failed to render configuration")?;
        println!("{json}");
    }
    Ok(())
}

fn load_schema(path: Option<&Path>) -> Result<ConfigSchema> {
    match path {
        Some(path) => ConfigSchema::load_from_path(path)
            .with_context(|| format!("failed to load schema {}", path.display())),
        None => layerconf::mongodb::schema().context("failed to build the MongoDB client schema"),
    }
}

/// Parse a `key=value` override.
fn parse_override(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
