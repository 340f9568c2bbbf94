use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use astfacts_core::facts::replace_properties;
use astfacts_core::{parse_project, Config, FactError, FrontEndRegistry, JsonLinesEmitter};
use clap::{Parser, Subcommand};
use tracing::error;

#[derive(Parser)]
#[command(name = "astfacts")]
#[command(about = "Emit keyed syntax-tree facts for a C#, PHP or TypeScript/JavaScript project", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./astfacts.toml, then the user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a project directory and write its facts as NDJSON to stdout
    ParseProject {
        /// Front end: csharp, php or ts (aliases accepted)
        #[arg(long)]
        lang: String,
        /// Key prefix for this run, `<int>` or `<int>_<int>`
        trunk_key: String,
        /// Project root
        base_dir: PathBuf,
        /// Restrict the run to these files, relative to the project root
        files: Vec<String>,
    },
    /// Compute property deltas for a fact (`name value` pairs)
    ReplaceProperties {
        /// Fact name
        fact: String,
        /// Alternating property names and values
        properties: Vec<String>,
    },
    /// List the supported languages and their extensions
    Languages,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.log.level);
    init_tracing(level);

    match execute(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, FactError> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Diagnostics go to stderr; stdout carries only the fact stream.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(command: Commands, config: &Config) -> Result<(), FactError> {
    match command {
        Commands::ParseProject {
            lang,
            trunk_key,
            base_dir,
            files,
        } => {
            let registry = FrontEndRegistry::with_config(config);
            let front_end = registry.front_end(&lang)?;

            let stdout = io::stdout();
            let mut emitter = JsonLinesEmitter::new(BufWriter::new(stdout.lock()));
            parse_project(
                front_end.as_ref(),
                &trunk_key,
                &base_dir,
                &files,
                config,
                &mut emitter,
            )?;
            emitter.flush()
        }
        Commands::ReplaceProperties { fact, properties } => {
            let deltas = replace_properties(&fact, &properties);
            let json = serde_json::to_string(&deltas)?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json).map_err(|e| FactError::Emit(e.to_string()))
        }
        Commands::Languages => {
            let registry = FrontEndRegistry::with_config(config);
            let mut stdout = io::stdout().lock();
            for (namespace, language, extensions) in registry.list() {
                writeln!(stdout, "{:<8} {:<24} {}", namespace, language, extensions.join(", "))
                    .map_err(|e| FactError::Emit(e.to_string()))?;
            }
            Ok(())
        }
    }
}
