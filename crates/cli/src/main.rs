use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use daoscript::common::logging::init_tracing;
use daoscript::config::Config;
use daoscript::dsl::parse;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpret a script and print the resulting actions as JSON
    Run {
        /// Script file
        script: PathBuf,
        /// YAML configuration; defaults to the environment
        #[arg(long)]
        config: Option<PathBuf>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Parse a script and report syntax errors
    Check {
        /// Script file
        script: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    Ok(config)
}

fn read_script(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run {
            script,
            config,
            pretty,
        } => {
            let config = load_config(config.as_deref())?;
            init_tracing(&config.log_level)?;

            let source = read_script(script)?;
            info!(script = %script.display(), "Interpreting script");
            let actions = daoscript::run_script(&source, &config).await?;

            let output = if *pretty {
                serde_json::to_string_pretty(&actions)?
            } else {
                serde_json::to_string(&actions)?
            };
            println!("{}", output);
        }
        Commands::Check { script } => {
            let config = Config::from_env()?;
            init_tracing(&config.log_level)?;

            let source = read_script(script)?;
            let (parsed, errors) = parse(&source);
            for error in &errors {
                eprintln!(
                    "{}:{}:{}: {}",
                    script.display(),
                    error.line,
                    error.column,
                    error.message
                );
            }
            if !errors.is_empty() {
                bail!("{} parse error(s) in {}", errors.len(), script.display());
            }
            println!("{}: {} command(s)", script.display(), parsed.commands.len());
        }
    }

    Ok(())
}
