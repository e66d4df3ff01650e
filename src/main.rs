//! lambda-router local invocation harness.
//!
//! Loads a route manifest, binds every route to an echo handler and runs
//! recorded events through the same dispatcher a deployed function uses.
//!
//! ```text
//! lambda-router invoke   --config router.toml --event event.json
//! lambda-router validate --config router.toml
//! lambda-router routes   --config router.toml
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;

use lambda_router::config::{load_config, ConfigError};
use lambda_router::lifecycle::{build_dispatcher, describe_routes};
use lambda_router::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "lambda-router")]
#[command(about = "Local invocation harness for the multi-source event router", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one event through the configured routes
    Invoke {
        /// Route manifest (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Event JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        event: String,
    },
    /// Check a route manifest and report every problem found
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List configured routes in dispatch order
    Routes {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Invoke { config, event } => {
            let config = load_config(&config)?;
            if let Err(e) = init_logging(&config.observability) {
                eprintln!("Warning: logging not initialized: {e}");
            }

            let event: Value = serde_json::from_str(&read_event(&event)?)?;
            let dispatcher = build_dispatcher(&config);
            match dispatcher.handle(&event) {
                Ok(payload) => {
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("Routing error: {e}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Validate { config } => match load_config(&config) {
            Ok(_) => {
                println!("{}: ok", config.display());
                Ok(ExitCode::SUCCESS)
            }
            Err(ConfigError::Validation(errors)) => {
                eprintln!("{}: {} problem(s)", config.display(), errors.len());
                for error in errors {
                    eprintln!("  - {error}");
                }
                Ok(ExitCode::FAILURE)
            }
            Err(e) => Err(e.into()),
        },
        Commands::Routes { config } => {
            let config = load_config(&config)?;
            for (source, route) in describe_routes(&config) {
                println!("{:<8} {}", source.as_str(), route);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_event(source: &str) -> io::Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(source)
    }
}
