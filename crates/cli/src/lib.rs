pub mod commands;

use clap::{Parser, Subcommand};
use santral_core::config::{AppConfig, LoadOptions, LogFormat};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "santral",
    about = "Santral sales wizard CLI",
    long_about = "Inspect the virtual PBX catalog, replay wizard sessions, and check configuration.",
    after_help = "Examples:\n  santral catalog --json\n  santral run session.json --audit\n  santral config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a santral.toml file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Show the seeded product catalog with its totals")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Replay a JSON script of wizard intents and print the final snapshot")]
    Run {
        #[arg(help = "Path to a JSON array of wizard intents")]
        script: PathBuf,
        #[arg(long, help = "Include the audit trail of every intent in the output")]
        audit: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    if let Ok(config) =
        AppConfig::load(LoadOptions { config_path: cli.config.clone(), ..LoadOptions::default() })
    {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Catalog { json } => commands::catalog::run(config_path, json),
        Command::Run { script, audit } => commands::run::run(&script, config_path, audit),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(config_path) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so command output on stdout stays machine readable.
fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
