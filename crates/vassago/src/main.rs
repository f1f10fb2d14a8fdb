//! # Vassago CLI
//!
//! *"What is hidden is found"*
//!
//! Command-line entry point for the Vassago email open-tracking service.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "vassago")]
#[command(author = "Daemoniorum Engineering")]
#[command(version)]
#[command(about = "Email open tracking with a 1x1 pixel", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,

    /// Log every HTTP request
    #[arg(long, global = true)]
    access_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the tracking server
    Serve {
        /// Host to bind to [default: config server_host]
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on [default: config server_port]
        #[arg(short, long)]
        port: Option<u16>,

        /// Externally reachable base URL used in tracking links
        #[arg(short = 'u', long)]
        public_url: Option<String>,
    },

    /// Display version and build info
    Version,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write a config file with default values
    Init,

    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let telemetry_config = vassago_telemetry::TelemetryConfig::new("vassago")
        .with_log_level(&cli.log_level);

    let telemetry_config = if cli.json_logs {
        telemetry_config.with_json_logs()
    } else {
        telemetry_config
    };

    let telemetry_config = if cli.access_log {
        telemetry_config.with_access_log()
    } else {
        telemetry_config
    };

    vassago_telemetry::init_logging(&telemetry_config)?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            public_url,
        } => {
            let cfg = config::Config::load();
            commands::serve(cfg, host, port, public_url).await?;
        },

        Commands::Version => {
            commands::version();
        },

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                config::show_config();
            },
            ConfigAction::Init => {
                let path = config::init_config().wrap_err("Failed to write config")?;
                println!("Config written to: {}", path.display());
            },
            ConfigAction::Path => {
                println!("{}", config::Config::config_path().display());
            },
        },
    }

    Ok(())
}
