//! Lakeflow CLI - Main entry point

use clap::Parser;
use lakeflow_cli::{Cli, Commands, ConfigCommand};
use lakeflow_common::logging::{init_logging, LogConfig, LogLevel};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging based on verbose flag and environment
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("lakeflow-cli".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // Initialize logging (ignore errors as CLI should work without logging)
    let _ = init_logging(&log_config);

    // Execute command
    let result = execute_command(cli).await;

    // Handle result
    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> lakeflow_cli::Result<()> {
    match cli.command {
        Commands::Deploy {
            config,
            script,
            account_id,
            region,
            output_dir,
        } => {
            lakeflow_cli::commands::deploy::run(config, script, account_id, region, output_dir)
                .await
        }

        Commands::Config { command } => match command {
            ConfigCommand::Generate { count, output } => {
                lakeflow_cli::commands::config::generate(count, output).await
            }
            ConfigCommand::Validate { config } => {
                lakeflow_cli::commands::config::validate(config).await
            }
        },
    }
}
