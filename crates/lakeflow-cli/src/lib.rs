//! Lakeflow CLI Library
//!
//! Deploy-time command-line interface for Lakeflow:
//!
//! - **Layout Deployment**: provision buckets, upload the extraction script,
//!   and emit workflow descriptions (`lakeflow deploy`)
//! - **Configuration**: generate and validate `workflow_config.json`
//!   (`lakeflow config generate/validate`)

pub mod commands;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};

/// Lakeflow - incremental JDBC to S3 workflow tooling
#[derive(Parser, Debug)]
#[command(name = "lakeflow")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and deploy workflow layouts from a configuration file
    Deploy {
        /// Workflow configuration file
        #[arg(long, default_value = "workflow_config.json")]
        config: String,

        /// Extraction script uploaded for every workflow
        #[arg(long, default_value = "jdbc_to_s3.py")]
        script: String,

        /// AWS account id used in bucket names
        #[arg(long)]
        account_id: String,

        /// AWS region (defaults to the ambient AWS configuration)
        #[arg(long, env = "AWS_REGION")]
        region: Option<String>,

        /// Directory the workflow descriptions are written into
        #[arg(long, default_value = ".")]
        output_dir: String,
    },

    /// Manage workflow configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a sample configuration file
    Generate {
        /// Number of workflow entries to generate
        #[arg(long, default_value = "3")]
        count: usize,

        /// Output file
        #[arg(long, default_value = "workflow_config.json")]
        output: String,
    },

    /// Validate an existing configuration file
    Validate {
        /// Workflow configuration file
        #[arg(long, default_value = "workflow_config.json")]
        config: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_deploy() {
        let cli = Cli::try_parse_from([
            "lakeflow",
            "deploy",
            "--account-id",
            "123456789012",
            "--region",
            "eu-west-1",
        ])
        .unwrap();

        match cli.command {
            Commands::Deploy {
                config,
                account_id,
                region,
                ..
            } => {
                assert_eq!(config, "workflow_config.json");
                assert_eq!(account_id, "123456789012");
                assert_eq!(region.as_deref(), Some("eu-west-1"));
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_generate() {
        let cli = Cli::try_parse_from(["lakeflow", "config", "generate", "--count", "5"]).unwrap();

        match cli.command {
            Commands::Config {
                command: ConfigCommand::Generate { count, output },
            } => {
                assert_eq!(count, 5);
                assert_eq!(output, "workflow_config.json");
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
