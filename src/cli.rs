//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Foodmap - restaurant discovery and food-logging backend
///
/// Serves restaurant CRUD, collection statistics, AI-generated nutrition
/// analysis, and food-analysis record keeping over HTTP.
///
/// Examples:
///   foodmap
///   foodmap --bind 0.0.0.0:3000
///   foodmap --config ./foodmap.toml --verbose
///   foodmap --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Socket address to bind the HTTP server to
    ///
    /// Overrides the config file. Defaults to 127.0.0.1:8080.
    #[arg(short, long, value_name = "ADDR", env = "FOODMAP_BIND")]
    pub bind: Option<String>,

    /// Store backend to open ("memory")
    #[arg(long, value_name = "BACKEND")]
    pub store: Option<String>,

    /// Chat-completions model for nutrition analysis
    ///
    /// Can also be set via FOODMAP_MODEL env var or .foodmap.toml config.
    #[arg(short, long, env = "FOODMAP_MODEL")]
    pub model: Option<String>,

    /// Chat-completions endpoint URL
    #[arg(long, value_name = "URL", env = "FOODMAP_AI_URL")]
    pub ai_url: Option<String>,

    /// API key for the AI backend
    ///
    /// Read from the environment rather than the config file so it never
    /// lands on disk.
    #[arg(long, value_name = "KEY", env = "FOODMAP_AI_KEY", hide_env_values = true)]
    pub ai_key: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .foodmap.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .foodmap.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("--verbose and --quiet are mutually exclusive".to_string());
        }

        if let Some(ref bind) = self.bind {
            if bind.parse::<std::net::SocketAddr>().is_err() {
                return Err(format!("Invalid bind address: {bind}"));
            }
        }

        if let Some(ref config_path) = self.config {
            if !config_path.exists() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
