//! CLI module for Postboard
//!
//! Provides command-line interface parsing and handling for the postboard-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use crate::utils::toml_config::{ConfigError, PostboardConfig};
use clap::{Parser, Subcommand};
use output::Output;
use std::path::{Path, PathBuf};

/// Postboard - accounts, profiles and posts over a JSON REST API
#[derive(Parser, Debug)]
#[command(
    name = "postboard-server",
    version,
    about = "Postboard - a small social blogging backend",
    long_about = "A JSON REST backend for a minimal blogging platform: registration, login,\n\
                  profiles and posts with author-only editing.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a configuration.",
    after_help = "EXAMPLES:\n    \
                  postboard-server init                  # Scaffold postboard.toml and .env.example\n    \
                  postboard-server                       # Start the server (requires postboard.toml)\n    \
                  postboard-server --config my.toml      # Use a custom config file\n    \
                  postboard-server config --validate     # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "postboard.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new Postboard deployment with configuration files
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Show the effective configuration
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Prints the effective configuration. The signing secret itself is never
/// shown, only whether it resolves.
pub fn show_config(path: &Path, validate: bool, output: &Output) -> Result<(), ConfigError> {
    let config = PostboardConfig::load_unvalidated(path)?;

    output.header(&format!("Configuration ({})", path.display()));
    output.kv("server.host", &config.server.host);
    output.kv("server.port", &config.server.port.to_string());
    output.kv("server.log_level", &config.server.log_level);
    output.kv("auth.jwt_secret_env", &config.auth.jwt_secret_env);
    output.kv(
        "auth.jwt_secret",
        if config.jwt_secret().is_ok() {
            "<set>"
        } else {
            "<missing>"
        },
    );
    output.kv("auth.token_ttl_secs", &config.auth.token_ttl_secs.to_string());
    output.kv("database.url", &config.database.url);
    output.kv("profile.default_image", &config.profile.default_image);

    if validate {
        config.validate()?;
        output.success("Configuration is valid");
    }

    Ok(())
}
