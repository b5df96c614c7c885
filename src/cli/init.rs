//! Init command implementation
//!
//! Scaffolds a new Postboard deployment: configuration file, env template,
//! data directory and `.gitignore`.

use super::output::Output;
use crate::utils::toml_config::DEFAULT_CONFIG_FILE;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (postboard.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// When an existing file may be replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overwrite {
    /// Only with `--force`
    WithForce,
    /// Never; user edits win
    Never,
}

/// One file written by `init`.
struct Scaffold {
    name: &'static str,
    kind: &'static str,
    content: String,
    overwrite: Overwrite,
}

fn scaffolds(config: &InitConfig) -> Vec<Scaffold> {
    vec![
        Scaffold {
            name: DEFAULT_CONFIG_FILE,
            kind: "config",
            content: generate_config_toml(config),
            overwrite: Overwrite::WithForce,
        },
        Scaffold {
            name: ".env.example",
            kind: "env",
            content: generate_env_example(&generate_secret()),
            overwrite: Overwrite::WithForce,
        },
        Scaffold {
            name: ".gitignore",
            kind: "file",
            content: generate_gitignore(),
            overwrite: Overwrite::Never,
        },
    ]
}

/// Scaffolds `postboard.toml`, `.env.example`, `.gitignore` and `data/`.
///
/// An existing `postboard.toml` stops the command unless `--force` is given.
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Postboard");

    let base = &config.path;
    if base.join(DEFAULT_CONFIG_FILE).exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let data_dir = base.join("data");
    if data_dir.is_dir() {
        output.skipped("data", "already exists");
    } else if let Err(e) = fs::create_dir_all(&data_dir) {
        output.error(&format!("Failed to create data: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created_dir("data");
    }

    for scaffold in scaffolds(&config) {
        let path = base.join(scaffold.name);
        let replace = config.force && scaffold.overwrite == Overwrite::WithForce;

        if path.exists() && !replace {
            output.skipped(scaffold.name, "already exists");
            continue;
        }
        if let Err(e) = fs::write(&path, &scaffold.content) {
            output.error(&format!("Failed to create {}: {}", scaffold.name, e));
            return InitResult::Error(e.to_string());
        }
        output.created(scaffold.kind, scaffold.name);
    }

    output.complete("Postboard initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Copy the environment template (it already holds a fresh secret):");
    output.command("cp .env.example .env");
    output.newline();
    output.info("2. Start the server:");
    output.command("postboard-server");
    output.hint(&format!(
        "API will be available at http://{}:{}/api",
        config.host, config.port
    ));

    InitResult::Success
}

/// 64 hex characters from two random UUIDs.
fn generate_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn generate_config_toml(config: &InitConfig) -> String {
    format!(
        r#"# Postboard configuration
# Secrets are read from the environment (see .env.example), never from this file.

[server]
host = "{host}"
port = {port}
log_level = "info"

[auth]
# Environment variable holding the token signing secret (min 32 chars)
jwt_secret_env = "JWT_SECRET"
# Session token lifetime in seconds (one day)
token_ttl_secs = 86400

[database]
# SQLite file, or ":memory:" for a throwaway database
url = "./data/postboard.db"

[profile]
# default_image = "https://example.com/avatar.png"
"#,
        host = config.host,
        port = config.port
    )
}

fn generate_env_example(secret: &str) -> String {
    format!(
        r#"# Postboard environment
# Copy to .env. Keep .env out of version control.

# Token signing secret (at least 32 characters)
JWT_SECRET={secret}

# Log filter, overrides server.log_level
RUST_LOG=info,postboard=debug
"#
    )
}

fn generate_gitignore() -> String {
    r#"# Postboard Generated Files
/data/
*.db
*.db-journal
*.db-wal
*.db-shm

# Environment
.env
.env.local

# Rust
/target/
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::PostboardConfig;
    use tempfile::TempDir;

    fn create_test_config(temp_dir: &TempDir, force: bool) -> InitConfig {
        InitConfig {
            path: temp_dir.path().to_path_buf(),
            force,
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }

    #[test]
    fn test_generated_toml_parses() {
        let config = InitConfig {
            path: PathBuf::from("/tmp/test"),
            force: false,
            host: "0.0.0.0".to_string(),
            port: 8080,
        };

        let content = generate_config_toml(&config);
        let parsed: PostboardConfig = toml::from_str(&content).expect("generated TOML parses");

        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.auth.jwt_secret_env, "JWT_SECRET");
    }

    #[test]
    fn test_env_example_carries_generated_secret() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert_ne!(secret, generate_secret());

        let content = generate_env_example(&secret);
        assert!(content.contains(&format!("JWT_SECRET={}", secret)));
        assert!(content.contains("RUST_LOG"));
    }

    #[test]
    fn test_force_keeps_existing_gitignore() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join(".gitignore"), "mine\n").expect("Failed to write");

        let result = run(create_test_config(&temp_dir, true), &Output::no_color());

        assert_eq!(result, InitResult::Success);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join(".gitignore")).expect("Failed to read"),
            "mine\n"
        );
    }

    #[test]
    fn test_run_creates_all_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let result = run(create_test_config(&temp_dir, false), &Output::no_color());

        assert_eq!(result, InitResult::Success);
        assert!(temp_dir.path().join("postboard.toml").exists());
        assert!(temp_dir.path().join(".env.example").exists());
        assert!(temp_dir.path().join(".gitignore").exists());
        assert!(temp_dir.path().join("data").is_dir());
    }

    #[test]
    fn test_run_already_exists_without_force() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("postboard.toml"), "existing").expect("Failed to write");

        let result = run(create_test_config(&temp_dir, false), &Output::no_color());

        assert_eq!(result, InitResult::AlreadyExists);
        let content =
            fs::read_to_string(temp_dir.path().join("postboard.toml")).expect("Failed to read");
        assert_eq!(content, "existing");
    }

    #[test]
    fn test_run_force_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("postboard.toml"), "existing").expect("Failed to write");

        let result = run(create_test_config(&temp_dir, true), &Output::no_color());

        assert_eq!(result, InitResult::Success);
        let content =
            fs::read_to_string(temp_dir.path().join("postboard.toml")).expect("Failed to read");
        assert!(content.contains("[server]"));
        assert!(!content.contains("existing"));
    }
}
