/// TOML configuration file (`postboard.toml`).
pub mod toml_config;
