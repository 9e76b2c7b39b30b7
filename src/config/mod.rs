// Configuration management module
// Handles the TOML config file and the interactive setup flow

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{Config, ConfigError, Distance, OpenAiConfig, QdrantConfig};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("doc-rag"))
        .ok_or(ConfigError::DirectoryError)
}
