//! Line reader options

use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_MAX_FILE_LEN;

/// Options for [`Session::initialize`](crate::Session::initialize)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Keep signal-generating keys (Ctrl-C, Ctrl-Z) active in raw mode
    pub raw_mode_cbreak: bool,
    /// Enable VT escape processing on consoles that need it (no-op on Unix)
    pub enable_vt: bool,
    /// Install SIGTSTP/SIGCONT/SIGINT handling
    pub install_handlers: bool,
    /// Maximum number of bytes read from a history file
    pub history_max_file_len: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            raw_mode_cbreak: false,
            enable_vt: false,
            install_handlers: false,
            history_max_file_len: DEFAULT_MAX_FILE_LEN,
        }
    }
}

impl Options {
    /// Options suited to an interactive shell: cbreak mode with job control
    pub fn interactive() -> Self {
        Self {
            raw_mode_cbreak: true,
            enable_vt: true,
            install_handlers: true,
            ..Self::default()
        }
    }

    /// Load options from a file
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let options: Options = serde_json::from_str(&content)?;
        Ok(options)
    }

    /// Save options to a file
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load options from the default location or fall back to the defaults
    pub fn load_or_default() -> Self {
        // Try ~/.config/rawline/config.json
        if let Some(config_dir) = dirs_config_path() {
            let config_path = config_dir.join("config.json");
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(options) => return options,
                    Err(e) => tracing::warn!("Ignoring {}: {}", config_path.display(), e),
                }
            }
        }
        Self::default()
    }
}

/// Get the configuration directory path
fn dirs_config_path() -> Option<std::path::PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| std::path::PathBuf::from(home).join(".config").join("rawline"))
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
