use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ShellConfig {
    #[serde(default)]
    pub prompt: String,
    /// Number of lines kept by the `history` command.
    #[serde(default)]
    pub history_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct LoggingConfig {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default)]
    pub level: String,
    /// Log file path; a leading `~` is expanded. Empty disables file logging.
    #[serde(default)]
    pub file: String,
}

impl LoggingConfig {
    /// Log file path with `~` expanded, `None` when unset.
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.file.is_empty() {
            return None;
        }
        Some(PathBuf::from(shellexpand::tilde(&self.file).into_owned()))
    }
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    shell: ShellOverlay,
    #[serde(default)]
    logging: LoggingOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct ShellOverlay {
    prompt: Option<String>,
    history_size: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingOverlay {
    level: Option<String>,
    file: Option<String>,
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Default user overlay location: `~/.config/pipesh/config.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(Path::new(&home).join(".config/pipesh/config.toml"))
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge the overlay at `path`, or the user overlay when `path` is `None`
    ///
    /// Scalars set in the overlay override the defaults; omitted ones are kept.
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = Self::default_config();
        let path = path.map(Path::to_path_buf).or_else(Self::user_config_path);
        if let Some(overlay) = path.as_deref().and_then(Self::load_overlay) {
            config.apply_overlay(overlay);
        }
        config
    }

    fn load_overlay(path: &Path) -> Option<ConfigOverlay> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("pipesh: config parse error in {}: {e}", path.display());
                None
            }
        }
    }

    /// Apply an overlay on top of this config (scalar override).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        let s = overlay.shell;
        if let Some(v) = s.prompt {
            self.shell.prompt = v;
        }
        if let Some(v) = s.history_size {
            self.shell.history_size = v;
        }

        let l = overlay.logging;
        if let Some(v) = l.level {
            self.logging.level = v;
        }
        if let Some(v) = l.file {
            self.logging.file = v;
        }
    }

    /// Render the merged configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
