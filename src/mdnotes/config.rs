use crate::error::{NotesError, Result};
use crate::render::Theme;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";

/// Overrides the directory holding `config.json`.
pub const CONFIG_DIR_ENV: &str = "MDNOTES_CONFIG_DIR";
/// Overrides the configured store root.
pub const ROOT_ENV: &str = "MDNOTES_ROOT";

/// User configuration, stored as `config.json` in the config directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NotesConfig {
    /// Notes root; the platform data directory is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Default preview theme.
    #[serde(default)]
    pub theme: Theme,
}

impl NotesConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(NotesError::Io)?;
        let config: NotesConfig =
            serde_json::from_str(&content).map_err(NotesError::Serialization)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(NotesError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(NotesError::Serialization)?;
        fs::write(config_path, content).map_err(NotesError::Io)?;
        Ok(())
    }

    /// Root to open: the configured one, else `<data dir>/notes`.
    pub fn resolve_root(&self, dirs: &AppDirs) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| dirs.data_dir.join("notes"))
    }

    /// Set a key from its string form. Known keys: `root`, `theme`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "root" => {
                let value = value.trim();
                self.root = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
                Ok(())
            }
            "theme" => {
                self.theme = value.parse().map_err(NotesError::Config)?;
                Ok(())
            }
            other => Err(NotesError::Config(format!("unknown config key '{}'", other))),
        }
    }
}

/// Where configuration and default data live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppDirs {
    /// Platform directories, with [`CONFIG_DIR_ENV`] taking precedence for the config dir.
    pub fn discover() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "mdnotes", "mdnotes")
            .ok_or_else(|| NotesError::Config("could not determine a home directory".into()))?;

        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => proj_dirs.config_dir().to_path_buf(),
        };
        Ok(Self {
            config_dir,
            data_dir: proj_dirs.data_dir().to_path_buf(),
        })
    }
}
