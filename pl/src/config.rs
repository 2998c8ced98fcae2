//! Configuration for the `pl` binary

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::options::PartialsOptions;

/// Name of the project-local config file
pub const LOCAL_CONFIG: &str = "partialsloader.yml";

/// `pl` configuration file contents
///
/// Loader keys (`root-directories`, `partial-directory-names`, `extensions`,
/// `delimiter`) sit at the top level next to `log-level`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub partials: PartialsOptions,

    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// An explicit path must load. Otherwise `./partialsloader.yml`, then
    /// `~/.config/partialsloader/partialsloader.yml`, then defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let default_paths = [
            Some(PathBuf::from(LOCAL_CONFIG)),
            dirs::config_dir().map(|p| p.join("partialsloader").join(LOCAL_CONFIG)),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Loader options from this config, with built-in defaults for unset keys
    pub fn options(&self) -> PartialsOptions {
        self.partials.clone().or(default_options())
    }
}

fn default_options() -> PartialsOptions {
    PartialsOptions::new()
        .root_directories("templates")
        .partial_directory_names("partials")
        .extensions(vec!["hbs", "handlebars"])
}
