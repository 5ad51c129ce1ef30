//! Configuration loading: `config.toml` overlaid by `CODESEARCH_*` env vars.

use std::path::PathBuf;

use config::{Config, Environment, File};

use crate::error::{ConfigError, Result};
use crate::types::AppConfig;

/// Loads and saves [`AppConfig`] from a fixed layering: an optional TOML
/// file, then environment variables under a fixed prefix, which win on
/// conflict.
pub struct ConfigManager {
    config_path: PathBuf,
    env_prefix: String,
}

impl ConfigManager {
    /// `config.toml` inside the given data directory, environment prefix
    /// `CODESEARCH`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_path: data_dir.into().join("config.toml"),
            env_prefix: "CODESEARCH".to_string(),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            env_prefix: "CODESEARCH".to_string(),
        }
    }

    pub fn load(&self) -> Result<AppConfig> {
        let builder = Config::builder()
            .add_source(
                Config::try_from(&AppConfig::default()).map_err(ConfigError::Load)?,
            )
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator("_")
                    .try_parsing(true),
            );

        let built = builder.build()?;
        let app_config: AppConfig = built.try_deserialize()?;
        self.validate(&app_config)?;
        Ok(app_config)
    }

    pub fn save(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        Ok(())
    }

    fn validate(&self, cfg: &AppConfig) -> Result<()> {
        if cfg.search.keyword_weight < 0.0 || cfg.search.vector_weight < 0.0 {
            return Err(ConfigError::Validation(
                "search weights must be non-negative".to_string(),
            ));
        }
        if cfg.search.rrf_k <= 0.0 {
            return Err(ConfigError::Validation(
                "rrf_k must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
