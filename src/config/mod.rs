use crate::models::ScannerConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

/// Name of the scanner settings file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "qrscan.yaml";

/// Prefix of environment variables that override file settings
/// (e.g. `QRSCAN_AUTOFOCUS=false`, `QRSCAN_DECODE_FAULT=retry`)
pub const ENV_PREFIX: &str = "QRSCAN";

/// Configuration manager for loading and saving the scanner settings.
///
/// Settings are layered, later sources winning:
/// 1. Built-in defaults ([`ScannerConfig::default`])
/// 2. `qrscan.yaml` in the configuration directory (optional)
/// 3. `QRSCAN_*` environment variables
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory holding `qrscan.yaml`; created if missing
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the scanner settings from file and environment.
    ///
    /// # Returns
    /// The merged ScannerConfig; defaults fill anything neither source sets
    pub fn load(&self) -> Result<ScannerConfig> {
        self.load_layered(Environment::with_prefix(ENV_PREFIX))
    }

    fn load_layered(&self, env: Environment) -> Result<ScannerConfig> {
        if self.config_path.exists() {
            tracing::info!("Loading scanner config from {}", self.config_path);
        } else {
            tracing::warn!(
                "Scanner config file not found at {}, using defaults",
                self.config_path
            );
        }

        let config: ScannerConfig = Config::builder()
            .add_source(File::new(self.config_path.as_str(), FileFormat::Yaml).required(false))
            .add_source(env.try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read scanner config: {}", self.config_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse scanner config: {}", self.config_path))?;

        tracing::debug!("Effective scanner config: {:?}", config);
        Ok(config)
    }

    /// Save the scanner settings file.
    ///
    /// # Arguments
    /// * `config` - The ScannerConfig to save
    pub fn save(&self, config: &ScannerConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize scanner config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write scanner config: {}", self.config_path))?;

        tracing::info!("Saved scanner config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Path of the settings file (which may not exist yet)
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
