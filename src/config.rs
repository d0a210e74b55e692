use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::download::{TransferOptions, TransportConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    /// Extra request headers sent with every transfer.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_fake_user_agent")]
    pub fake_user_agent: bool,
}

fn default_fake_user_agent() -> bool {
    false
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chunk_size: None,
            directory: None,
            fake_user_agent: default_fake_user_agent(),
        }
    }
}

impl Config {
    /// Transfer options seeded from this configuration.
    pub fn transfer_options(&self) -> TransferOptions {
        let mut options = TransferOptions::new()
            .with_headers(self.headers.clone())
            .with_fake_user_agent(self.download.fake_user_agent)
            .with_transport(self.transport.clone());

        if let Some(chunk_size) = self.download.chunk_size {
            options = options.with_chunk_size(chunk_size);
        }
        if let Some(directory) = &self.download.directory {
            options = options.with_download_dir(directory);
        }

        options
    }
}

pub struct ConfigManager {
    config_dir: PathBuf,
    config_file: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Load the config from the platform config directory, creating a default one if missing
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("", "", "aiodl").context("Failed to determine config directory")?;

        Self::from_path(project_dirs.config_dir().join("config.toml"))
    }

    /// Load the config from an explicit file, creating a default one if missing
    pub fn from_path(config_file: impl Into<PathBuf>) -> Result<Self> {
        let config_file = config_file.into();
        let config_dir = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
        }

        let config = if config_file.exists() {
            Self::load_config(&config_file)?
        } else {
            let default_config = Config::default();
            Self::save_config(&config_file, &default_config)?;
            default_config
        };

        Ok(Self {
            config_dir,
            config_file,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Save the current config to disk
    pub fn save(&self) -> Result<()> {
        Self::save_config(&self.config_file, &self.config)
    }

    /// Reload config from disk
    pub fn reload(&mut self) -> Result<()> {
        self.config = Self::load_config(&self.config_file)?;
        Ok(())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    fn load_config(config_file: &Path) -> Result<Config> {
        let content = fs::read_to_string(config_file)
            .with_context(|| format!("Failed to read config file: {:?}", config_file))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_file))?;

        Ok(config)
    }

    fn save_config(config_file: &Path, config: &Config) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(config_file, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_file))?;

        Ok(())
    }

    /// Write a default config next to the active one for reference
    pub fn create_sample_config(&self) -> Result<PathBuf> {
        let sample_file = self.config_dir.join("config.sample.toml");
        Self::save_config(&sample_file, &Config::default())?;
        Ok(sample_file)
    }

    pub fn validate(&self) -> Result<()> {
        if self.config.download.chunk_size == Some(0) {
            anyhow::bail!("download.chunk_size must be greater than 0");
        }

        if self.config.transport.max_redirects == 0 {
            anyhow::bail!("transport.max_redirects must be greater than 0");
        }

        if let Some(directory) = &self.config.download.directory {
            if directory.trim().is_empty() {
                anyhow::bail!("download.directory cannot be empty");
            }
        }

        for name in self.config.headers.keys() {
            if name.trim().is_empty() {
                anyhow::bail!("header names cannot be empty");
            }
        }

        Ok(())
    }
}
