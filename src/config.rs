use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cache::QueryOptions;

/// Public jobs API used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://bytegrad.com/course-assets/projects/rmtdev/api/data";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub search: SearchConfig,
  #[serde(default)]
  pub storage: StorageConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_api_url")]
  pub base_url: String,
  /// Per-request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_api_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// How long fetched data is reused before it is refetched
  #[serde(default = "default_stale_time_secs")]
  pub stale_time_secs: u64,
  /// How long a failed request is shown before it is requested again
  #[serde(default = "default_retry_delay_secs")]
  pub retry_delay_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_time_secs: default_stale_time_secs(),
      retry_delay_secs: default_retry_delay_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
  /// Quiet period before typed search text triggers a fetch
  #[serde(default = "default_debounce_ms")]
  pub debounce_ms: u64,
  #[serde(default = "default_page_size")]
  pub page_size: usize,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      debounce_ms: default_debounce_ms(),
      page_size: default_page_size(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
  /// SQLite file for bookmarks (default: $XDG_DATA_HOME/jobscout/storage.db)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Filter directive, overridden by RUST_LOG
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Directory for log files (default: $XDG_DATA_HOME/jobscout)
  pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      dir: None,
    }
  }
}

fn default_api_url() -> String {
  DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

fn default_stale_time_secs() -> u64 {
  60 * 60
}

fn default_retry_delay_secs() -> u64 {
  30
}

fn default_debounce_ms() -> u64 {
  500
}

fn default_page_size() -> usize {
  crate::jobs::DEFAULT_PAGE_SIZE
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./jobscout.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/jobscout/config.yaml
  ///
  /// Without a file every setting takes its default. `JOBSCOUT_API_URL`
  /// overrides the API base URL either way.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var("JOBSCOUT_API_URL") {
      config.api.base_url = url;
    }

    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("jobscout.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("jobscout").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    self.api_url()?;
    if self.search.page_size == 0 {
      return Err(eyre!("search.page_size must be at least 1"));
    }
    Ok(())
  }

  pub fn api_url(&self) -> Result<Url> {
    Url::parse(&self.api.base_url)
      .map_err(|e| eyre!("Invalid API URL '{}': {}", self.api.base_url, e))
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.api.timeout_secs)
  }

  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.search.debounce_ms)
  }

  /// Options applied to every job query.
  pub fn query_options(&self) -> QueryOptions {
    QueryOptions::default()
      .with_stale_time(Duration::from_secs(self.cache.stale_time_secs))
      .with_retry_delay(Duration::from_secs(self.cache.retry_delay_secs))
  }

  /// Get the data directory shared by storage and logs.
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("jobscout"))
  }

  pub fn storage_path(&self) -> Result<PathBuf> {
    match &self.storage.path {
      Some(path) => Ok(path.clone()),
      None => Ok(Self::data_dir()?.join("storage.db")),
    }
  }

  pub fn log_dir(&self) -> Result<PathBuf> {
    match &self.log.dir {
      Some(dir) => Ok(dir.clone()),
      None => Self::data_dir(),
    }
  }
}
