use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::store::{LocalSettings, RemoteSettings, DEFAULT_NAMESPACE, DEFAULT_PREFIXES};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub remote: RemoteConfig,
  #[serde(default)]
  pub local: LocalConfig,
  /// Minimum gap between two "operating locally" notices for one operation
  #[serde(default = "default_notify_cooldown")]
  pub notify_cooldown_secs: u64,
  /// Application prefixes scanned by stats and removed by a full clear
  #[serde(default = "default_prefixes")]
  pub known_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
  /// Base URL of the KV Edge Function, e.g. https://<ref>.supabase.co/functions/v1/kv
  pub url: String,
  #[serde(default = "default_probe_timeout")]
  pub probe_timeout_secs: u64,
  #[serde(default = "default_request_timeout")]
  pub request_timeout_secs: u64,
  /// How long a probe result is trusted before probing again
  #[serde(default = "default_probe_cooldown")]
  pub probe_cooldown_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
  /// SQLite file (default: $XDG_DATA_HOME/crewtech-kv/local.db)
  pub path: Option<PathBuf>,
  #[serde(default = "default_namespace")]
  pub namespace: String,
  /// Set to null to disable the quota
  #[serde(default = "default_quota")]
  pub quota_bytes: Option<u64>,
}

impl Default for LocalConfig {
  fn default() -> Self {
    Self {
      path: None,
      namespace: default_namespace(),
      quota_bytes: default_quota(),
    }
  }
}

fn default_notify_cooldown() -> u64 {
  60
}

fn default_probe_timeout() -> u64 {
  3
}

fn default_request_timeout() -> u64 {
  10
}

fn default_probe_cooldown() -> u64 {
  30
}

fn default_namespace() -> String {
  DEFAULT_NAMESPACE.to_string()
}

fn default_quota() -> Option<u64> {
  Some(crate::store::DEFAULT_QUOTA_BYTES)
}

fn default_prefixes() -> Vec<String> {
  DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./crewtech-kv.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/crewtech-kv/config.yaml
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

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/crewtech-kv/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("crewtech-kv.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("crewtech-kv").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Get the bearer token for the Edge Function.
  ///
  /// Checks CREWTECH_KV_TOKEN first, then SUPABASE_ANON_KEY as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("CREWTECH_KV_TOKEN")
      .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
      .map_err(|_| {
        eyre!("KV token not found. Set CREWTECH_KV_TOKEN or SUPABASE_ANON_KEY environment variable.")
      })
  }

  pub fn remote_settings(&self) -> RemoteSettings {
    RemoteSettings {
      probe_timeout: Duration::from_secs(self.remote.probe_timeout_secs),
      request_timeout: Duration::from_secs(self.remote.request_timeout_secs),
    }
  }

  pub fn local_settings(&self) -> LocalSettings {
    LocalSettings {
      namespace: self.local.namespace.clone(),
      quota_bytes: self.local.quota_bytes,
      known_prefixes: self.known_prefixes.clone(),
    }
  }

  pub fn probe_cooldown(&self) -> Duration {
    Duration::from_secs(self.remote.probe_cooldown_secs)
  }

  pub fn notify_cooldown(&self) -> Duration {
    Duration::from_secs(self.notify_cooldown_secs)
  }
}
