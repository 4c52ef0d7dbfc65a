use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_namespace() -> String {
  "ps2:v2".to_string()
}

fn default_rest_endpoint() -> String {
  "https://census.daybreakgames.com".to_string()
}

fn default_push_endpoint() -> String {
  "wss://push.planetside2.com/streaming".to_string()
}

fn default_service_id() -> String {
  // The public example id; fine for light use, register your own for more
  "example".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  /// Census service identifier, without the "s:" prefix.
  #[serde(default = "default_service_id")]
  pub service_id: String,
  /// Game namespace, e.g. "ps2:v2".
  #[serde(default = "default_namespace")]
  pub namespace: String,
  #[serde(default = "default_rest_endpoint")]
  pub rest_endpoint: String,
  #[serde(default = "default_push_endpoint")]
  pub push_endpoint: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      service_id: default_service_id(),
      namespace: default_namespace(),
      rest_endpoint: default_rest_endpoint(),
      push_endpoint: default_push_endpoint(),
    }
  }
}

impl Config {
  /// Load configuration from file, falling back to defaults when none is
  /// found.
  ///
  /// Search order:
  /// 1. Explicit path if provided (an error if missing)
  /// 2. ./auraxis.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/auraxis/config.yaml
  ///
  /// `AURAXIS_SERVICE_ID` overrides the service id from any source.
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
      None => Self::default(),
    };

    if let Ok(service_id) = std::env::var("AURAXIS_SERVICE_ID") {
      config.service_id = service_id;
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("auraxis.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("auraxis").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.service_id, "example");
    assert_eq!(config.namespace, "ps2:v2");
    assert_eq!(config.rest_endpoint, "https://census.daybreakgames.com");
  }

  #[test]
  fn test_partial_yaml_fills_defaults() {
    let config: Config = serde_yaml::from_str("service_id: myapp\n").unwrap();
    assert_eq!(config.service_id, "myapp");
    assert_eq!(config.namespace, "ps2:v2");
  }
}
