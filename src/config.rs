use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use sweepr::exec::DEFAULT_TIMEOUT_MS;
use sweepr::github::PR_QUERY_TIMEOUT_MS;
use sweepr::sweep::{DEFAULT_CHECK_CONCURRENCY, DEFAULT_DELETE_CONCURRENCY};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub concurrency: ConcurrencyConfig,
    pub timeouts: TimeoutConfig,
    pub git: GitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Max concurrent PR status queries
    pub check: usize,
    /// Max concurrent branch deletions
    pub delete: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            check: DEFAULT_CHECK_CONCURRENCY,
            delete: DEFAULT_DELETE_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for ordinary git commands
    pub command_ms: u64,
    /// Deadline for each PR status query (many run per sweep)
    pub pr_query_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            command_ms: DEFAULT_TIMEOUT_MS,
            pr_query_ms: PR_QUERY_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Branch names never offered for deletion, on top of the built-in
    /// main/master/current-branch protection
    pub protected: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            concurrency: ConcurrencyConfig::default(),
            timeouts: TimeoutConfig::default(),
            git: GitConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.concurrency.check, 5);
        assert_eq!(config.concurrency.delete, 3);
        assert_eq!(config.timeouts.command_ms, 30_000);
        assert_eq!(config.timeouts.pr_query_ms, 10_000);
        assert!(config.git.protected.is_empty());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = Config::load(Some(&PathBuf::from("/no/such/sweepr.yml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweepr.yml");
        std::fs::write(
            &path,
            "concurrency:\n  check: 8\ngit:\n  protected:\n    - develop\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.concurrency.check, 8);
        // Unset keys keep their defaults
        assert_eq!(config.concurrency.delete, 3);
        assert_eq!(config.git.protected, vec!["develop".to_string()]);
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweepr.yml");
        std::fs::write(&path, "concurrency: [not: a: map").unwrap();

        let result = Config::load(Some(&path));
        assert!(result.is_err());
    }
}
