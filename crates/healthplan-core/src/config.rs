//! Configuration and data directory management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPLOAD_LIMIT_PER_HOUR: u32 = 10;
pub const DEFAULT_GENERATION_LIMIT_PER_HOUR: u32 = 20;

/// Paths to HealthPlan data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Text-generation provider configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the root if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            llm_config_file: root.join("llm-config.json"),
            root,
        })
    }
}

/// Hourly quotas per action category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    #[serde(rename = "documentUploadPerHour")]
    pub document_upload_per_hour: u32,
    #[serde(rename = "generationPerHour")]
    pub generation_per_hour: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            document_upload_per_hour: DEFAULT_UPLOAD_LIMIT_PER_HOUR,
            generation_per_hour: DEFAULT_GENERATION_LIMIT_PER_HOUR,
        }
    }
}

/// Top-level HealthPlan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthPlanConfig {
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Fixed per-call timeout for the text-generation service, in seconds.
    pub generation_timeout_secs: u64,
    /// Hourly rate limits.
    pub rate_limits: RateLimits,
}

impl HealthPlanConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        Self::from_vars(data_dir, |key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(data_dir: impl AsRef<Path>, lookup: F) -> std::io::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_u64 = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let parse_u32 = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u32>().ok());

        let generation_timeout_secs = parse_u64("HEALTHPLAN_GENERATION_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS);

        let rate_limits = RateLimits {
            document_upload_per_hour: parse_u32("HEALTHPLAN_UPLOAD_LIMIT_PER_HOUR")
                .unwrap_or(DEFAULT_UPLOAD_LIMIT_PER_HOUR),
            generation_per_hour: parse_u32("HEALTHPLAN_GENERATION_LIMIT_PER_HOUR")
                .unwrap_or(DEFAULT_GENERATION_LIMIT_PER_HOUR),
        };

        Ok(Self {
            data_paths: DataPaths::new(data_dir)?,
            generation_timeout_secs,
            rate_limits,
        })
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HealthPlanConfig::from_vars(dir.path(), |_| None).unwrap();
        assert_eq!(config.generation_timeout_secs, 30);
        assert_eq!(config.rate_limits, RateLimits::default());
        assert_eq!(
            config.data_paths.llm_config_file,
            dir.path().join("llm-config.json")
        );
    }

    #[test]
    fn test_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let vars: HashMap<&str, &str> = [
            ("HEALTHPLAN_GENERATION_TIMEOUT_SECS", "5"),
            ("HEALTHPLAN_UPLOAD_LIMIT_PER_HOUR", "3"),
            ("HEALTHPLAN_GENERATION_LIMIT_PER_HOUR", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let config =
            HealthPlanConfig::from_vars(dir.path(), |k| vars.get(k).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(config.generation_timeout(), Duration::from_secs(5));
        assert_eq!(config.rate_limits.document_upload_per_hour, 3);
        assert_eq!(config.rate_limits.generation_per_hour, 20);
    }

    #[test]
    fn test_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested/data");
        DataPaths::new(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
