//! Configuration loading from TOML files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for retrax.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub harvest: HarvestSection,
    pub analysis: AnalysisSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestSection {
    pub endpoint: String,
    /// Lower datestamp bound of the initial query (YYYY-MM-DD)
    pub from: String,
    pub metadata_prefix: String,
    pub set: String,
    /// Path of the persisted dump
    pub dump: PathBuf,
}

impl Default for HarvestSection {
    fn default() -> Self {
        Self {
            endpoint: "http://export.arxiv.org/oai2".to_string(),
            from: "1991-01-01".to_string(),
            metadata_prefix: "arXivRaw".to_string(),
            set: "cs".to_string(),
            dump: PathBuf::from("dump.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    pub first_year: i32,
    pub last_year: i32,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            first_year: 1993,
            last_year: 2012,
        }
    }
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Search order:
    /// 1. ./retrax.toml (current directory)
    /// 2. ~/.config/retrax/config.toml
    ///
    /// If no config file is found, returns the default config.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("retrax.toml");
        if local.exists() {
            return Self::from_file(&local);
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "retrax") {
            let user = dirs.config_dir().join("config.toml");
            if user.exists() {
                return Self::from_file(&user);
            }
        }

        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.harvest.endpoint.starts_with("http"));
        assert_eq!(config.harvest.metadata_prefix, "arXivRaw");
        assert_eq!(config.analysis.first_year, 1993);
        assert_eq!(config.analysis.last_year, 2012);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [harvest]
            set = "math"

            [analysis]
            last_year = 2020
            "#,
        )
        .unwrap();
        assert_eq!(config.harvest.set, "math");
        assert_eq!(config.harvest.metadata_prefix, "arXivRaw");
        assert_eq!(config.analysis.first_year, 1993);
        assert_eq!(config.analysis.last_year, 2020);
    }
}
