//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use voucher_extractor::ExtractorConfig;
use voucher_oracle::OracleConfig;
use voucher_verifier::VerifierConfig;

/// CLI configuration.
///
/// Every section is optional in the file; missing keys take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Extraction service
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Extraction pipeline tuning
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Verification tolerances
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Result database
    #[serde(default)]
    pub store: StoreSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Result database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// SQLite database path
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(app_dir()?.join("config.toml"))
    }

    /// Load configuration from `path` (or the default path), falling back to
    /// defaults when the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::path()?,
        };

        let config: Config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            toml::from_str(&contents)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path` (or the default path).
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.oracle.validate().map_err(|e| CliError::Config(format!("[oracle] {}", e)))?;
        self.extractor
            .validate()
            .map_err(|e| CliError::Config(format!("[extractor] {}", e)))?;
        self.verifier
            .validate()
            .map_err(|e| CliError::Config(format!("[verifier] {}", e)))?;
        if self.store.path.as_os_str().is_empty() {
            return Err(CliError::Config("[store] path must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn app_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".voucher"))
}

fn default_database_path() -> PathBuf {
    app_dir()
        .map(|dir| dir.join("voucher.db"))
        .unwrap_or_else(|_| PathBuf::from("voucher.db"))
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.extractor, ExtractorConfig::default());
        assert!(config.store.path.ends_with("voucher.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.verifier, VerifierConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[extractor]\nmax_concurrency = 2\n\n[settings]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.extractor.max_concurrency, 2);
        assert_eq!(config.extractor.chunk_size, ExtractorConfig::default().chunk_size);
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(config.settings.color);
    }

    #[test]
    fn test_invalid_section_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[extractor]\nmax_concurrency = 0\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("[extractor]"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.settings.color = false;
        config.store.path = dir.path().join("results.db");
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert!(!loaded.settings.color);
        assert_eq!(loaded.store.path, dir.path().join("results.db"));
    }
}
