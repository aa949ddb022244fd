//! Configuration management for the CLI
//!
//! Settings come from, in increasing precedence:
//! - Default values
//! - A configuration file (TOML, YAML or JSON)
//! - Environment variables
//! - Command-line arguments

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the project configuration
pub const PROJECT_CONFIG: &str = ".sifmap.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for scope selection and mapping
    pub mapping: MappingConfig,

    pub output: OutputConfig,

    pub logging: LoggingConfig,
}

/// Caller-side defaults the rule tree itself does not carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Top-level scope to select from
    pub scope: String,

    /// SIF version used when none is given on the command line
    pub version: String,

    pub zone: Option<String>,

    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: String,

    /// Use colored output by default
    pub color: bool,

    /// Show progress bars when mapping many records
    pub progress: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    pub file: Option<PathBuf>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            scope: "Default".to_string(),
            version: "2.0".to_string(),
            zone: None,
            source: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
            progress: true,
        }
    }
}

/// Serialization of a configuration file, picked by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    fn of(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => Ok(Self::Toml),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "TOML, YAML or JSON".to_string(),
            }),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match FileFormat::of(path)? {
            FileFormat::Toml => toml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?,
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
            FileFormat::Json => serde_json::from_str(&content)?,
        };

        Ok(config)
    }

    /// Project config in the current directory, else the user config
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations, then
    /// apply environment overrides
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.apply_env();
        Ok(config)
    }

    /// `SIFMAP_SCOPE`, `SIFMAP_ZONE`, `SIFMAP_SOURCE` and `SIFMAP_OUTPUT_FORMAT`
    ///
    /// `SIFMAP_VERSION` is read by the `--sif-version` flag itself.
    pub fn apply_env(&mut self) {
        if let Ok(scope) = std::env::var("SIFMAP_SCOPE") {
            self.mapping.scope = scope;
        }
        if let Ok(zone) = std::env::var("SIFMAP_ZONE") {
            self.mapping.zone = Some(zone);
        }
        if let Ok(source) = std::env::var("SIFMAP_SOURCE") {
            self.mapping.source = Some(source);
        }
        if let Ok(format) = std::env::var("SIFMAP_OUTPUT_FORMAT") {
            self.output.format = format;
        }
    }

    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(PROJECT_CONFIG),
            PathBuf::from(".sifmap.yaml"),
            PathBuf::from(".sifmap.json"),
        ];

        if let Some(user) = Self::user_config_path() {
            paths.push(user);
        }

        paths
    }

    /// `<config dir>/sifmap/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sifmap").join("config.toml"))
    }

    /// First project configuration file present in the current directory
    pub fn find_project_config() -> Option<PathBuf> {
        Self::default_config_paths()
            .into_iter()
            .take(3)
            .find(|p| p.exists())
    }

    pub fn create_default_user_config() -> Result<PathBuf> {
        let path = Self::user_config_path()
            .ok_or_else(|| Error::config("Unable to determine user config directory"))?;
        Self::default().save(&path)?;
        Ok(path)
    }

    pub fn create_default_project_config() -> Result<PathBuf> {
        let path = PathBuf::from(PROJECT_CONFIG);
        Self::default().save(&path)?;
        Ok(path)
    }

    /// Save configuration to a file, format picked by extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match FileFormat::of(path)? {
            FileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
            FileFormat::Yaml => serde_yaml::to_string(self)?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mapping.scope, "Default");
        assert_eq!(config.mapping.version, "2.0");
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_save_and_load_every_format() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.mapping.zone = Some("MA_ZONE".to_string());
        config.mapping.version = "1.5r1".to_string();
        config.logging.format = Some("json".to_string());

        for name in ["config.toml", "config.yaml", "nested/config.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[mapping]\nzone = \"NH_ZONE\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.mapping.zone.as_deref(), Some("NH_ZONE"));
        assert_eq!(config.mapping.scope, "Default");
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_unsupported_and_missing_files() {
        let dir = TempDir::new().unwrap();
        let ini = dir.path().join("config.ini");
        std::fs::write(&ini, "").unwrap();

        assert!(matches!(Config::from_file(&ini), Err(Error::InvalidFormat { .. })));
        assert!(matches!(
            Config::from_file(&dir.path().join("absent.toml")),
            Err(Error::FileNotFound { .. })
        ));
    }
}
