//! Configuration management for the Palisade host.
//!
//! Handles loading and validation of host configuration from a TOML file.
//! A missing file is replaced with a written-out default so operators have
//! something concrete to edit.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Command system settings
    pub commands: CommandSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

/// Command system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSettings {
    /// Names no plugin may register, in addition to the built-in set
    #[serde(default = "default_restricted")]
    pub restricted: Vec<String>,
    /// Language files to load into the message catalog at startup
    #[serde(default)]
    pub language_files: Vec<LanguageFile>,
}

/// A language file entry: which language a JSON message map belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageFile {
    /// Language code (e.g. "en", "de")
    pub language: String,
    /// Path to a JSON map of message keys to templates
    pub path: String,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

fn default_restricted() -> Vec<String> {
    vec![String::new()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            commands: CommandSettings {
                restricted: default_restricted(),
                language_files: vec![],
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at
    /// the specified path and returns the default configuration.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Create default config file
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        // Validate language file entries
        for file in &self.commands.language_files {
            if file.language.trim().is_empty() {
                return Err(format!(
                    "Language file '{}' has an empty language code",
                    file.path
                ));
            }
            if file.path.trim().is_empty() {
                return Err(format!(
                    "Language '{}' has an empty file path",
                    file.language
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;
    use tokio::fs;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.commands.restricted, vec![String::new()]);
        assert!(config.commands.language_files.is_empty());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "chatty".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid log level"));
    }

    #[test]
    fn test_validation_valid_log_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let mut config = AppConfig::default();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "Level '{}' should be valid", level);
        }
    }

    #[test]
    fn test_validation_language_file_entries() {
        let mut config = AppConfig::default();
        config.commands.language_files.push(LanguageFile {
            language: "  ".to_string(),
            path: "lang/de.json".to_string(),
        });
        assert!(config.validate().is_err());

        config.commands.language_files[0] = LanguageFile {
            language: "de".to_string(),
            path: "".to_string(),
        };
        assert!(config.validate().is_err());

        config.commands.language_files[0] = LanguageFile {
            language: "de".to_string(),
            path: "lang/de.json".to_string(),
        };
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[commands]
restricted = ["", "give"]

[[commands.language_files]]
language = "de"
path = "lang/de.json"

[logging]
level = "debug"
json_format = true
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(&temp_file.path().to_path_buf())
            .await
            .unwrap();

        assert_eq!(config.commands.restricted, vec!["", "give"]);
        assert_eq!(config.commands.language_files.len(), 1);
        assert_eq!(config.commands.language_files[0].language, "de");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(path.exists());
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let toml_content = r#"
[commands]

[logging]
level = "info"
json_format = false
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.commands.restricted, vec![String::new()]);
        assert!(config.commands.language_files.is_empty());
    }
}
