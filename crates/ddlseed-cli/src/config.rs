use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ddlseed_generate::GenerateOptions;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "ddlseed.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generation: GenerationSettings,
    pub database: DatabaseSettings,
    pub formatter: FormatterSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub default_rows: u64,
    pub max_attempts_row: u32,
    pub seed: Option<u64>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        let options = GenerateOptions::default();
        Self {
            default_rows: options.default_rows,
            max_attempts_row: options.max_attempts_row,
            seed: options.seed,
        }
    }
}

impl GenerationSettings {
    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            default_rows: self.default_rows,
            max_attempts_row: self.max_attempts_row,
            seed: self.seed,
            reference_time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout_secs: 10,
        }
    }
}

/// External formatter that normalizes the DDL into delimited statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterSettings {
    pub enabled: bool,
    pub command: String,
    pub args: Vec<String>,
}

impl Default for FormatterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "pg_format".to_string(),
            args: vec!["-N".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Fallback filter when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load settings from `path`, else from [`DEFAULT_CONFIG_FILE`] when it
/// exists, else defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                return Ok(Settings::default());
            }
            fallback
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    parse_settings(&content).map_err(|source| ConfigError::Parse { path, source })
}

pub fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = parse_settings("").expect("parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.generation.default_rows, 100);
        assert_eq!(settings.generation.max_attempts_row, 10);
        assert_eq!(settings.formatter.command, "pg_format");
        assert_eq!(settings.formatter.args, vec!["-N".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = parse_settings(
            r#"
[generation]
seed = 7

[database]
max_connections = 2

[logging]
json = true
"#,
        )
        .expect("parse");
        assert_eq!(settings.generation.seed, Some(7));
        assert_eq!(settings.generation.default_rows, 100);
        assert_eq!(settings.database.max_connections, 2);
        assert_eq!(settings.database.acquire_timeout_secs, 10);
        assert!(settings.logging.json);
        assert_eq!(settings.logging.level, "info");
        assert!(settings.formatter.enabled);

        let options = settings.generation.options();
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.reference_time, None);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(parse_settings("[generation]\ndefault_rows = \"many\"").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_settings(Some(Path::new("/nonexistent/ddlseed.toml")))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
