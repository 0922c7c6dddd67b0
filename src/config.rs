//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load environment variables: {0}")]
    EnvLoad(#[from] dotenvy::Error),

    #[error("Missing required value: {0}")]
    MissingVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Source database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Database used for the initial connection and for listing databases.
    /// It does not narrow extraction; `--database` does.
    pub database: String,
    pub use_tls: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            database: "postgres".to_string(),
            use_tls: false,
        }
    }
}

/// What to extract from each database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    pub schema: String,
    /// `None` keeps the built-in exclusion patterns
    pub exclude_patterns: Option<Vec<String>>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
            exclude_patterns: None,
        }
    }
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub sqlite_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sqlite_dir: PathBuf::from("./sqlite_output"),
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub extract: ExtractConfig,
    pub output: OutputConfig,
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first if present
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut database = if let Some(url) = get("DATABASE_URL") {
            Self::parse_database_url(&url)?
        } else {
            let defaults = DatabaseConfig::default();
            DatabaseConfig {
                host: get("DB_HOST").unwrap_or(defaults.host),
                port: match get("DB_PORT") {
                    Some(p) => p
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue(format!("DB_PORT={}", p)))?,
                    None => defaults.port,
                },
                user: get("DB_USER_NAME").unwrap_or(defaults.user),
                password: lookup("DB_USER_PASS").unwrap_or_default(),
                database: get("DB_NAME").unwrap_or(defaults.database),
                use_tls: false,
            }
        };

        if let Some(mode) = get("DB_SSLMODE") {
            match mode.trim().to_ascii_lowercase().as_str() {
                "require" => database.use_tls = true,
                "disable" | "prefer" => {}
                other => {
                    return Err(ConfigError::InvalidValue(format!("DB_SSLMODE={}", other)));
                }
            }
        }

        let extract = ExtractConfig {
            schema: get("DB_SCHEMA").unwrap_or_else(|| ExtractConfig::default().schema),
            exclude_patterns: lookup("EXCLUDE_PATTERNS").map(|s| split_list(&s)),
        };

        let output = OutputConfig {
            sqlite_dir: get("SQLITE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| OutputConfig::default().sqlite_dir),
        };

        Ok(Self {
            database,
            extract,
            output,
        })
    }

    /// Parse a DATABASE_URL connection string (postgresql://...)
    fn parse_database_url(url: &str) -> Result<DatabaseConfig, ConfigError> {
        let parsed = url::Url::parse(url).map_err(|_| {
            ConfigError::InvalidValue(
                "Invalid DATABASE_URL format (expected postgresql://...)".to_string(),
            )
        })?;

        if !matches!(parsed.scheme(), "postgres" | "postgresql") {
            return Err(ConfigError::InvalidValue(format!(
                "Unsupported DATABASE_URL scheme: {}",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| ConfigError::MissingVar("host in DATABASE_URL".to_string()))?
            .to_string();

        let user = if parsed.username().is_empty() {
            DatabaseConfig::default().user
        } else {
            parsed.username().to_string()
        };

        let database = match parsed.path().trim_start_matches('/') {
            "" => DatabaseConfig::default().database,
            db => db.to_string(),
        };

        let use_tls = parsed
            .query_pairs()
            .any(|(k, v)| k == "sslmode" && v == "require");

        Ok(DatabaseConfig {
            host,
            port: parsed.port().unwrap_or(5432),
            user,
            password: parsed.password().unwrap_or_default().to_string(),
            database,
            use_tls,
        })
    }
}

/// Split a comma-separated list, dropping blanks
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings.database, DatabaseConfig::default());
        assert_eq!(settings.extract.schema, "public");
        assert!(settings.extract.exclude_patterns.is_none());
        assert_eq!(settings.output.sqlite_dir, PathBuf::from("./sqlite_output"));
    }

    #[test]
    fn test_individual_variables() {
        let settings = settings_from(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_NAME", "shop"),
            ("DB_USER_NAME", "reader"),
            ("DB_USER_PASS", "secret"),
            ("DB_SSLMODE", "require"),
        ])
        .unwrap();

        assert_eq!(settings.database.host, "db.internal");
        assert_eq!(settings.database.port, 6543);
        assert_eq!(settings.database.database, "shop");
        assert_eq!(settings.database.user, "reader");
        assert_eq!(settings.database.password, "secret");
        assert!(settings.database.use_tls);
    }

    #[test]
    fn test_database_url_takes_precedence() {
        let settings = settings_from(&[
            ("DATABASE_URL", "postgresql://u:p@example.com:5433/app?sslmode=require"),
            ("DB_HOST", "ignored"),
        ])
        .unwrap();

        assert_eq!(settings.database.host, "example.com");
        assert_eq!(settings.database.port, 5433);
        assert_eq!(settings.database.user, "u");
        assert_eq!(settings.database.password, "p");
        assert_eq!(settings.database.database, "app");
        assert!(settings.database.use_tls);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = settings_from(&[("DB_PORT", "not-a-port")]);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_invalid_url_scheme_is_rejected() {
        let result = settings_from(&[("DATABASE_URL", "mysql://u@h/db")]);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_exclude_patterns_list() {
        let settings = settings_from(&[("EXCLUDE_PATTERNS", "tmp, staging ,,bak")]).unwrap();
        assert_eq!(
            settings.extract.exclude_patterns,
            Some(vec!["tmp".to_string(), "staging".to_string(), "bak".to_string()])
        );

        let settings = settings_from(&[("EXCLUDE_PATTERNS", "")]).unwrap();
        assert_eq!(settings.extract.exclude_patterns, Some(vec![]));
    }
}
