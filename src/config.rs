use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ModuleError, Result};

/// Optional settings file. Every table may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub logging: LoggingConfig,
}

/// Provider fallbacks used when neither the arguments nor the environment
/// carry a value.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub validate_certs: Option<bool>,
    pub http_request_timeout: Option<u64>,
    pub max_retries: Option<u32>,
    pub wapi_version: Option<String>,
    pub max_results: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the daily JSON log file; no file logging when unset
    pub dir: Option<String>,
    /// Filter used when RUST_LOG is not set
    pub level: Option<String>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(config_path) = path else {
            return Ok(Config::default());
        };
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ModuleError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_path_yields_defaults() {
        let config = Config::load(None).unwrap();
        assert!(config.provider.host.is_none());
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn loads_provider_and_logging_tables() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[provider]
host = "nios.example.com"
username = "admin"
wapi_version = "2.12"

[logging]
level = "debug"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.provider.host.as_deref(), Some("nios.example.com"));
        assert_eq!(config.provider.wapi_version.as_deref(), Some("2.12"));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert!(config.provider.password.is_none());
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let err = Config::load(Some(Path::new("/nonexistent/nios.toml"))).unwrap_err();
        assert!(matches!(err, ModuleError::Config(_)));
    }

    #[test]
    fn unknown_provider_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[provider]\nhostname = \"x\"").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ModuleError::Toml(_)));
    }
}
