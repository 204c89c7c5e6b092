use crate::api::DEFAULT_TIMEOUT;
use crate::error::ConfigError;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Default, Parser)]
#[command(name = "todo-tui", version, about = "Manage a remote todo list from the terminal")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Base URL of the API; todos live under <api-url>/todos
    #[arg(long)]
    pub api_url: Option<String>,
    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// config.toml
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            log_file: None,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("todo-tui").join("config.toml"))
}

/// Reads a config file. A missing file at the default location is fine; an
/// explicitly requested one must exist.
pub fn read_file_config(path: &Path, required: bool) -> Result<FileConfig, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(FileConfig::default())
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Loads defaults, then the config file, `.env`, the process environment
    /// and finally command-line flags, each overriding the one before.
    pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
        dotenv::dotenv().ok();

        let file = match (&cli.config, default_config_path()) {
            (Some(path), _) => read_file_config(path, true)?,
            (None, Some(path)) => read_file_config(&path, false)?,
            (None, None) => FileConfig::default(),
        };

        Config::resolve(file, |key| std::env::var(key).ok(), cli)
    }

    pub fn resolve<F>(file: FileConfig, env: F, cli: &Cli) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = file.api_url {
            config.api_url = url;
        }
        if let Some(secs) = file.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if file.log_file.is_some() {
            config.log_file = file.log_file;
        }

        if let Some(url) = env("TODO_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = url;
        }
        if let Some(raw) = env("TODO_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "TODO_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = env("TODO_LOG_FILE").filter(|v| !v.trim().is_empty()) {
            config.log_file = Some(PathBuf::from(path));
        }

        if let Some(url) = &cli.api_url {
            config.api_url = url.clone();
        }
        if let Some(secs) = cli.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = &cli.log_file {
            config.log_file = Some(path.clone());
        }

        if config.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs",
                value: "0".to_string(),
            });
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(FileConfig::default(), no_env, &Cli::default()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.api_url, "http://localhost:8080/api");
    }

    #[test]
    fn test_precedence_file_env_cli() {
        let file = FileConfig {
            api_url: Some("http://file:1/api".to_string()),
            timeout_secs: Some(3),
            log_file: Some(PathBuf::from("/tmp/file.log")),
        };
        let env: HashMap<&str, &str> = HashMap::from([
            ("TODO_API_URL", "http://env:2/api"),
            ("TODO_TIMEOUT_SECS", "4"),
        ]);
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let config = Config::resolve(file, lookup, &Cli::default()).unwrap();
        assert_eq!(config.api_url, "http://env:2/api");
        assert_eq!(config.timeout, Duration::from_secs(4));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/file.log")));

        let cli = Cli {
            api_url: Some("http://cli:3/api".to_string()),
            ..Cli::default()
        };
        let config = Config::resolve(FileConfig::default(), lookup, &cli).unwrap();
        assert_eq!(config.api_url, "http://cli:3/api");
    }

    #[test]
    fn test_invalid_env_timeout() {
        let lookup = |key: &str| (key == "TODO_TIMEOUT_SECS").then(|| "soon".to_string());
        let err = Config::resolve(FileConfig::default(), lookup, &Cli::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "TODO_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let cli = Cli {
            timeout_secs: Some(0),
            ..Cli::default()
        };
        assert!(Config::resolve(FileConfig::default(), no_env, &cli).is_err());
    }

    #[test]
    fn test_read_file_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = \"http://example:9000/api\"\ntimeout_secs = 5").unwrap();

        let config = read_file_config(file.path(), true).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://example:9000/api"));
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = ").unwrap();
        let err = read_file_config(file.path(), true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_only_errors_when_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert_eq!(read_file_config(&path, false).unwrap(), FileConfig::default());
        assert!(matches!(
            read_file_config(&path, true).unwrap_err(),
            ConfigError::Read { .. }
        ));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "todo-tui",
            "--api-url",
            "http://h:1/api",
            "--timeout-secs",
            "7",
        ]);
        assert_eq!(cli.api_url.as_deref(), Some("http://h:1/api"));
        assert_eq!(cli.timeout_secs, Some(7));
    }
}
