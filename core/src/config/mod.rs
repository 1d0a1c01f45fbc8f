use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const STEPWISE_DIR: &str = ".stepwise";

/// The only credential the agent needs. Read from the environment, never from the config file.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    pub model_secs: u64,
    pub command_secs: u64,
    pub deploy_secs: u64,
    pub weather_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            model_secs: 120,
            command_secs: 300,
            deploy_secs: 900,
            weather_secs: 15,
        }
    }
}

impl TimeoutConfig {
    pub fn model(&self) -> Duration {
        Duration::from_secs(self.model_secs)
    }

    pub fn command(&self) -> Duration {
        Duration::from_secs(self.command_secs)
    }

    pub fn deploy(&self) -> Duration {
        Duration::from_secs(self.deploy_secs)
    }

    pub fn weather(&self) -> Duration {
        Duration::from_secs(self.weather_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Directory tools resolve relative paths against. Unset means the current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_dir: Option<PathBuf>,
    pub max_steps: usize,
    pub max_protocol_retries: usize,
    pub require_confirmation: bool,
    pub weather_base_url: String,
    pub timeouts: TimeoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: "gpt-4.1".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: None,
            workspace_dir: None,
            max_steps: 40,
            max_protocol_retries: 3,
            require_confirmation: true,
            weather_base_url: "https://wttr.in".to_string(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".into()));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid("max_steps must be at least 1".into()));
        }
        if let Some(t) = self.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(ConfigError::Invalid(format!(
                "temperature must be between 0 and 2, got {t}"
            )));
        }
        Ok(())
    }

    pub fn workspace(&self) -> PathBuf {
        self.workspace_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn get_stepwise_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(STEPWISE_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_stepwise_dir().join("config.toml")
}

pub fn get_history_path() -> PathBuf {
    get_stepwise_dir().join("history.txt")
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

/// Loads the config at `path`, or the default location. A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    match std::fs::read_to_string(&config_path) {
        Ok(content) => Config::from_toml(&content, &config_path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && path.is_none() => {
            tracing::debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            Ok(Config::default())
        }
        Err(source) => Err(ConfigError::Read {
            path: config_path,
            source,
        }),
    }
}

/// Like [`load_config`], but a missing file at an explicit path also yields the defaults.
/// Used by `init`, which may be creating that file. Unreadable or invalid files are still errors.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match load_config(path) {
        Err(ConfigError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(Config::default())
        }
        other => other,
    }
}

pub fn save_config(config: &Config, path: Option<&Path>) -> anyhow::Result<PathBuf> {
    use anyhow::Context;

    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory at {}", parent.display())
        })?;
    }

    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(config_path)
}

/// Reads the API key once at startup. Missing or blank is a fatal configuration error.
pub fn resolve_api_key() -> Result<String, ConfigError> {
    resolve_api_key_with(|name| std::env::var(name).ok())
}

pub fn resolve_api_key_with(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    match lookup(API_KEY_ENV) {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ConfigError::MissingCredential(API_KEY_ENV)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml(
            "model = \"gpt-4o-mini\"\n[timeouts]\ncommand_secs = 5\n",
            Path::new("config.toml"),
        )
        .unwrap();

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeouts.command_secs, 5);
        assert_eq!(config.timeouts.model_secs, 120);
        assert_eq!(config.max_protocol_retries, 3);
        assert!(config.require_confirmation);
    }

    #[test]
    fn rejects_zero_max_steps() {
        let err = Config::from_toml("max_steps = 0", Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_toml() {
        let err = Config::from_toml("model = ", Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(Some(&tmp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        let config = Config {
            model: "gpt-4o".into(),
            require_confirmation: false,
            ..Default::default()
        };

        save_config(&config, Some(&path)).unwrap();
        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn api_key_required() {
        let err = resolve_api_key_with(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(API_KEY_ENV)));

        let err = resolve_api_key_with(|_| Some("   ".into())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(_)));

        let key = resolve_api_key_with(|name| {
            assert_eq!(name, API_KEY_ENV);
            Some("sk-test\n".into())
        })
        .unwrap();
        assert_eq!(key, "sk-test");
    }

    #[test]
    fn init_starts_from_defaults_when_file_is_missing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fresh.toml");
        assert_eq!(
            load_config_or_default(Some(&path)).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn init_refuses_to_replace_a_broken_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "max_steps = 12
base_url = [oops
").unwrap();

        assert!(matches!(
            load_config_or_default(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }
}
