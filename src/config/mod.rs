use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path};

const ENV_PREFIX: &str = "NOTES_";
const DEFAULT_NARROW_BREAKPOINT: u16 = 768;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Explicit API base address, used as is
    #[serde(default)]
    pub api_base: Option<String>,
    /// Backend origin, `/api` is appended to it
    #[serde(default)]
    pub backend_origin: Option<String>,
    /// Display-only environment label
    #[serde(default)]
    pub env_label: Option<String>,
    /// Width below which list and editor are shown one at a time
    #[serde(default = "default_narrow_breakpoint")]
    pub narrow_breakpoint: u16,
}

const fn default_narrow_breakpoint() -> u16 {
    DEFAULT_NARROW_BREAKPOINT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: None,
            backend_origin: None,
            env_label: None,
            narrow_breakpoint: DEFAULT_NARROW_BREAKPOINT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),
}

impl Config {
    /// Base address every request path is appended to. Empty means
    /// same-origin relative paths.
    pub fn api_base_url(&self) -> String {
        if let Some(base) = non_empty(self.api_base.as_deref()) {
            return base.trim_end_matches('/').to_string();
        }

        if let Some(origin) = non_empty(self.backend_origin.as_deref()) {
            return format!("{}/api", origin.trim_end_matches('/'));
        }

        String::new()
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(Into::into)
    }

    pub fn from_env_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .map_err(Into::into)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Config::from_yaml(&contents)
}

pub fn load_config() -> Result<Config, ConfigError> {
    // Retrieve env variable
    let config_path =
        env::var("NOTES_CLIENT_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return load_file(Path::new(&config_path));
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_file(Path::new("config.yaml"));
    }

    // Fallback to environment variables
    tracing::debug!("No config file found, loading configuration from environment variables");
    Config::from_env_vars(env::vars())
}
