use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::browsing::DEFAULT_BROWSING_CAPACITY;
use crate::index::{DuplicatePolicy, DEFAULT_BUCKET_COUNT};

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["emporium.toml", "config/emporium.toml"];

const MAX_BUCKET_COUNT: usize = 65_536;
const MAX_BROWSING_CAPACITY: usize = 1_024;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub bucket_count: usize,
    pub browsing_capacity: usize,
    pub duplicate_keys: DuplicatePolicy,
    pub clear_history_on_logout: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bucket_count: Option<usize>,
    pub browsing_capacity: Option<usize>,
    pub duplicate_keys: Option<DuplicatePolicy>,
    pub clear_history_on_logout: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            browsing_capacity: DEFAULT_BROWSING_CAPACITY,
            duplicate_keys: DuplicatePolicy::Reject,
            clear_history_on_logout: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(bucket_count) = store.bucket_count {
                self.store.bucket_count = bucket_count;
            }
            if let Some(browsing_capacity) = store.browsing_capacity {
                self.store.browsing_capacity = browsing_capacity;
            }
            if let Some(duplicate_keys) = store.duplicate_keys {
                self.store.duplicate_keys = duplicate_keys;
            }
            if let Some(clear_history_on_logout) = store.clear_history_on_logout {
                self.store.clear_history_on_logout = clear_history_on_logout;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("EMPORIUM_STORE_BUCKET_COUNT") {
            self.store.bucket_count = parse_usize("EMPORIUM_STORE_BUCKET_COUNT", &value)?;
        }
        if let Some(value) = read_env("EMPORIUM_STORE_BROWSING_CAPACITY") {
            self.store.browsing_capacity =
                parse_usize("EMPORIUM_STORE_BROWSING_CAPACITY", &value)?;
        }
        if let Some(value) = read_env("EMPORIUM_STORE_DUPLICATE_KEYS") {
            self.store.duplicate_keys =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "EMPORIUM_STORE_DUPLICATE_KEYS".to_string(),
                    value: value.clone(),
                })?;
        }
        if let Some(value) = read_env("EMPORIUM_STORE_CLEAR_HISTORY_ON_LOGOUT") {
            self.store.clear_history_on_logout =
                parse_bool("EMPORIUM_STORE_CLEAR_HISTORY_ON_LOGOUT", &value)?;
        }

        let log_level =
            read_env("EMPORIUM_LOGGING_LEVEL").or_else(|| read_env("EMPORIUM_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("EMPORIUM_LOGGING_FORMAT").or_else(|| read_env("EMPORIUM_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bucket_count) = overrides.bucket_count {
            self.store.bucket_count = bucket_count;
        }
        if let Some(browsing_capacity) = overrides.browsing_capacity {
            self.store.browsing_capacity = browsing_capacity;
        }
        if let Some(duplicate_keys) = overrides.duplicate_keys {
            self.store.duplicate_keys = duplicate_keys;
        }
        if let Some(clear_history_on_logout) = overrides.clear_history_on_logout {
            self.store.clear_history_on_logout = clear_history_on_logout;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// The config file `load` would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Replaces every `${VAR}` with the variable's value. An unset variable or an
/// unclosed `${` is an error.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut rendered = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("${") {
        rendered.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let close = after_open.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;

        let var = &after_open[..close];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        rendered.push_str(&value);
        rest = &after_open[close + 1..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.bucket_count == 0 || store.bucket_count > MAX_BUCKET_COUNT {
        return Err(ConfigError::Validation(format!(
            "store.bucket_count must be in range 1..={MAX_BUCKET_COUNT}"
        )));
    }

    if store.browsing_capacity == 0 || store.browsing_capacity > MAX_BROWSING_CAPACITY {
        return Err(ConfigError::Validation(format!(
            "store.browsing_capacity must be in range 1..={MAX_BROWSING_CAPACITY}"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    store: Option<StorePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorePatch {
    bucket_count: Option<usize>,
    browsing_capacity: Option<usize>,
    duplicate_keys: Option<DuplicatePolicy>,
    clear_history_on_logout: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
