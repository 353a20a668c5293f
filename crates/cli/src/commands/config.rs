use std::env;
use std::fs;
use std::path::Path;

use emporium_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "store.bucket_count",
        &config.store.bucket_count.to_string(),
        source("store.bucket_count", &["EMPORIUM_STORE_BUCKET_COUNT"]),
    ));
    lines.push(render_line(
        "store.browsing_capacity",
        &config.store.browsing_capacity.to_string(),
        source("store.browsing_capacity", &["EMPORIUM_STORE_BROWSING_CAPACITY"]),
    ));
    lines.push(render_line(
        "store.duplicate_keys",
        &format!("{:?}", config.store.duplicate_keys),
        source("store.duplicate_keys", &["EMPORIUM_STORE_DUPLICATE_KEYS"]),
    ));
    lines.push(render_line(
        "store.clear_history_on_logout",
        &config.store.clear_history_on_logout.to_string(),
        source("store.clear_history_on_logout", &["EMPORIUM_STORE_CLEAR_HISTORY_ON_LOGOUT"]),
    ));
    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["EMPORIUM_LOGGING_LEVEL", "EMPORIUM_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["EMPORIUM_LOGGING_FORMAT", "EMPORIUM_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let from_env = env_keys
        .iter()
        .find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = from_env {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
