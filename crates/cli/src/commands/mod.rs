pub mod config;
pub mod recommend;
pub mod seed;
pub mod smoke;

use std::path::Path;

use emporium_core::config::{AppConfig, LoadOptions};
use emporium_core::fixtures::{CatalogSeed, SeedError};
use emporium_core::StoreError;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<T: Serialize> {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with(command, message, None::<()>)
    }

    pub fn success_with<T: Serialize>(
        command: &str,
        message: impl Into<String>,
        data: Option<T>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome::<()> {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Store outcomes carry their own class and user-facing message.
    pub fn store_failure(command: &str, error: &StoreError, exit_code: u8) -> Self {
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            exit_code,
        )
    }
}

fn serialize_payload<T: Serialize>(payload: CommandOutcome<T>) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn load_seed(command: &str, file: Option<&Path>) -> Result<CatalogSeed, CommandResult> {
    let Some(path) = file else {
        return Ok(CatalogSeed::demo());
    };

    CatalogSeed::from_path(path).map_err(|error| {
        CommandResult::failure(command, "seed_parse", error.to_string(), 3)
    })
}

pub(crate) fn seed_failure(command: &str, error: &SeedError) -> CommandResult {
    match error {
        SeedError::Store(store_error) => CommandResult::store_failure(command, store_error, 4),
        SeedError::Invalid(message) => {
            CommandResult::failure(command, "seed_validation", message.clone(), 4)
        }
        SeedError::ReadFile { .. } | SeedError::ParseFile { .. } => {
            CommandResult::failure(command, "seed_parse", error.to_string(), 3)
        }
    }
}

#[cfg(test)]
mod tests {
    use emporium_core::{ProductId, StoreError};
    use serde_json::Value;

    use super::CommandResult;

    #[test]
    fn store_failure_carries_class_and_message() {
        let error = StoreError::InsufficientInventory {
            product_id: ProductId(3),
            requested: 4,
            available: 1,
        };
        let result = CommandResult::store_failure("purchase", &error, 4);
        let payload: Value = serde_json::from_str(&result.output).expect("json payload");

        assert_eq!(result.exit_code, 4);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "insufficient_inventory");
        assert!(payload["message"]
            .as_str()
            .unwrap_or_default()
            .starts_with("Insufficient inventory"));
        assert!(payload.get("data").is_none());
    }

    #[test]
    fn success_payload_embeds_data() {
        let result = CommandResult::success_with("seed", "loaded", Some(vec![1, 2]));
        let payload: Value = serde_json::from_str(&result.output).expect("json payload");

        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"], serde_json::json!([1, 2]));
        assert!(payload["error_class"].is_null());
    }
}
