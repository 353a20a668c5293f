use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use emporium_cli::commands::{config, recommend, seed, smoke};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn seed_loads_demo_catalog_by_default() {
    with_env(&[], || {
        let result = seed::run(None);
        assert_eq!(result.exit_code, 0, "expected demo seed success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["users"], 3);
        assert_eq!(payload["data"]["products"], 6);

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("from demo"));
        assert!(message.contains("(electronics, books, toys, garden)"));
    });
}

#[test]
fn seed_reports_parse_failure_for_malformed_file() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[[products]]\nid = \"not a number\"\n").expect("write seed");

        let result = seed::run(Some(&path));
        assert_eq!(result.exit_code, 3, "expected seed parse failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "seed_parse");
    });
}

#[test]
fn seed_reports_duplicate_ids_as_store_errors() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("dupes.toml");
        fs::write(
            &path,
            r#"
[[products]]
id = 4
name = "Lamp"
category = "home"
price = "19.99"
inventory = 2

[[products]]
id = 4
name = "Rug"
category = "home"
price = "49.00"
inventory = 1
"#,
        )
        .expect("write seed");

        let result = seed::run(Some(&path));
        assert_eq!(result.exit_code, 4, "expected store failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "duplicate_key");
    });
}

#[test]
fn seed_fails_fast_on_invalid_config() {
    with_env(&[("EMPORIUM_STORE_BROWSING_CAPACITY", "0")], || {
        let result = seed::run(None);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn smoke_passes_against_demo_catalog() {
    with_env(&[], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 0, "expected smoke success: {}", result.output);

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["command"], "smoke");
        assert_eq!(payload["status"], "pass");

        let checks = payload["checks"].as_array().expect("checks array");
        let names: Vec<&str> = checks.iter().filter_map(|check| check["name"].as_str()).collect();
        assert_eq!(
            names,
            vec![
                "config_validation",
                "seed_catalog",
                "login",
                "browse",
                "purchase",
                "purchase_history",
                "recommend",
                "logout",
            ]
        );
        assert!(checks.iter().all(|check| check["status"] == "pass"));
        assert!(result.output.starts_with("smoke: 8/8 checks passed"));
    });
}

#[test]
fn smoke_skips_scenario_when_config_is_invalid() {
    with_env(&[("EMPORIUM_STORE_BUCKET_COUNT", "0")], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 6, "expected smoke failure code");

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["status"], "fail");

        let checks = payload["checks"].as_array().expect("checks array");
        assert_eq!(checks[0]["name"], "config_validation");
        assert_eq!(checks[0]["status"], "fail");
        assert!(checks[1..].iter().all(|check| check["status"] == "skipped"));
    });
}

#[test]
fn smoke_fails_when_history_cannot_hold_browsed_categories() {
    with_env(&[("EMPORIUM_STORE_BROWSING_CAPACITY", "1")], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 6, "expected smoke failure code");

        let payload = parse_payload(last_line(&result.output));
        let checks = payload["checks"].as_array().expect("checks array");
        let browse = checks.iter().find(|check| check["name"] == "browse").expect("browse check");
        assert_eq!(browse["status"], "fail");
        assert!(browse["message"].as_str().unwrap_or("").contains("books"));

        let logout = checks.iter().find(|check| check["name"] == "logout").expect("logout check");
        assert_eq!(logout["status"], "skipped");
    });
}

#[test]
fn recommend_lists_products_per_browsed_category() {
    with_env(&[], || {
        let categories = vec!["electronics".to_string(), "garden".to_string()];
        let result = recommend::run(&categories, None, None);
        assert_eq!(result.exit_code, 0, "expected recommendation success: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["user_id"], 1);
        assert_eq!(payload["data"]["browsed"], serde_json::json!(["electronics", "garden"]));

        let sections = payload["data"]["sections"].as_array().expect("sections");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0]["category"], "electronics");
        let electronics: Vec<i64> = sections[0]["products"]
            .as_array()
            .expect("products")
            .iter()
            .filter_map(|product| product["id"].as_i64())
            .collect();
        assert_eq!(electronics, vec![101, 1]);
        assert_eq!(sections[1]["products"][0]["name"], "Trowel");
    });
}

#[test]
fn recommend_keeps_empty_sections_for_unknown_categories() {
    with_env(&[], || {
        let categories = vec!["furniture".to_string()];
        let result = recommend::run(&categories, Some(2), None);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["user_id"], 2);
        assert_eq!(payload["data"]["sections"][0]["products"], serde_json::json!([]));
    });
}

#[test]
fn recommend_rejects_more_categories_than_history_holds() {
    with_env(&[], || {
        let categories: Vec<String> = (0..11).map(|n| format!("category-{n}")).collect();
        let result = recommend::run(&categories, None, None);
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "buffer_full");
    });
}

#[test]
fn recommend_reports_unknown_user() {
    with_env(&[], || {
        let categories = vec!["books".to_string()];
        let result = recommend::run(&categories, Some(999), None);
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "not_found");
    });
}

#[test]
fn config_output_attributes_env_overrides() {
    with_env(&[("EMPORIUM_STORE_BROWSING_CAPACITY", "25")], || {
        let output = config::run();

        assert!(output.starts_with("effective config"));
        assert!(output.contains(
            "- store.browsing_capacity = 25 (source: env (EMPORIUM_STORE_BROWSING_CAPACITY))"
        ));
        assert!(output.contains("- store.bucket_count = 100 (source: default)"));
    });
}

#[test]
fn config_output_reports_validation_failure() {
    with_env(&[("EMPORIUM_STORE_DUPLICATE_KEYS", "sometimes")], || {
        let output = config::run();
        assert!(output.starts_with("config validation failed"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid json")
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "EMPORIUM_STORE_BUCKET_COUNT",
        "EMPORIUM_STORE_BROWSING_CAPACITY",
        "EMPORIUM_STORE_DUPLICATE_KEYS",
        "EMPORIUM_STORE_CLEAR_HISTORY_ON_LOGOUT",
        "EMPORIUM_LOGGING_LEVEL",
        "EMPORIUM_LOGGING_FORMAT",
        "EMPORIUM_LOG_LEVEL",
        "EMPORIUM_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
