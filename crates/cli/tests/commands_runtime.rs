use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use tempfile::TempDir;

use bookery_cli::commands::{doctor, list, migrate};
use bookery_cli::OrderArg;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("BOOKERY_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_with_invalid_database_url() {
    with_env(&[("BOOKERY_DATABASE_URL", "postgres://not-sqlite")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_flags_missing_schema_on_fresh_database() {
    with_env(&[("BOOKERY_DATABASE_URL", "sqlite::memory:")], || {
        let report: Value =
            serde_json::from_str(&doctor::run(true)).expect("doctor emits valid JSON");

        assert_eq!(report["overall_status"], "fail");
        assert_eq!(report["checks"][0]["name"], "config_validation");
        assert_eq!(report["checks"][0]["status"], "pass");
        assert_eq!(report["checks"][1]["name"], "database_connectivity");
        assert_eq!(report["checks"][1]["status"], "pass");
        assert_eq!(report["checks"][2]["name"], "schema_readiness");
        assert_eq!(report["checks"][2]["status"], "fail");
    });
}

#[test]
fn doctor_skips_database_checks_when_config_is_invalid() {
    with_env(&[("BOOKERY_DATABASE_URL", "postgres://not-sqlite")], || {
        let report: Value =
            serde_json::from_str(&doctor::run(true)).expect("doctor emits valid JSON");

        assert_eq!(report["overall_status"], "fail");
        assert_eq!(report["checks"][0]["status"], "fail");
        assert_eq!(report["checks"][1]["status"], "skipped");
        assert_eq!(report["checks"][2]["status"], "skipped");
    });
}

#[test]
fn migrate_then_doctor_and_list_pass_on_file_database() {
    let dir = TempDir::new().expect("tempdir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("bookery.db").display());

    with_env(&[("BOOKERY_DATABASE_URL", &url)], || {
        let migrated = migrate::run();
        assert_eq!(migrated.exit_code, 0, "migrate should succeed on a fresh file database");

        let report: Value =
            serde_json::from_str(&doctor::run(true)).expect("doctor emits valid JSON");
        assert_eq!(report["overall_status"], "pass");

        let listed = list::run(OrderArg::Schedule);
        assert_eq!(listed.exit_code, 0, "list should succeed after migrations");

        let payload = parse_payload(&listed.output);
        assert_eq!(payload["command"], "list");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["message"], "no active reservations");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "BOOKERY_DATABASE_URL",
        "BOOKERY_DATABASE_MAX_CONNECTIONS",
        "BOOKERY_DATABASE_TIMEOUT_SECS",
        "BOOKERY_SERVER_BIND_ADDRESS",
        "BOOKERY_SERVER_PORT",
        "BOOKERY_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "BOOKERY_DISPATCH_ARGUMENT_MODE",
        "BOOKERY_LOGGING_LEVEL",
        "BOOKERY_LOGGING_FORMAT",
        "BOOKERY_LOG_LEVEL",
        "BOOKERY_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, previous) in previous_values {
        match previous {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}
