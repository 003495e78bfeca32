use std::env;
use std::sync::{Mutex, OnceLock};

use innerspace_cli::commands::{config, doctor, migrate, seed};
use serde_json::Value;

const CREDENTIALS: [(&str, &str); 3] = [
    ("INNERSPACE_WHATSAPP_ACCESS_TOKEN", "EAAGm0PX4ZCpsBAKZB1kZA"),
    ("INNERSPACE_WHATSAPP_PHONE_NUMBER_ID", "846227168563844"),
    ("INNERSPACE_WHATSAPP_VERIFY_TOKEN", "verify-me"),
];

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&valid_env("sqlite::memory:"), || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_without_credentials() {
    with_env(&[("INNERSPACE_DATABASE_URL", "sqlite::memory:".to_string())], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
        assert!(payload["message"].as_str().unwrap_or("").contains("whatsapp.access_token"));
    });
}

#[test]
fn seed_lists_demo_listings_with_visibility() {
    with_env(&valid_env("sqlite::memory:"), || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected seed success: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.starts_with("demo dataset loaded"));
        assert!(message.contains("Bangalore (discoverable)"));
        assert!(message.contains("Pune (pending review)"));
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("seed.db").display());

    with_env(&valid_env(&url), || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);

        assert_eq!(first_payload["message"], second_payload["message"]);
    });
}

#[test]
fn doctor_passes_after_migrate() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("doctor.db").display());

    with_env(&valid_env(&url), || {
        assert_eq!(migrate::run().exit_code, 0);

        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "doctor output: {}", result.output);

        let report = parse_payload(&result.output);
        assert_eq!(report["overall_status"], "pass");
        let names = report["checks"]
            .as_array()
            .expect("checks array")
            .iter()
            .map(|check| check["name"].as_str().unwrap_or("").to_string())
            .collect::<Vec<_>>();
        let expected = [
            "config_validation",
            "whatsapp_credentials",
            "database_connectivity",
            "database_schema",
        ];
        assert_eq!(names, expected);
    });
}

#[test]
fn doctor_flags_unmigrated_database() {
    with_env(&valid_env("sqlite::memory:"), || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 6);

        let report = parse_payload(&result.output);
        assert_eq!(report["overall_status"], "fail");
        assert_eq!(report["checks"][2]["status"], "pass");
        assert_eq!(report["checks"][3]["name"], "database_schema");
        assert_eq!(report["checks"][3]["status"], "fail");
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_is_invalid() {
    with_env(&[], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 6);
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation:"));
        assert!(result.output.contains("- [skip] database_connectivity:"));
    });
}

#[test]
fn config_redacts_secrets_and_attributes_sources() {
    with_env(&valid_env("sqlite::memory:"), || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);

        let output = result.output;
        assert!(output.contains(
            "- whatsapp.access_token = EAAG*** (source: env (INNERSPACE_WHATSAPP_ACCESS_TOKEN))"
        ));
        assert!(output.contains("- whatsapp.verify_token = <redacted>"));
        assert!(!output.contains("EAAGm0PX4ZCpsBAKZB1kZA"));
        assert!(output.contains("- server.port = 5000 (source: default)"));
        assert!(output.contains("- whatsapp.app_secret = <unset> (signature checks disabled)"));
        let endpoint = "https://graph.facebook.com/v18.0/846227168563844/messages";
        assert!(output.contains(&format!("- whatsapp.messages_endpoint = {endpoint} (derived)")));
    });
}

fn valid_env(database_url: &str) -> Vec<(&'static str, String)> {
    let mut vars = CREDENTIALS
        .iter()
        .map(|(key, value)| (*key, value.to_string()))
        .collect::<Vec<_>>();
    vars.push(("INNERSPACE_DATABASE_URL", database_url.to_string()));
    vars
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&'static str, String)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let keys = [
        "INNERSPACE_DATABASE_URL",
        "INNERSPACE_DATABASE_MAX_CONNECTIONS",
        "INNERSPACE_DATABASE_TIMEOUT_SECS",
        "INNERSPACE_WHATSAPP_ACCESS_TOKEN",
        "INNERSPACE_WHATSAPP_PHONE_NUMBER_ID",
        "INNERSPACE_WHATSAPP_VERIFY_TOKEN",
        "INNERSPACE_WHATSAPP_APP_SECRET",
        "INNERSPACE_WHATSAPP_API_BASE_URL",
        "INNERSPACE_WHATSAPP_API_VERSION",
        "INNERSPACE_WHATSAPP_TIMEOUT_SECS",
        "INNERSPACE_SERVER_BIND_ADDRESS",
        "INNERSPACE_SERVER_PORT",
        "INNERSPACE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "INNERSPACE_CONVERSATION_IDLE_TIMEOUT_SECS",
        "INNERSPACE_CONVERSATION_SWEEP_INTERVAL_SECS",
        "INNERSPACE_LOGGING_LEVEL",
        "INNERSPACE_LOGGING_FORMAT",
        "INNERSPACE_LOG_LEVEL",
        "INNERSPACE_LOG_FORMAT",
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
