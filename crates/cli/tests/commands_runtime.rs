use std::env;
use std::sync::{Mutex, OnceLock};

use faqbot_cli::commands::{config, doctor, migrate};
use serde_json::Value;

const VALID_ENV: [(&str, &str); 4] = [
    ("FAQBOT_SLACK_BOT_TOKEN", "xoxb-test"),
    ("FAQBOT_SLACK_SIGNING_SECRET", "signing-secret"),
    ("FAQBOT_LLM_API_KEY", "sk-test"),
    ("FAQBOT_DATABASE_URL", "sqlite::memory:"),
];

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&VALID_ENV, || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("bot_training_data"));
        assert!(message.contains("0 training records"));
    });
}

#[test]
fn migrate_returns_config_failure_without_credentials() {
    with_env(&[], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_is_invalid() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let report = parse_payload(&result.output);
        assert_eq!(report["overall_status"], "fail");
        let checks = report["checks"].as_array().expect("checks array");
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0]["name"], "config_validation");
        assert_eq!(checks[0]["status"], "fail");
        assert_eq!(checks[1]["name"], "training_store");
        assert_eq!(checks[1]["status"], "skipped");
    });
}

#[test]
fn doctor_reports_missing_training_table_on_fresh_database() {
    with_env(&VALID_ENV, || {
        let result = doctor::run(true);

        let report = parse_payload(&result.output);
        let checks = report["checks"].as_array().expect("checks array");
        let status_of = |name: &str| {
            checks
                .iter()
                .find(|check| check["name"] == name)
                .map(|check| check["status"].clone())
                .expect("check present")
        };
        assert_eq!(checks.len(), 2);
        assert_eq!(status_of("config_validation"), "pass");
        assert_eq!(status_of("training_store"), "fail");
        assert_eq!(result.exit_code, 1);
    });
}

#[test]
fn config_output_redacts_secrets() {
    with_env(&VALID_ENV, || {
        let output = config::run();

        assert!(output.contains("- slack.bot_token = xoxb-*** (source: env (FAQBOT_SLACK_BOT_TOKEN))"));
        assert!(output.contains("- llm.api_key = <redacted>"));
        assert!(output.contains("- server.http_port = 5000 (source: default)"));
        assert!(!output.contains("sk-test"));
        assert!(!output.contains("signing-secret"));
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
        "FAQBOT_DATABASE_URL",
        "FAQBOT_DATABASE_MAX_CONNECTIONS",
        "FAQBOT_DATABASE_TIMEOUT_SECS",
        "FAQBOT_SLACK_BOT_TOKEN",
        "FAQBOT_SLACK_SIGNING_SECRET",
        "FAQBOT_SLACK_API_BASE_URL",
        "FAQBOT_LLM_API_KEY",
        "FAQBOT_LLM_BASE_URL",
        "FAQBOT_LLM_MODEL",
        "FAQBOT_LLM_TIMEOUT_SECS",
        "FAQBOT_BOT_PRODUCT_NAME",
        "FAQBOT_SERVER_BIND_ADDRESS",
        "FAQBOT_SERVER_HTTP_PORT",
        "FAQBOT_SERVER_SLACK_EVENTS_PORT",
        "FAQBOT_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "FAQBOT_LOGGING_LEVEL",
        "FAQBOT_LOGGING_FORMAT",
        "FAQBOT_LOG_LEVEL",
        "FAQBOT_LOG_FORMAT",
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
