use std::env;
use std::fs;
use std::path::Path;

use faqbot_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

/// One reported setting: dotted key, rendered value, env var, and legacy flat key.
struct Field {
    key: &'static str,
    value: String,
    env_key: &'static str,
    legacy_key: Option<&'static str>,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let llm_api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    let signing_secret =
        if config.slack.signing_secret.expose_secret().is_empty() { "<empty>" } else { "<redacted>" };

    let fields = [
        Field {
            key: "database.url",
            value: config.database.url.clone(),
            env_key: "FAQBOT_DATABASE_URL",
            legacy_key: None,
        },
        Field {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            env_key: "FAQBOT_DATABASE_MAX_CONNECTIONS",
            legacy_key: None,
        },
        Field {
            key: "slack.bot_token",
            value: redact_token(config.slack.bot_token.expose_secret()),
            env_key: "FAQBOT_SLACK_BOT_TOKEN",
            legacy_key: Some("SLACK_BOT_TOKEN"),
        },
        Field {
            key: "slack.signing_secret",
            value: signing_secret.to_string(),
            env_key: "FAQBOT_SLACK_SIGNING_SECRET",
            legacy_key: Some("SLACK_SIGNING_SECRET"),
        },
        Field {
            key: "slack.api_base_url",
            value: config.slack.api_base_url.clone(),
            env_key: "FAQBOT_SLACK_API_BASE_URL",
            legacy_key: None,
        },
        Field {
            key: "llm.api_key",
            value: llm_api_key.to_string(),
            env_key: "FAQBOT_LLM_API_KEY",
            legacy_key: Some("OPENAI_API_KEY"),
        },
        Field {
            key: "llm.base_url",
            value: config.llm.base_url.clone(),
            env_key: "FAQBOT_LLM_BASE_URL",
            legacy_key: None,
        },
        Field {
            key: "llm.model",
            value: config.llm.model.clone(),
            env_key: "FAQBOT_LLM_MODEL",
            legacy_key: None,
        },
        Field {
            key: "llm.timeout_secs",
            value: config.llm.timeout_secs.to_string(),
            env_key: "FAQBOT_LLM_TIMEOUT_SECS",
            legacy_key: None,
        },
        Field {
            key: "bot.product_name",
            value: config.bot.product_name.clone(),
            env_key: "FAQBOT_BOT_PRODUCT_NAME",
            legacy_key: None,
        },
        Field {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_key: "FAQBOT_SERVER_BIND_ADDRESS",
            legacy_key: None,
        },
        Field {
            key: "server.http_port",
            value: config.server.http_port.to_string(),
            env_key: "FAQBOT_SERVER_HTTP_PORT",
            legacy_key: None,
        },
        Field {
            key: "server.slack_events_port",
            value: config.server.slack_events_port.to_string(),
            env_key: "FAQBOT_SERVER_SLACK_EVENTS_PORT",
            legacy_key: None,
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_key: "FAQBOT_LOGGING_LEVEL",
            legacy_key: None,
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_key: "FAQBOT_LOGGING_FORMAT",
            legacy_key: None,
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in &fields {
        let source = field_source(
            field,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    field: &Field,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(field.env_key).is_some() {
        return format!("env ({})", field.env_key);
    }

    if let Some(doc) = config_file_doc {
        let in_file = contains_path(doc, field.key)
            || field.legacy_key.is_some_and(|legacy| doc.get(legacy).is_some());
        if in_file {
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

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
