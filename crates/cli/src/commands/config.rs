use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use innerspace_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILE, NESTED_CONFIG_FILE};
use secrecy::ExposeSecret;
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

struct ConfigField {
    key: &'static str,
    value: String,
    env_key: &'static str,
}

impl ConfigField {
    fn new(key: &'static str, value: impl Into<String>, env_key: &'static str) -> Self {
        Self { key, value: value.into(), env_key }
    }
}

pub fn run() -> CommandResult {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => CommandResult { exit_code: 0, output: render(&config) },
        Err(error) => CommandResult {
            exit_code: EXIT_CONFIG,
            output: format!("config validation failed: {error}"),
        },
    }
}

pub fn render(config: &AppConfig) -> String {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(config) {
        let source = field_source(
            field.key,
            field.env_key,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }
    lines.push(format!("- whatsapp.messages_endpoint = {} (derived)", config.messages_endpoint()));

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<ConfigField> {
    let whatsapp = &config.whatsapp;
    let app_secret = match &whatsapp.app_secret {
        Some(secret) => redact_token(secret.expose_secret()),
        None => "<unset> (signature checks disabled)".to_string(),
    };

    vec![
        ConfigField::new("database.url", &config.database.url, "INNERSPACE_DATABASE_URL"),
        ConfigField::new(
            "database.max_connections",
            config.database.max_connections.to_string(),
            "INNERSPACE_DATABASE_MAX_CONNECTIONS",
        ),
        ConfigField::new(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            "INNERSPACE_DATABASE_TIMEOUT_SECS",
        ),
        ConfigField::new(
            "whatsapp.access_token",
            redact_token(whatsapp.access_token.expose_secret()),
            "INNERSPACE_WHATSAPP_ACCESS_TOKEN",
        ),
        ConfigField::new(
            "whatsapp.phone_number_id",
            &whatsapp.phone_number_id,
            "INNERSPACE_WHATSAPP_PHONE_NUMBER_ID",
        ),
        ConfigField::new(
            "whatsapp.verify_token",
            redact_token(whatsapp.verify_token.expose_secret()),
            "INNERSPACE_WHATSAPP_VERIFY_TOKEN",
        ),
        ConfigField::new("whatsapp.app_secret", app_secret, "INNERSPACE_WHATSAPP_APP_SECRET"),
        ConfigField::new(
            "whatsapp.api_base_url",
            &whatsapp.api_base_url,
            "INNERSPACE_WHATSAPP_API_BASE_URL",
        ),
        ConfigField::new(
            "whatsapp.api_version",
            &whatsapp.api_version,
            "INNERSPACE_WHATSAPP_API_VERSION",
        ),
        ConfigField::new(
            "whatsapp.timeout_secs",
            whatsapp.timeout_secs.to_string(),
            "INNERSPACE_WHATSAPP_TIMEOUT_SECS",
        ),
        ConfigField::new(
            "server.bind_address",
            &config.server.bind_address,
            "INNERSPACE_SERVER_BIND_ADDRESS",
        ),
        ConfigField::new("server.port", config.server.port.to_string(), "INNERSPACE_SERVER_PORT"),
        ConfigField::new(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            "INNERSPACE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        ),
        ConfigField::new(
            "conversation.idle_timeout_secs",
            config.conversation.idle_timeout_secs.to_string(),
            "INNERSPACE_CONVERSATION_IDLE_TIMEOUT_SECS",
        ),
        ConfigField::new(
            "conversation.sweep_interval_secs",
            config.conversation.sweep_interval_secs.to_string(),
            "INNERSPACE_CONVERSATION_SWEEP_INTERVAL_SECS",
        ),
        ConfigField::new("logging.level", &config.logging.level, "INNERSPACE_LOGGING_LEVEL"),
        ConfigField::new(
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            "INNERSPACE_LOGGING_FORMAT",
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [DEFAULT_CONFIG_FILE, NESTED_CONFIG_FILE].into_iter().map(PathBuf::from).find(|p| p.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
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

/// Keeps the first four characters of long secrets so operators can tell tokens apart.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if trimmed.chars().count() > 12 {
        let prefix = trimmed.chars().take(4).collect::<String>();
        return format!("{prefix}***");
    }

    "<redacted>".to_string()
}
