use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "innerspace.toml";
pub const NESTED_CONFIG_FILE: &str = "config/innerspace.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub whatsapp: WhatsAppConfig,
    pub server: ServerConfig,
    pub conversation: ConversationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct WhatsAppConfig {
    pub access_token: SecretString,
    pub phone_number_id: String,
    pub verify_token: SecretString,
    /// Enables `X-Hub-Signature-256` checks on inbound deliveries when set.
    pub app_secret: Option<SecretString>,
    pub api_base_url: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ConversationConfig {
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Clone, Debug)]
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
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub whatsapp_access_token: Option<String>,
    pub whatsapp_phone_number_id: Option<String>,
    pub whatsapp_verify_token: Option<String>,
    pub whatsapp_app_secret: Option<String>,
    pub whatsapp_api_base_url: Option<String>,
    pub server_port: Option<u16>,
    pub idle_timeout_secs: Option<u64>,
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://innerspace.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            whatsapp: WhatsAppConfig {
                access_token: String::new().into(),
                phone_number_id: String::new(),
                verify_token: String::new().into(),
                app_secret: None,
                api_base_url: "https://graph.facebook.com".to_string(),
                api_version: "v18.0".to_string(),
                timeout_secs: 15,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                graceful_shutdown_secs: 15,
            },
            conversation: ConversationConfig { idle_timeout_secs: 1_800, sweep_interval_secs: 60 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
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
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    /// `{base}/{version}/{phone_number_id}/messages`
    pub fn messages_endpoint(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.whatsapp.api_base_url.trim_end_matches('/'),
            self.whatsapp.api_version.trim_matches('/'),
            self.whatsapp.phone_number_id
        )
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(whatsapp) = patch.whatsapp {
            if let Some(access_token) = whatsapp.access_token {
                self.whatsapp.access_token = secret_value(access_token);
            }
            if let Some(phone_number_id) = whatsapp.phone_number_id {
                self.whatsapp.phone_number_id = phone_number_id;
            }
            if let Some(verify_token) = whatsapp.verify_token {
                self.whatsapp.verify_token = secret_value(verify_token);
            }
            if let Some(app_secret) = whatsapp.app_secret {
                self.whatsapp.app_secret = Some(secret_value(app_secret));
            }
            if let Some(api_base_url) = whatsapp.api_base_url {
                self.whatsapp.api_base_url = api_base_url;
            }
            if let Some(api_version) = whatsapp.api_version {
                self.whatsapp.api_version = api_version;
            }
            if let Some(timeout_secs) = whatsapp.timeout_secs {
                self.whatsapp.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(conversation) = patch.conversation {
            if let Some(idle_timeout_secs) = conversation.idle_timeout_secs {
                self.conversation.idle_timeout_secs = idle_timeout_secs;
            }
            if let Some(sweep_interval_secs) = conversation.sweep_interval_secs {
                self.conversation.sweep_interval_secs = sweep_interval_secs;
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
        if let Some(value) = read_env("INNERSPACE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("INNERSPACE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_number("INNERSPACE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("INNERSPACE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_number("INNERSPACE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("INNERSPACE_WHATSAPP_ACCESS_TOKEN") {
            self.whatsapp.access_token = secret_value(value);
        }
        if let Some(value) = read_env("INNERSPACE_WHATSAPP_PHONE_NUMBER_ID") {
            self.whatsapp.phone_number_id = value;
        }
        if let Some(value) = read_env("INNERSPACE_WHATSAPP_VERIFY_TOKEN") {
            self.whatsapp.verify_token = secret_value(value);
        }
        if let Some(value) = read_env("INNERSPACE_WHATSAPP_APP_SECRET") {
            self.whatsapp.app_secret = Some(secret_value(value));
        }
        if let Some(value) = read_env("INNERSPACE_WHATSAPP_API_BASE_URL") {
            self.whatsapp.api_base_url = value;
        }
        if let Some(value) = read_env("INNERSPACE_WHATSAPP_API_VERSION") {
            self.whatsapp.api_version = value;
        }
        if let Some(value) = read_env("INNERSPACE_WHATSAPP_TIMEOUT_SECS") {
            self.whatsapp.timeout_secs = parse_number("INNERSPACE_WHATSAPP_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("INNERSPACE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("INNERSPACE_SERVER_PORT") {
            self.server.port = parse_number("INNERSPACE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("INNERSPACE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_number("INNERSPACE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("INNERSPACE_CONVERSATION_IDLE_TIMEOUT_SECS") {
            self.conversation.idle_timeout_secs =
                parse_number("INNERSPACE_CONVERSATION_IDLE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("INNERSPACE_CONVERSATION_SWEEP_INTERVAL_SECS") {
            self.conversation.sweep_interval_secs =
                parse_number("INNERSPACE_CONVERSATION_SWEEP_INTERVAL_SECS", &value)?;
        }

        let log_level =
            read_env("INNERSPACE_LOGGING_LEVEL").or_else(|| read_env("INNERSPACE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("INNERSPACE_LOGGING_FORMAT").or_else(|| read_env("INNERSPACE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(access_token) = overrides.whatsapp_access_token {
            self.whatsapp.access_token = secret_value(access_token);
        }
        if let Some(phone_number_id) = overrides.whatsapp_phone_number_id {
            self.whatsapp.phone_number_id = phone_number_id;
        }
        if let Some(verify_token) = overrides.whatsapp_verify_token {
            self.whatsapp.verify_token = secret_value(verify_token);
        }
        if let Some(app_secret) = overrides.whatsapp_app_secret {
            self.whatsapp.app_secret = Some(secret_value(app_secret));
        }
        if let Some(api_base_url) = overrides.whatsapp_api_base_url {
            self.whatsapp.api_base_url = api_base_url;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(idle_timeout_secs) = overrides.idle_timeout_secs {
            self.conversation.idle_timeout_secs = idle_timeout_secs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_whatsapp(&self.whatsapp)?;
        validate_server(&self.server)?;
        validate_conversation(&self.conversation)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || !matches!(chars.peek(), Some('{')) {
            output.push(ch);
            continue;
        }
        chars.next();

        let mut key = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(next) => key.push(next),
                None => return Err(ConfigError::UnterminatedInterpolation),
            }
        }

        let value =
            env::var(&key).map_err(|_| ConfigError::MissingEnvInterpolation { var: key })?;
        output.push_str(&value);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_whatsapp(whatsapp: &WhatsAppConfig) -> Result<(), ConfigError> {
    if whatsapp.access_token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "whatsapp.access_token is required. Create a system user token in Meta Business Settings > System Users".to_string(),
        ));
    }

    let phone_number_id = whatsapp.phone_number_id.trim();
    if phone_number_id.is_empty() || !phone_number_id.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ConfigError::Validation(
            "whatsapp.phone_number_id must be the numeric id shown under WhatsApp > API Setup (not the phone number itself)".to_string(),
        ));
    }

    if whatsapp.verify_token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "whatsapp.verify_token is required and must match the token entered in the webhook configuration".to_string(),
        ));
    }

    let empty_app_secret = whatsapp
        .app_secret
        .as_ref()
        .map(|secret| secret.expose_secret().trim().is_empty())
        .unwrap_or(false);
    if empty_app_secret {
        return Err(ConfigError::Validation(
            "whatsapp.app_secret is set but empty; remove it to disable signature checks".to_string(),
        ));
    }

    let base_url = whatsapp.api_base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "whatsapp.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    if !whatsapp.api_version.trim().starts_with('v') {
        return Err(ConfigError::Validation(
            "whatsapp.api_version must look like `v18.0`".to_string(),
        ));
    }

    if whatsapp.timeout_secs == 0 || whatsapp.timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "whatsapp.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_conversation(conversation: &ConversationConfig) -> Result<(), ConfigError> {
    if conversation.idle_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "conversation.idle_timeout_secs must be greater than zero".to_string(),
        ));
    }

    if conversation.sweep_interval_secs == 0
        || conversation.sweep_interval_secs > conversation.idle_timeout_secs
    {
        return Err(ConfigError::Validation(
            "conversation.sweep_interval_secs must be in range 1..=idle_timeout_secs".to_string(),
        ));
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

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    whatsapp: Option<WhatsAppPatch>,
    server: Option<ServerPatch>,
    conversation: Option<ConversationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct WhatsAppPatch {
    access_token: Option<String>,
    phone_number_id: Option<String>,
    verify_token: Option<String>,
    app_secret: Option<String>,
    api_base_url: Option<String>,
    api_version: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ConversationPatch {
    idle_timeout_secs: Option<u64>,
    sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
