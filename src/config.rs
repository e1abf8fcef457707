//! Configuration parsing and validation for arkchat.
//!
//! Configuration comes from an optional TOML file plus the process
//! environment, and is resolved exactly once at startup. The resulting
//! [`Config`] is immutable for the life of the process.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the upstream credential.
pub const CREDENTIAL_ENV_VAR: &str = "OPENAI_API_KEY";

/// Default OpenAI-compatible API base.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Root configuration structure.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8000")
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// The OpenAI credential.
///
/// Printing, logging or serializing it yields `[REDACTED]`; the value is
/// wiped from memory on drop. The only way to read it is `expose_secret`,
/// used once when building the `Authorization` header.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        ApiKey(SecretString::from(s))
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        ApiKey(SecretString::from(s))
    }
}

/// How the upstream credential was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySource {
    /// Key was a literal string in the config file
    Literal,
    /// Key contained ${VAR} references expanded from environment
    EnvExpanded,
    /// Key was picked up from the convention env var (holds var name)
    Convention(String),
    /// Config referenced a variable that is unset or empty (holds var name)
    Unresolved(String),
    /// No key available
    None,
}

impl KeySource {
    /// Whether a usable credential was found.
    pub fn is_configured(&self) -> bool {
        matches!(
            self,
            KeySource::Literal | KeySource::EnvExpanded | KeySource::Convention(_)
        )
    }
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Literal => write!(f, "config-literal"),
            KeySource::EnvExpanded => write!(f, "env-expanded"),
            KeySource::Convention(var) => write!(f, "convention ({})", var),
            KeySource::Unresolved(var) => write!(f, "unresolved ({})", var),
            KeySource::None => write!(f, "none"),
        }
    }
}

/// Upstream completion provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API (e.g., "https://api.openai.com/v1")
    pub base_url: String,
    /// Credential; `None` puts the relay in its unconfigured state
    pub api_key: Option<ApiKey>,
    /// Whole-request timeout in seconds; unset means no timeout
    pub timeout_secs: Option<u64>,
    /// Connect timeout in seconds; unset means no timeout
    pub connect_timeout_secs: Option<u64>,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

/// Landing page and static asset configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Directory served under /static
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            static_dir: default_static_dir(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable '{var}' referenced in '{field}' is not set")]
    EnvVar { var: String, field: String },

    #[error("Invalid ${{VAR}} reference in '{field}': {message}")]
    EnvSyntax { field: String, message: String },
}

/// Raw provider section deserialized directly from TOML.
/// Strings may contain `${VAR}` references not yet expanded.
#[derive(Debug, Default, Deserialize)]
pub struct RawProviderConfig {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
}

/// Raw configuration deserialized directly from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    provider: RawProviderConfig,
    #[serde(default)]
    web: WebConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

/// Substitute `${VAR}` references in a config value through `lookup`.
///
/// A bare `$` is left alone. A reference to an unset variable yields
/// [`ConfigError::EnvVar`]; malformed references (`${` without `}`, or
/// `${}`) yield [`ConfigError::EnvSyntax`].
fn expand_env_vars_with<F>(input: &str, field: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut expanded = String::with_capacity(input.len());
    let mut rest = input;

    while let Some((literal, reference)) = rest.split_once("${") {
        expanded.push_str(literal);

        let (name, tail) = reference
            .split_once('}')
            .ok_or_else(|| ConfigError::EnvSyntax {
                field: field.to_string(),
                message: format!("unclosed '${{' in '{}'", input),
            })?;
        if name.is_empty() {
            return Err(ConfigError::EnvSyntax {
                field: field.to_string(),
                message: "empty variable name in '${}'".to_string(),
            });
        }

        let value = lookup(name).ok_or_else(|| ConfigError::EnvVar {
            var: name.to_string(),
            field: field.to_string(),
        })?;
        expanded.push_str(&value);
        rest = tail;
    }

    expanded.push_str(rest);
    Ok(expanded)
}

/// Look up a real environment variable, treating empty values as unset.
fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Resolve the credential from its raw config value.
///
/// An unset or empty credential degrades to no key so the process can still
/// start and serve the landing page. A malformed `${...}` reference is a
/// configuration error.
fn resolve_api_key<F>(
    raw_key: Option<&str>,
    lookup: &F,
) -> Result<(Option<ApiKey>, KeySource), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

    let resolved = match raw_key {
        Some(raw) if raw.contains("${") => {
            match expand_env_vars_with(raw, "provider.api_key", non_empty) {
                Ok(expanded) if !expanded.is_empty() => {
                    (Some(ApiKey::from(expanded)), KeySource::EnvExpanded)
                }
                Ok(_) => (None, KeySource::Unresolved(raw.to_string())),
                Err(ConfigError::EnvVar { var, .. }) => (None, KeySource::Unresolved(var)),
                Err(e) => return Err(e),
            }
        }
        Some("") => (None, KeySource::None),
        Some(raw) => (Some(ApiKey::from(raw)), KeySource::Literal),
        None => match non_empty(CREDENTIAL_ENV_VAR) {
            Some(value) => (
                Some(ApiKey::from(value)),
                KeySource::Convention(CREDENTIAL_ENV_VAR.to_string()),
            ),
            None => (None, KeySource::None),
        },
    };
    Ok(resolved)
}

impl Config {
    /// Convert raw (deserialized) config to final config, resolving
    /// environment references through `lookup`.
    ///
    /// - `provider.base_url` may contain `${VAR}`; an unset variable is an error.
    /// - `provider.api_key` may be a literal, contain `${VAR}`, or be omitted
    ///   (falls back to `OPENAI_API_KEY`). An unset variable leaves the relay
    ///   unconfigured; a malformed reference is an error.
    pub fn from_raw_with<F>(raw: RawConfig, lookup: F) -> Result<(Self, KeySource), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match raw.provider.base_url {
            Some(url) => expand_env_vars_with(&url, "provider.base_url", &lookup)?,
            None => DEFAULT_BASE_URL.to_string(),
        };

        let (api_key, source) = resolve_api_key(raw.provider.api_key.as_deref(), &lookup)?;

        let config = Config {
            server: raw.server,
            provider: ProviderConfig {
                base_url,
                api_key,
                timeout_secs: raw.provider.timeout_secs,
                connect_timeout_secs: raw.provider.connect_timeout_secs,
            },
            web: raw.web,
            logging: raw.logging,
        };
        config.validate()?;

        Ok((config, source))
    }

    /// Convert raw config using the real process environment.
    pub fn from_raw(raw: RawConfig) -> Result<(Self, KeySource), ConfigError> {
        Self::from_raw_with(raw, env_lookup)
    }

    /// Parse configuration from a TOML string using the real environment.
    pub fn parse_str(content: &str) -> Result<(Self, KeySource), ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
        Self::from_raw(raw)
    }

    /// Load configuration from a TOML file with environment resolution.
    ///
    /// A missing file is not an error: defaults are used and the credential
    /// is taken from `OPENAI_API_KEY`.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, KeySource), ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Self::from_raw(RawConfig::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::parse_str(&content)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.provider.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Validation(
                "provider.base_url must not be empty".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "provider.base_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.provider.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "provider.timeout_secs must be greater than zero (omit it for no timeout)"
                    .to_string(),
            ));
        }
        if self.provider.connect_timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "provider.connect_timeout_secs must be greater than zero (omit it for no timeout)"
                    .to_string(),
            ));
        }
        if self.server.listen.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server.listen must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_with<F>(toml: &str, lookup: F) -> Result<(Config, KeySource), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = toml::from_str(toml).unwrap();
        Config::from_raw_with(raw, lookup)
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let (config, source) = parse_with("", no_env).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:8000");
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert!(config.provider.api_key.is_none());
        assert!(config.provider.timeout().is_none());
        assert!(config.provider.connect_timeout().is_none());
        assert_eq!(config.web.static_dir, "static");
        assert_eq!(config.logging.level, "info");
        assert_eq!(source, KeySource::None);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [server]
            listen = "0.0.0.0:9000"

            [provider]
            base_url = "https://llm.example.com/v1"
            api_key = "sk-literal"
            timeout_secs = 60
            connect_timeout_secs = 5

            [web]
            static_dir = "./public"

            [logging]
            level = "debug"
        "#;

        let (config, source) = parse_with(toml, no_env).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:9000");
        assert_eq!(config.provider.base_url, "https://llm.example.com/v1");
        assert_eq!(config.provider.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.provider.connect_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.web.static_dir, "./public");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(source, KeySource::Literal);
        assert_eq!(
            config.provider.api_key.as_ref().unwrap().expose_secret(),
            "sk-literal"
        );
    }

    #[test]
    fn test_api_key_debug_redaction() {
        let key = ApiKey::from("sk-super-secret");
        let debug_output = format!("{:?}", key);
        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("super-secret"));
    }

    #[test]
    fn test_api_key_display_redaction() {
        let key = ApiKey::from("sk-super-secret");
        assert_eq!(format!("{}", key), "[REDACTED]");
    }

    #[test]
    fn test_api_key_serialize_redaction() {
        let key = ApiKey::from("real-secret-value");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"[REDACTED]\"");
    }

    #[test]
    fn test_provider_config_debug_redaction() {
        let provider = ProviderConfig {
            api_key: Some(ApiKey::from("sk-abcd1234secret")),
            ..ProviderConfig::default()
        };
        let debug_output = format!("{:?}", provider);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk-abcd1234secret"));
    }

    // ── Expansion tests (no global env state) ──

    #[test]
    fn test_expand_multiple_vars() {
        let lookup = |name: &str| match name {
            "SCHEME" => Some("https".to_string()),
            "HOST" => Some("llm.example.com".to_string()),
            _ => None,
        };
        let result = expand_env_vars_with("${SCHEME}://${HOST}/v1", "test", lookup).unwrap();
        assert_eq!(result, "https://llm.example.com/v1");
    }

    #[test]
    fn test_expand_no_vars_passthrough() {
        let lookup = |_: &str| -> Option<String> { panic!("should not be called") };
        let result = expand_env_vars_with("$NOT_A_VAR", "test", lookup).unwrap();
        assert_eq!(result, "$NOT_A_VAR");
    }

    #[test]
    fn test_expand_unclosed_brace_fails() {
        let result = expand_env_vars_with("${UNCLOSED", "test", no_env);
        let err = result.unwrap_err().to_string().to_lowercase();
        assert!(err.contains("unclosed"), "got: {}", err);
    }

    #[test]
    fn test_expand_empty_var_name_fails() {
        let result = expand_env_vars_with("${}", "test", no_env);
        let err = result.unwrap_err().to_string().to_lowercase();
        assert!(err.contains("empty"), "got: {}", err);
    }

    // ── Credential resolution ──

    #[test]
    fn test_key_from_convention_env_var() {
        let lookup = |name: &str| match name {
            CREDENTIAL_ENV_VAR => Some("sk-from-env".to_string()),
            _ => None,
        };
        let (config, source) = parse_with("", lookup).unwrap();
        assert_eq!(
            source,
            KeySource::Convention(CREDENTIAL_ENV_VAR.to_string())
        );
        assert_eq!(
            config.provider.api_key.as_ref().unwrap().expose_secret(),
            "sk-from-env"
        );
        assert!(source.is_configured());
    }

    #[test]
    fn test_empty_convention_env_var_is_absent() {
        let lookup = |name: &str| match name {
            CREDENTIAL_ENV_VAR => Some(String::new()),
            _ => None,
        };
        let (config, source) = parse_with("", lookup).unwrap();
        assert_eq!(source, KeySource::None);
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn test_key_expanded_from_reference() {
        let toml = r#"
            [provider]
            api_key = "${ARK_KEY}"
        "#;
        let lookup = |name: &str| match name {
            "ARK_KEY" => Some("sk-expanded".to_string()),
            _ => None,
        };
        let (config, source) = parse_with(toml, lookup).unwrap();
        assert_eq!(source, KeySource::EnvExpanded);
        assert_eq!(
            config.provider.api_key.as_ref().unwrap().expose_secret(),
            "sk-expanded"
        );
    }

    #[test]
    fn test_unset_key_reference_degrades() {
        let toml = r#"
            [provider]
            api_key = "${MISSING_KEY}"
        "#;
        let (config, source) = parse_with(toml, no_env).unwrap();
        assert_eq!(source, KeySource::Unresolved("MISSING_KEY".to_string()));
        assert!(!source.is_configured());
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn test_unclosed_key_reference_is_fatal() {
        let toml = r#"
            [provider]
            api_key = "${OPENAI_API_KEY"
        "#;
        let lookup = |_: &str| Some("sk-would-resolve".to_string());
        let err = parse_with(toml, lookup).unwrap_err();
        assert!(matches!(err, ConfigError::EnvSyntax { .. }), "got: {:?}", err);
        assert!(err.to_string().contains("provider.api_key"));
    }

    #[test]
    fn test_empty_key_reference_name_is_fatal() {
        let toml = r#"
            [provider]
            api_key = "${}"
        "#;
        let err = parse_with(toml, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::EnvSyntax { .. }), "got: {:?}", err);
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_empty_literal_key_is_absent() {
        let toml = r#"
            [provider]
            api_key = ""
        "#;
        let (config, source) = parse_with(toml, no_env).unwrap();
        assert_eq!(source, KeySource::None);
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn test_unset_base_url_reference_fails() {
        let toml = r#"
            [provider]
            base_url = "${LLM_BASE}/v1"
        "#;
        let err = parse_with(toml, no_env).unwrap_err().to_string();
        assert!(err.contains("LLM_BASE"), "got: {}", err);
        assert!(err.contains("provider.base_url"), "got: {}", err);
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let toml = r#"
            [provider]
            base_url = "ftp://llm.example.com"
        "#;
        let err = parse_with(toml, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let toml = r#"
            [provider]
            timeout_secs = 0
        "#;
        let err = parse_with(toml, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_key_source_display() {
        assert_eq!(KeySource::Literal.to_string(), "config-literal");
        assert_eq!(
            KeySource::Convention("OPENAI_API_KEY".to_string()).to_string(),
            "convention (OPENAI_API_KEY)"
        );
        assert_eq!(KeySource::None.to_string(), "none");
    }
}
