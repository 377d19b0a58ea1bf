use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub generative: GenerativeConfig,
    pub grammar: GrammarConfig,
    pub realtime: RealtimeConfig,
    pub access: AccessConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        )?;

        // A missing credential is not a configuration failure: the evaluator
        // degrades to the fallback path instead.
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let generative = GenerativeConfig {
            api_key,
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| GenerativeConfig::DEFAULT_BASE_URL.to_string()),
            model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| GenerativeConfig::DEFAULT_MODEL.to_string()),
            timeout_secs: parse_u64("OPENAI_TIMEOUT_SECS", 60)?,
        };

        let grammar = GrammarConfig {
            base_url: env::var("LANGUAGETOOL_URL")
                .unwrap_or_else(|_| GrammarConfig::DEFAULT_BASE_URL.to_string()),
            language: env::var("LANGUAGETOOL_LANGUAGE").unwrap_or_else(|_| "en-US".to_string()),
            timeout_secs: parse_u64("LANGUAGETOOL_TIMEOUT_SECS", 20)?,
        };

        let debounce_ms = parse_u64("REALTIME_DEBOUNCE_MS", RealtimeConfig::MAX_DEBOUNCE_MS)?;
        let realtime = RealtimeConfig::new(debounce_ms)?;

        let access = AccessConfig {
            tokens: env::var("APP_ACCESS_TOKENS")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            generative,
            grammar,
            realtime,
            access,
        })
    }
}

fn parse_u64(variable: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { variable }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat {
                value: value.to_string(),
            }),
        }
    }
}

/// Connection settings for the generative evaluator.
#[derive(Clone)]
pub struct GenerativeConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl GenerativeConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for GenerativeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerativeConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Connection settings for the rule-based grammar checker.
#[derive(Debug, Clone)]
pub struct GrammarConfig {
    pub base_url: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl GrammarConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.languagetool.org";

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Debounce window for realtime scoring sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealtimeConfig {
    debounce_ms: u64,
}

impl RealtimeConfig {
    pub const MIN_DEBOUNCE_MS: u64 = 500;
    pub const MAX_DEBOUNCE_MS: u64 = 1000;

    pub fn new(debounce_ms: u64) -> Result<Self, ConfigError> {
        if !(Self::MIN_DEBOUNCE_MS..=Self::MAX_DEBOUNCE_MS).contains(&debounce_ms) {
            return Err(ConfigError::InvalidDebounce { value: debounce_ms });
        }
        Ok(Self { debounce_ms })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: Self::MAX_DEBOUNCE_MS,
        }
    }
}

/// Bearer tokens accepted by the submission endpoint; empty means open access.
#[derive(Clone, Default)]
pub struct AccessConfig {
    pub tokens: Vec<String>,
}

impl fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessConfig")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
    InvalidDebounce { value: u64 },
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} must be a non-negative integer")
            }
            ConfigError::InvalidDebounce { value } => write!(
                f,
                "REALTIME_DEBOUNCE_MS must be between {} and {} (got {value})",
                RealtimeConfig::MIN_DEBOUNCE_MS,
                RealtimeConfig::MAX_DEBOUNCE_MS
            ),
            ConfigError::InvalidLogFormat { value } => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json' (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidDebounce { .. }
            | ConfigError::InvalidLogFormat { .. } => None,
        }
    }
}
