use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use reqwest::Url;

use crate::workflows::screening::{BasicCredentials, DEFAULT_MAX_UPLOAD_BYTES};

const DEFAULT_RANKING_URL: &str = "https://agentic-ai.co.in/api/agentic-ai/workflow-exe";
const DEFAULT_TICKETING_URL: &str =
    "https://dev187243.service-now.com/api/1763965/resumerankingapi/upload";
const DEFAULT_AUTOMATION_URL: &str = "http://localhost:5678/webhook/ranked-candidate";

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
    pub integrations: IntegrationConfig,
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

        let max_upload_bytes = match optional_var("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidUploadLimit)?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                max_upload_bytes,
            },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            integrations: IntegrationConfig::load()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted submission body, resumes included.
    pub max_upload_bytes: usize,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Colored output is only useful on a developer terminal.
    pub ansi: bool,
}

/// Endpoints and credentials for the ranking service and both destinations.
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    pub ranking_url: Url,
    pub ticketing_url: Url,
    pub ticketing_credentials: Option<BasicCredentials>,
    pub automation_url: Url,
    pub automation_token: Option<String>,
    pub automation_concurrency: usize,
    pub http_timeout: Option<Duration>,
}

impl IntegrationConfig {
    fn load() -> Result<Self, ConfigError> {
        let ranking_url = url_var("RANKING_SERVICE_URL", DEFAULT_RANKING_URL)?;
        let ticketing_url = url_var("TICKETING_URL", DEFAULT_TICKETING_URL)?;
        let automation_url = url_var("AUTOMATION_URL", DEFAULT_AUTOMATION_URL)?;

        let ticketing_credentials = optional_var("TICKETING_USERNAME").map(|username| {
            BasicCredentials {
                username,
                password: optional_var("TICKETING_PASSWORD"),
            }
        });
        let automation_token = optional_var("AUTOMATION_TOKEN");

        let automation_concurrency = match optional_var("AUTOMATION_CONCURRENCY") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|value| *value >= 1)
                .ok_or(ConfigError::InvalidConcurrency)?,
            None => 1,
        };

        let http_timeout = match optional_var("HTTP_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(
                raw.parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout)?,
            )),
            None => None,
        };

        Ok(Self {
            ranking_url,
            ticketing_url,
            ticketing_credentials,
            automation_url,
            automation_token,
            automation_concurrency,
            http_timeout,
        })
    }
}

impl IntegrationConfig {
    /// Shared outbound client. Without a configured timeout, calls wait for
    /// the remote side to answer.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.http_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn url_var(key: &'static str, default: &str) -> Result<Url, ConfigError> {
    let raw = optional_var(key).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|err| ConfigError::InvalidUrl {
        key,
        reason: err.to_string(),
    })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidUrl { key: &'static str, reason: String },
    InvalidConcurrency,
    InvalidTimeout,
    InvalidUploadLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidUrl { key, reason } => {
                write!(f, "{key} must be an absolute URL ({reason})")
            }
            ConfigError::InvalidConcurrency => {
                write!(f, "AUTOMATION_CONCURRENCY must be a positive integer")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "HTTP_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidUploadLimit => {
                write!(f, "MAX_UPLOAD_BYTES must be a positive number of bytes")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidUrl { .. }
            | ConfigError::InvalidConcurrency
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidUploadLimit => None,
        }
    }
}
