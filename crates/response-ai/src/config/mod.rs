use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::prediction::SIMULATED_LATENCY;

/// Classification endpoint used when the console is served from loopback.
pub const LOCAL_PREDICTOR_URL: &str = "http://127.0.0.1:8000/predict";
/// Deployed classification endpoint used everywhere else.
pub const DEPLOYED_PREDICTOR_URL: &str = "https://customer-response-predictor.onrender.com/predict";

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
    pub predictor: PredictorConfig,
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

        let endpoint_override = env::var("APP_PREDICTOR_URL").ok();
        let simulated_latency = match env::var("APP_SIMULATED_LATENCY_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidLatency)?,
            Err(_) => SIMULATED_LATENCY,
        };

        let predictor = PredictorConfig {
            endpoint: resolve_endpoint(&host, endpoint_override.as_deref()),
            simulated_latency,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            predictor,
        })
    }

    /// Re-resolve the predictor endpoint after the served host changed
    /// (for example through a CLI flag), keeping an explicit override.
    pub fn rebind_host(&mut self, host: String) {
        let endpoint_override = env::var("APP_PREDICTOR_URL").ok();
        self.predictor.endpoint = resolve_endpoint(&host, endpoint_override.as_deref());
        self.server.host = host;
    }
}

/// Pick the classification endpoint for the host the console is served from.
pub fn resolve_endpoint(host: &str, endpoint_override: Option<&str>) -> String {
    if let Some(url) = endpoint_override
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return url.to_string();
    }

    if is_loopback_host(host) {
        LOCAL_PREDICTOR_URL.to_string()
    } else {
        DEPLOYED_PREDICTOR_URL.to_string()
    }
}

fn is_loopback_host(host: &str) -> bool {
    let host = host.trim();
    host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1"
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
}

/// Prediction backends, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub endpoint: String,
    pub simulated_latency: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLatency,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLatency => {
                write!(f, "APP_SIMULATED_LATENCY_MS must be a whole number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidLatency => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_PREDICTOR_URL");
        env::remove_var("APP_SIMULATED_LATENCY_MS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.predictor.endpoint, LOCAL_PREDICTOR_URL);
        assert_eq!(config.predictor.simulated_latency, Duration::from_millis(800));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        assert_eq!(config.predictor.endpoint, LOCAL_PREDICTOR_URL);
        reset_env();
    }

    #[test]
    fn public_host_targets_deployed_service() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "0.0.0.0");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.predictor.endpoint, DEPLOYED_PREDICTOR_URL);
        reset_env();
    }

    #[test]
    fn explicit_predictor_url_wins() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PREDICTOR_URL", "http://scoring.internal:9000/predict");
        let mut config = AppConfig::load().expect("config loads");
        assert_eq!(config.predictor.endpoint, "http://scoring.internal:9000/predict");

        config.rebind_host("10.0.0.5".to_string());
        assert_eq!(config.predictor.endpoint, "http://scoring.internal:9000/predict");
        assert_eq!(config.server.host, "10.0.0.5");
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_latency() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SIMULATED_LATENCY_MS", "fast");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidLatency)
        ));
        reset_env();
    }

    #[test]
    fn endpoint_resolution_checks_loopback_names() {
        assert_eq!(resolve_endpoint("127.0.0.1", None), LOCAL_PREDICTOR_URL);
        assert_eq!(resolve_endpoint("LOCALHOST", None), LOCAL_PREDICTOR_URL);
        assert_eq!(resolve_endpoint("192.168.1.20", None), DEPLOYED_PREDICTOR_URL);
        assert_eq!(resolve_endpoint("127.0.0.1", Some("  ")), LOCAL_PREDICTOR_URL);
    }
}
