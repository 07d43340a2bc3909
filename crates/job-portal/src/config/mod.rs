use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

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
    pub store: StoreConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let backend = match env::var("APP_STORE") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Memory,
        };
        let store = StoreConfig {
            backend,
            mongodb_uri: env::var("MONGODB_URI").ok().filter(|uri| !uri.trim().is_empty()),
            database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| "job-portal".to_string()),
        };
        store.validate()?;

        let auth = match env::var("APP_AUTH_TOKENS") {
            Ok(raw) => AuthConfig::parse(&raw)?,
            Err(_) => AuthConfig::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            store,
            auth,
        })
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Mongo,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(Self::Memory),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            other => Err(ConfigError::UnknownStore(other.to_string())),
        }
    }
}

/// Where jobs and applications are persisted.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongodb_uri: Option<String>,
    pub database: String,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == StoreBackend::Mongo && self.mongodb_uri.is_none() {
            return Err(ConfigError::MissingMongoUri);
        }
        Ok(())
    }
}

/// Bearer tokens accepted by the API, each bound to the email it authenticates.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub tokens: Vec<(String, String)>,
}

impl AuthConfig {
    /// Parses `token=email` pairs separated by commas.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut tokens = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            match entry.split_once('=') {
                Some((token, email)) if !token.trim().is_empty() && email.contains('@') => {
                    tokens.push((token.trim().to_string(), email.trim().to_string()));
                }
                _ => return Err(ConfigError::InvalidAuthToken { position: tokens.len() }),
            }
        }
        Ok(Self { tokens })
    }

    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownStore(String),
    MissingMongoUri,
    InvalidAuthToken { position: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownStore(value) => {
                write!(f, "APP_STORE must be 'memory' or 'mongo', got '{value}'")
            }
            ConfigError::MissingMongoUri => {
                write!(f, "MONGODB_URI is required when APP_STORE is 'mongo'")
            }
            ConfigError::InvalidAuthToken { position } => write!(
                f,
                "APP_AUTH_TOKENS entry {} must look like token=email",
                position + 1
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::UnknownStore(_)
            | ConfigError::MissingMongoUri
            | ConfigError::InvalidAuthToken { .. } => None,
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_STORE",
            "MONGODB_URI",
            "MONGODB_DATABASE",
            "APP_AUTH_TOKENS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.database, "job-portal");
        assert!(!config.auth.is_enabled());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 5000));
        reset_env();
    }

    #[test]
    fn mongo_backend_requires_a_uri() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_STORE", "mongodb");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::MissingMongoUri)
        ));

        env::set_var("MONGODB_URI", "mongodb://localhost:27017");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.store.backend, StoreBackend::Mongo);
        reset_env();
    }

    #[test]
    fn auth_tokens_parse_into_pairs() {
        let config = AuthConfig::parse("hr-token=hr@x.com, cand-token = a@b.com,").expect("parses");
        assert_eq!(
            config.tokens,
            vec![
                ("hr-token".to_string(), "hr@x.com".to_string()),
                ("cand-token".to_string(), "a@b.com".to_string()),
            ]
        );
        assert!(format!("{config:?}").contains("tokens: 2"));

        assert!(matches!(
            AuthConfig::parse("hr-token=hr@x.com,broken"),
            Err(ConfigError::InvalidAuthToken { position: 1 })
        ));
    }
}
