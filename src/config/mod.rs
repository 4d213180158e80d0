use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Upstream GraphQL endpoint that answers the identity query
    pub graphql_endpoint: String,
    /// Identity-provider endpoint that exchanges a refresh token for a new token set
    pub refresh_endpoint: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the persisted token set; None uses the default under $HOME
    pub storage_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("TALENT_GATEWAY_PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // API overrides
        if let Ok(v) = env::var("TALENT_API_GRAPHQL_ENDPOINT") {
            self.api.graphql_endpoint = v;
        }
        if let Ok(v) = env::var("TALENT_API_REFRESH_ENDPOINT") {
            self.api.refresh_endpoint = v;
        }
        if let Ok(v) = env::var("TALENT_API_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("TALENT_SESSION_DIR") {
            self.session.storage_dir = Some(v);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            api: ApiConfig {
                graphql_endpoint: "http://localhost:8000/graphql".to_string(),
                refresh_endpoint: "http://localhost:8000/refresh".to_string(),
                request_timeout_secs: 30,
            },
            session: SessionConfig { storage_dir: None },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            api: ApiConfig {
                graphql_endpoint: "https://api.staging.talent.example.com/graphql".to_string(),
                refresh_endpoint: "https://auth.staging.talent.example.com/refresh".to_string(),
                request_timeout_secs: 15,
            },
            session: SessionConfig { storage_dir: None },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.talent.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            api: ApiConfig {
                graphql_endpoint: "https://api.talent.example.com/graphql".to_string(),
                refresh_endpoint: "https://auth.talent.example.com/refresh".to_string(),
                request_timeout_secs: 10,
            },
            session: SessionConfig { storage_dir: None },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://talent.example.com".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
