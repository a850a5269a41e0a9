//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

/// Port the server listens on when neither `--port` nor HACKMATCH_PORT is given.
pub const DEFAULT_PORT: u16 = 3000;

/// Default URL for the CLI client.
pub const DEFAULT_URL: &str = "http://127.0.0.1:3000/api/v1";

#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Database file (from HACKMATCH_DATABASE). Falls back to the platform
    /// data directory when unset.
    pub database_path: Option<PathBuf>,
    /// Allowed CORS origins (from HACKMATCH_CORS_ORIGINS, comma-separated).
    /// Any origin is allowed when unset.
    pub cors_origins: Option<Vec<String>>,
    /// Base URL the CLI client talks to (from HACKMATCH_URL).
    pub api_url: String,
    /// Server port (from HACKMATCH_PORT).
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let database_path = std::env::var("HACKMATCH_DATABASE").ok().map(PathBuf::from);

        let cors_origins = std::env::var("HACKMATCH_CORS_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .filter(|origins| !origins.is_empty());

        let api_url = std::env::var("HACKMATCH_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());

        let port = parse_port(std::env::var("HACKMATCH_PORT").ok().as_deref());

        Self {
            database_path,
            cors_origins,
            api_url,
            port,
        }
    }

    /// Configuration for tests and local runs: no restrictions, in-process defaults.
    pub fn local() -> Self {
        Self {
            database_path: None,
            cors_origins: None,
            api_url: DEFAULT_URL.to_string(),
            port: DEFAULT_PORT,
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }
}

fn parse_port(raw: Option<&str>) -> u16 {
    match raw.map(str::trim) {
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %value, "Ignoring invalid HACKMATCH_PORT");
            DEFAULT_PORT
        }),
        None => DEFAULT_PORT,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
