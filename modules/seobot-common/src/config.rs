use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Web server
    pub api_host: String,
    pub api_port: u16,

    // Auth
    pub jwt_secret: String,
    pub jwt_issuer: String,

    // Canonical URL base for generated pages
    pub site_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("API_PORT must be a number"),
            jwt_secret: required_env("JWT_SECRET"),
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "seobot".to_string()),
            site_base_url: env::var("SITE_BASE_URL")
                .unwrap_or_else(|_| "https://www.appointpanda.com".to_string()),
        }
    }

    /// Load a minimal config for the CLI (no auth secrets needed).
    pub fn cli_from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            api_host: String::new(),
            api_port: 0,
            jwt_secret: String::new(),
            jwt_issuer: String::new(),
            site_base_url: env::var("SITE_BASE_URL")
                .unwrap_or_else(|_| "https://www.appointpanda.com".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
