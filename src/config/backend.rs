//! Backend location.
//!
//! The base URL normally comes from config.toml, but `ARTICLE_BACKEND_URL` in the
//! environment (or `.env`) wins, so deployments can point the binary elsewhere
//! without editing the file.

/// Environment variable overriding the configured base URL
pub const BACKEND_URL_VAR: &str = "ARTICLE_BACKEND_URL";

/// Base URL used when neither the file nor the environment provide one
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Gets the backend URL from the environment, falling back to `configured`.
#[must_use]
pub fn get_backend_url(configured: &str) -> String {
    resolve_backend_url(std::env::var(BACKEND_URL_VAR).ok(), configured)
}

fn resolve_backend_url(from_env: Option<String>, configured: &str) -> String {
    from_env
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| configured.to_string())
}
