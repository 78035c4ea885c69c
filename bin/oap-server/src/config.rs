//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use oap_mcp::OapClientConfig;

/// Runtime configuration for oap-server.
///
/// Every field has a default so the server starts without any environment
/// variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://oap.db"`).
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// HS256 secret used to sign and verify bearer tokens.
    pub jwt_secret: String,

    /// Lifetime of tokens issued by the CLI.
    pub token_ttl_secs: u64,

    /// Base URL of the OAP API the MCP tools forward to.
    pub oap_backend_url: String,

    /// Sent upstream as `x-api-key`; never logged.
    pub oap_api_key: Option<String>,

    /// Absolute URL of the OCR service.
    pub ocr_api_url: String,

    pub upstream_timeout_secs: u64,

    /// Comma-separated CORS origin allow-list; wildcard when unset.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("OAP_BIND", "0.0.0.0:3000"),
            database_url: env_or("OAP_DATABASE_URL", "sqlite://oap.db"),
            log_level: env_or("OAP_LOG", "info"),
            log_json: parse_bool("OAP_LOG_JSON", false),
            jwt_secret: env_or("JWT_SECRET", "secret"),
            token_ttl_secs: parse_env("OAP_TOKEN_TTL_SECS", 86_400),
            oap_backend_url: env_or("OAP_BACKEND_URL", "http://localhost:8080"),
            oap_api_key: std::env::var("OAP_API_KEY").ok().filter(|v| !v.is_empty()),
            ocr_api_url: env_or("OCR_API_URL", "https://ocr-api-dev.guseip.io/ocr"),
            upstream_timeout_secs: parse_env("OAP_UPSTREAM_TIMEOUT_SECS", 30),
            cors_allowed_origins: std::env::var("OAP_CORS_ORIGINS").ok(),
            enable_swagger: parse_bool("OAP_ENABLE_SWAGGER", true),
        }
    }

    pub fn upstream(&self) -> OapClientConfig {
        OapClientConfig {
            base_url: self.oap_backend_url.clone(),
            api_key: self.oap_api_key.clone(),
            ocr_url: self.ocr_api_url.clone(),
            timeout: Duration::from_secs(self.upstream_timeout_secs),
        }
    }
}

impl Default for Config {
    /// Defaults without reading the environment; used by tests.
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".into(),
            database_url: "sqlite::memory:".into(),
            log_level: "info".into(),
            log_json: false,
            jwt_secret: "secret".into(),
            token_ttl_secs: 86_400,
            oap_backend_url: "http://localhost:8080".into(),
            oap_api_key: None,
            ocr_api_url: "https://ocr-api-dev.guseip.io/ocr".into(),
            upstream_timeout_secs: 30,
            cors_allowed_origins: None,
            enable_swagger: true,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
