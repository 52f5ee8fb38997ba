//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use resume_agent::anthropic::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

/// Runtime configuration for resume-server.
///
/// Every field except the upstream API key has a default so the server can be
/// started locally with a single variable set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// Human-readable service name reported by `GET /`.
    pub app_name: String,

    /// Deployment environment reported by `GET /health/ready`.
    pub environment: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Credential for the Anthropic Messages API.  Required at startup.
    pub anthropic_api_key: Option<String>,

    pub anthropic_base_url: String,

    /// Fixed model identifier for every generation.
    pub model: String,

    /// Fixed generation cap (tokens) for every generation.
    pub max_tokens: u32,

    /// Admitted chat requests per client within `rate_limit_window`.
    pub rate_limit: usize,

    pub rate_limit_window: Duration,

    /// Key the rate limiter on the first `X-Forwarded-For` hop instead of the
    /// peer address.  Only enable behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,

    /// Upper bound on the total duration of one chat stream.
    pub stream_timeout: Duration,

    /// Maximum number of prior turns accepted in `conversation_history`.
    pub max_history_turns: usize,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,

    /// Comma-separated CORS origin allow-list.  `None` or empty → any origin.
    pub cors_allowed_origins: Option<String>,

    /// Directory holding the built frontend; served as fallback when present.
    pub static_dir: String,

    /// Mount Swagger UI at `/swagger-ui`.
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("RESUME_BIND", "0.0.0.0:8000"),
            app_name: env_or("RESUME_APP_NAME", "AI Resume"),
            environment: env_or("RESUME_ENVIRONMENT", "development"),
            log_level: env_or("RESUME_LOG", "info"),
            log_json: env_flag("RESUME_LOG_JSON", false),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            anthropic_base_url: env_or("RESUME_ANTHROPIC_BASE_URL", DEFAULT_BASE_URL),
            model: env_or("RESUME_MODEL", DEFAULT_MODEL),
            max_tokens: parse_env("RESUME_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            rate_limit: parse_env("RESUME_RATE_LIMIT", 20),
            rate_limit_window: Duration::from_secs(parse_env("RESUME_RATE_WINDOW_SECS", 60)),
            trust_forwarded_for: env_flag("RESUME_TRUST_FORWARDED_FOR", false),
            stream_timeout: Duration::from_secs(parse_env("RESUME_STREAM_TIMEOUT_SECS", 120)),
            max_history_turns: parse_env("RESUME_MAX_HISTORY_TURNS", 50),
            max_body_bytes: parse_env("RESUME_MAX_BODY_BYTES", 256 * 1024),
            cors_allowed_origins: Some(env_or(
                "RESUME_CORS_ORIGINS",
                "http://localhost:8080,http://localhost:5173",
            )),
            static_dir: env_or("RESUME_STATIC_DIR", "static"),
            enable_swagger: env_flag("RESUME_ENABLE_SWAGGER", true),
        }
    }
}

impl Default for Config {
    /// Defaults without consulting the environment.
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".into(),
            app_name: "AI Resume".into(),
            environment: "development".into(),
            log_level: "info".into(),
            log_json: false,
            anthropic_api_key: None,
            anthropic_base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            rate_limit: 20,
            rate_limit_window: Duration::from_secs(60),
            trust_forwarded_for: false,
            stream_timeout: Duration::from_secs(120),
            max_history_turns: 50,
            max_body_bytes: 256 * 1024,
            cors_allowed_origins: None,
            static_dir: "static".into(),
            enable_swagger: true,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
