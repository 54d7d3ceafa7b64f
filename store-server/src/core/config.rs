use crate::auth::JwtConfig;

/// Server configuration
///
/// Every item can be overridden through environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/store/server | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | XENDIT_BASE_URL | https://api.xendit.co | Payment provider base URL |
/// | XENDIT_SECRET_KEY | (unset) | Provider API key; unset selects the mock gateway |
/// | AUDIT_BUFFER | 1024 | Audit channel capacity |
///
/// JWT settings are read separately by [`JwtConfig`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the embedded database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Running environment: development | staging | production
    pub environment: String,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Payment provider base URL
    pub xendit_base_url: String,
    /// Provider secret key. `None` means no provider account is configured
    /// and the in-process mock gateway is used instead.
    pub xendit_secret_key: Option<String>,
    /// Capacity of the audit log channel
    pub audit_buffer: usize,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/store/server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            jwt: JwtConfig::default(),
            xendit_base_url: std::env::var("XENDIT_BASE_URL")
                .unwrap_or_else(|_| crate::gateway::xendit::DEFAULT_BASE_URL.into()),
            xendit_secret_key: std::env::var("XENDIT_SECRET_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            audit_buffer: std::env::var("AUDIT_BUFFER")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1024),
        }
    }

    /// Override the filesystem and network bindings; used by tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
