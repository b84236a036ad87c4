//! Server configuration from the environment.

use quillpress_auth::config::{AuthConfig, SigningConfig};
use quillpress_core::error::CoreError;
use quillpress_db::DbConfig;
use quillpress_engage::DedupWindow;

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub engagement_window: DedupWindow,
}

impl ServerConfig {
    /// Read configuration from environment variables, falling back to
    /// development defaults where safe. Signing-key material and the
    /// super-admin key have no safe default; a deployment that omits
    /// them fails at startup with a configuration error.
    pub fn from_env() -> Result<Self, CoreError> {
        let bind = env_or("QUILLPRESS_BIND", "0.0.0.0:8080");

        let db = DbConfig {
            url: env_or("QUILLPRESS_DB_URL", "127.0.0.1:8000"),
            namespace: env_or("QUILLPRESS_DB_NAMESPACE", "quillpress"),
            database: env_or("QUILLPRESS_DB_NAME", "main"),
            username: env_or("QUILLPRESS_DB_USER", "root"),
            password: env_or("QUILLPRESS_DB_PASSWORD", "root"),
        };

        let signing = match env_or("QUILLPRESS_SIGNING_MODE", "hmac").as_str() {
            "hmac" => SigningConfig::HmacPerTenant,
            "rs256" => SigningConfig::Rsa {
                private_key_pem: require_env("QUILLPRESS_RSA_PRIVATE_KEY_PEM")?,
                public_key_pem: require_env("QUILLPRESS_RSA_PUBLIC_KEY_PEM")?,
            },
            other => {
                return Err(CoreError::Configuration(format!(
                    "unknown signing mode: {other} (expected 'hmac' or 'rs256')"
                )));
            }
        };

        let super_admin_key = require_env("QUILLPRESS_SUPER_ADMIN_KEY")?;

        let admin_oauth_emails = std::env::var("QUILLPRESS_ADMIN_OAUTH_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from)
            .collect();

        let default_token_lifetime_secs = env_or("QUILLPRESS_TOKEN_LIFETIME_SECS", "86400")
            .parse()
            .map_err(|_| {
                CoreError::Configuration("QUILLPRESS_TOKEN_LIFETIME_SECS must be an integer".into())
            })?;

        let engagement_window = match env_or("QUILLPRESS_ENGAGEMENT_WINDOW", "daily").as_str() {
            "daily" => {
                let timezone: chrono_tz::Tz = env_or("QUILLPRESS_ENGAGEMENT_TIMEZONE", "UTC")
                    .parse()
                    .map_err(|_| {
                        CoreError::Configuration(
                            "QUILLPRESS_ENGAGEMENT_TIMEZONE is not a valid timezone".into(),
                        )
                    })?;
                DedupWindow::daily(timezone)
            }
            "rolling" => DedupWindow::rolling_24h(),
            other => {
                return Err(CoreError::Configuration(format!(
                    "unknown engagement window: {other} (expected 'daily' or 'rolling')"
                )));
            }
        };

        Ok(Self {
            bind,
            db,
            auth: AuthConfig {
                signing,
                default_token_lifetime_secs,
                super_admin_key,
                admin_oauth_emails,
            },
            engagement_window,
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn require_env(name: &str) -> Result<String, CoreError> {
    std::env::var(name)
        .map_err(|_| CoreError::Configuration(format!("{name} must be set")))
        .and_then(|value| {
            if value.trim().is_empty() {
                Err(CoreError::Configuration(format!("{name} must not be empty")))
            } else {
                Ok(value)
            }
        })
}
