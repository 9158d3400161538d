//! Application configuration
//!
//! Loaded from a TOML file at `$SICK_FITS_CONFIG` or
//! `~/.config/sick-fits/config.toml`. Every section falls back to its
//! `Default`, so a partial (or missing) file is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::{AccountSettings, CheckoutSettings};
use crate::infrastructure::crypto::password::PASSWORD_HASH_COST;
use crate::infrastructure::crypto::{JwtConfig, DEFAULT_JWT_SECRET};
use crate::infrastructure::{DatabaseConfig, SmtpConfig, StripeConfig};
use crate::shared::RetryConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "SICK_FITS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub mail: MailConfig,
    pub payment: PaymentConfig,
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown.
    pub shutdown_timeout: u64,
    /// Expose `GET /metrics`.
    pub metrics_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4444,
            shutdown_timeout: 30,
            metrics_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SeaORM connection URL (`sqlite://...` or `postgres://...`).
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let defaults = DatabaseConfig::default();
        Self {
            url: defaults.url,
            max_connections: defaults.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub session_lifetime_days: i64,
    pub reset_token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub conceal_account_existence: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: JwtConfig::default().secret,
            session_lifetime_days: 365,
            reset_token_ttl_minutes: 60,
            bcrypt_cost: PASSWORD_HASH_COST,
            conceal_account_existence: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Send through SMTP; otherwise messages are only logged.
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub starttls: bool,
    pub from: String,
    /// Storefront origin. Used for reset links and CORS.
    pub frontend_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        let smtp = SmtpConfig::default();
        let account = AccountSettings::default();
        Self {
            enabled: false,
            smtp_host: smtp.host,
            smtp_port: smtp.port,
            smtp_user: smtp.user,
            smtp_password: smtp.password,
            starttls: smtp.starttls,
            from: account.mail_from,
            frontend_url: account.frontend_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub currency: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        let stripe = StripeConfig::default();
        Self {
            stripe_secret_key: std::env::var("STRIPE_SECRET").unwrap_or_default(),
            stripe_api_base: stripe.api_base,
            currency: CheckoutSettings::default().currency,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Bootstrap administrator, created when the user table is empty.
/// An empty password disables bootstrapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@sickfits.local".to_string(),
            name: "Admin".to_string(),
            password: String::new(),
        }
    }
}

/// `~/.config/sick-fits/config.toml`, or `./config.toml` when no home
/// directory can be resolved.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("sick-fits").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Path from `$SICK_FITS_CONFIG`, else [`default_config_path`].
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

impl AppConfig {
    /// Load and validate the file at `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&contents)
    }

    pub fn parse_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret is empty".into()));
        }
        if self.security.session_lifetime_days <= 0 {
            return Err(ConfigError::Invalid(
                "security.session_lifetime_days must be positive".into(),
            ));
        }
        if self.security.reset_token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "security.reset_token_ttl_minutes must be positive".into(),
            ));
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "security.bcrypt_cost must be between 4 and 31".into(),
            ));
        }
        if self.payment.currency.len() != 3 {
            return Err(ConfigError::Invalid(
                "payment.currency must be an ISO 4217 code".into(),
            ));
        }
        Ok(())
    }

    /// True while sessions are signed with the built-in development secret.
    pub fn uses_default_jwt_secret(&self) -> bool {
        self.security.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    pub fn account_settings(&self) -> AccountSettings {
        AccountSettings {
            jwt: JwtConfig {
                secret: self.security.jwt_secret.clone(),
                expiration_hours: self.security.session_lifetime_days * 24,
                issuer: "sick-fits".to_string(),
            },
            password_cost: self.security.bcrypt_cost,
            reset_token_ttl: chrono::Duration::minutes(self.security.reset_token_ttl_minutes),
            frontend_url: self.mail.frontend_url.trim_end_matches('/').to_string(),
            mail_from: self.mail.from.clone(),
            conceal_account_existence: self.security.conceal_account_existence,
        }
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            currency: self.payment.currency.to_uppercase(),
            cleanup_retry: RetryConfig::default(),
        }
    }

    pub fn smtp_config(&self) -> SmtpConfig {
        SmtpConfig {
            host: self.mail.smtp_host.clone(),
            port: self.mail.smtp_port,
            user: self.mail.smtp_user.clone(),
            password: self.mail.smtp_password.clone(),
            starttls: self.mail.starttls,
        }
    }

    pub fn stripe_config(&self) -> StripeConfig {
        StripeConfig {
            secret_key: self.payment.stripe_secret_key.clone(),
            api_base: self.payment.stripe_api_base.trim_end_matches('/').to_string(),
        }
    }
}
