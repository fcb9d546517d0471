//! Gateway configuration.

use common::{
    env_opt, env_parse, ConfigError, CorsConfig, DatabaseConfig, HasherConfig, JwtConfig,
    ServiceConfig,
};
use domain::{DEFAULT_HASH_COST, DEFAULT_TOKEN_ISSUER, DEFAULT_TOKEN_LIFETIME_HOURS};

/// Signing key used by debug builds when JWT_SECRET is unset.
const DEV_JWT_SECRET: &str = "dev-only-insecure-jwt-secret-change-me";

/// Upper bound for JWT_EXPIRATION_HOURS (ten years).
const MAX_TOKEN_LIFETIME_HOURS: i64 = 87_600;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServiceConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub hasher: HasherConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = ServiceConfig::default();
        let server = ServiceConfig {
            host: env_opt("SERVER_HOST").unwrap_or(defaults.host),
            port: env_parse("SERVER_PORT", defaults.port)?,
        };

        let expiration_hours = env_parse("JWT_EXPIRATION_HOURS", DEFAULT_TOKEN_LIFETIME_HOURS)?;
        if expiration_hours > MAX_TOKEN_LIFETIME_HOURS {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRATION_HOURS",
                value: expiration_hours.to_string(),
            });
        }

        let jwt = JwtConfig {
            secret: resolve_jwt_secret(env_opt("JWT_SECRET"))?,
            expiration_hours,
            issuer: env_opt("JWT_ISSUER").unwrap_or_else(|| DEFAULT_TOKEN_ISSUER.to_string()),
        };
        jwt.validate()?;

        Ok(Self {
            server,
            database: database_from_env(),
            jwt,
            hasher: HasherConfig {
                cost: env_parse("PASSWORD_HASH_COST", DEFAULT_HASH_COST)?,
            },
            cors: env_opt("CORS_ALLOW_ORIGINS")
                .map(|raw| CorsConfig::from_list(&raw))
                .unwrap_or_default(),
        })
    }
}

/// Database settings alone; migration commands need nothing else.
pub fn database_from_env() -> DatabaseConfig {
    env_opt("DATABASE_URL")
        .map(|url| DatabaseConfig { url })
        .unwrap_or_default()
}

fn resolve_jwt_secret(configured: Option<String>) -> Result<String, ConfigError> {
    match configured {
        Some(secret) => Ok(secret),
        None if cfg!(debug_assertions) => {
            tracing::warn!("JWT_SECRET is not set, using an insecure development secret");
            Ok(DEV_JWT_SECRET.to_string())
        }
        None => Err(ConfigError::Missing("JWT_SECRET")),
    }
}
