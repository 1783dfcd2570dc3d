//! Configuration for Spectacles API

use axum_helpers::{CorsConfig, JwtConfig};
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_users::UsersConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub users: UsersConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let app = app_info!();
        Ok(Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            mongodb: MongoConfig::from_env()?.with_app_name(app.name),
            jwt: JwtConfig::from_env()?,
            cors: CorsConfig::from_env()?,
            users: UsersConfig::from_env()?,
            app,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "config-test-secret-with-at-least-32-chars";

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("JWT_SECRET", Some(SECRET)),
                ("PORT", Some("8088")),
                ("CORS_ALLOWED_ORIGIN", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "spectacles_api");
                assert_eq!(config.server.port, 8088);
                assert_eq!(config.mongodb.app_name.as_deref(), Some("spectacles_api"));
                assert!(config.cors.allowed_origins.is_none());
            },
        );
    }

    #[test]
    fn test_missing_jwt_secret_fails_closed() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("JWT_SECRET", None),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_short_jwt_secret_is_rejected() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("JWT_SECRET", Some("short")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
