use axum::http::{HeaderValue, Method, header};
use core_config::{ConfigError, FromEnv};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Cross-origin policy.
///
/// `CORS_ALLOWED_ORIGIN` unset accepts any origin. A comma-separated list
/// restricts origins and enables credentials.
#[derive(Clone, Debug, Default)]
pub struct CorsConfig {
    pub allowed_origins: Option<Vec<HeaderValue>>,
}

impl FromEnv for CorsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let Ok(raw) = std::env::var("CORS_ALLOWED_ORIGIN") else {
            return Ok(Self::default());
        };

        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::ParseError {
                key: "CORS_ALLOWED_ORIGIN".to_string(),
                details: e.to_string(),
            })?;

        if origins.is_empty() {
            return Err(ConfigError::ParseError {
                key: "CORS_ALLOWED_ORIGIN".to_string(),
                details: "must list at least one origin when set".to_string(),
            });
        }

        Ok(Self {
            allowed_origins: Some(origins),
        })
    }
}

impl CorsConfig {
    pub fn layer(&self) -> CorsLayer {
        match &self.allowed_origins {
            Some(origins) => create_cors_layer(origins.clone()),
            None => create_permissive_cors_layer(),
        }
    }
}

/// Creates a CORS layer restricted to `allowed_origins`, with
/// credentials allowed and a 1 hour preflight cache.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Allows any origin.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_config_unset_is_permissive() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            let config = CorsConfig::from_env().unwrap();
            assert!(config.allowed_origins.is_none());
        });
    }

    #[test]
    fn test_cors_config_parses_list() {
        temp_env::with_var(
            "CORS_ALLOWED_ORIGIN",
            Some("http://localhost:3000, https://shop.example.com"),
            || {
                let origins = CorsConfig::from_env().unwrap().allowed_origins.unwrap();
                assert_eq!(origins.len(), 2);
                assert_eq!(origins[1], "https://shop.example.com");
            },
        );
    }

    #[test]
    fn test_cors_config_rejects_empty_list() {
        temp_env::with_var("CORS_ALLOWED_ORIGIN", Some(" , "), || {
            assert!(CorsConfig::from_env().is_err());
        });
    }
}
