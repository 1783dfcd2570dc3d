//! # Axum Helpers
//!
//! Shared building blocks for the HTTP services in this workspace.
//!
//! - **[`auth`]**: HS256 session tokens and bearer middleware
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS configuration
//! - **[`errors`]**: the sanitized error response contract
//! - **[`extractors`]**: `UuidPath` and `ValidatedJson`

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    AuthSession, JwtAuth, JwtClaims, JwtConfig, SESSION_TOKEN_TTL, TokenError,
    jwt_auth_middleware,
};

pub use server::{
    API_PREFIX, HealthCheckFuture, HealthResponse, ReadyResponse, ShutdownCoordinator,
    create_production_app, create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{CorsConfig, create_cors_layer, create_permissive_cors_layer};

pub use errors::{AppError, ErrorCode, ErrorResponse, validation_details};

pub use extractors::{UuidPath, ValidatedJson};
