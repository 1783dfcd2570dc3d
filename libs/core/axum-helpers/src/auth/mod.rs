//! Authentication module.
//!
//! - HS256 session tokens ([`JwtAuth`]) signed with a key from [`JwtConfig`]
//! - Bearer middleware that verifies the token and exposes an [`AuthSession`]
//!
//! ```ignore
//! let config = JwtConfig::from_env()?;
//! let auth = JwtAuth::new(&config);
//!
//! let protected = Router::new()
//!     .route("/user/profile", get(handler))
//!     .route_layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims, SESSION_TOKEN_TTL, TokenError};
pub use middleware::{AuthSession, jwt_auth_middleware};
