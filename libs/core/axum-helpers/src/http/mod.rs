//! HTTP middleware module.

pub mod cors;

pub use cors::{CorsConfig, create_cors_layer, create_permissive_cors_layer};
