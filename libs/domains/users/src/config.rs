use core_config::{ConfigError, FromEnv, env_or_default};
use std::path::PathBuf;

pub const DEFAULT_RESET_PASSWORD_URL: &str = "http://localhost:4000/reset-password";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Settings for the account flows
#[derive(Debug, Clone)]
pub struct UsersConfig {
    /// Base of the link mailed by forgot-password; the token is appended as a path segment
    pub reset_password_url: String,
    /// Directory profile pictures are written to
    pub upload_dir: PathBuf,
}

impl UsersConfig {
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/{}", self.reset_password_url.trim_end_matches('/'), token)
    }
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            reset_password_url: DEFAULT_RESET_PASSWORD_URL.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
        }
    }
}

impl FromEnv for UsersConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            reset_password_url: env_or_default("RESET_PASSWORD_URL", DEFAULT_RESET_PASSWORD_URL),
            upload_dir: PathBuf::from(env_or_default("UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
        })
    }
}
