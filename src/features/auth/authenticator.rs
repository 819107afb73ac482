use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::config::AdminConfig;
use crate::core::error::AppError;
use crate::features::auth::model::{AdminCredentials, AdminSession};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredentials,

    #[error("Invalid authorization header format")]
    MalformedHeader,

    #[error("Invalid username or password")]
    InvalidCredentials,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

/// Gate in front of the admin endpoints
pub trait AdminAuthenticator: Send + Sync {
    fn authenticate(&self, credentials: &AdminCredentials) -> Result<AdminSession, AuthError>;
}

/// Accepts exactly one configured username/password pair
pub struct StaticCredentialAuthenticator {
    username: String,
    password_digest: [u8; 32],
}

impl StaticCredentialAuthenticator {
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password_digest: digest(password),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        if config.using_defaults {
            warn!(
                "ADMIN_USERNAME/ADMIN_PASSWORD not set, admin endpoints accept the default credentials"
            );
        }
        Self::new(config.username.clone(), &config.password)
    }
}

impl AdminAuthenticator for StaticCredentialAuthenticator {
    fn authenticate(&self, credentials: &AdminCredentials) -> Result<AdminSession, AuthError> {
        // Compare fixed-size digests so the check does not short-circuit on length
        let password_ok = digest(&credentials.password) == self.password_digest;
        let username_ok = credentials.username == self.username;

        if !(username_ok && password_ok) {
            debug!("Admin login rejected for '{}'", credentials.username);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(AdminSession {
            username: credentials.username.clone(),
            authenticated_at: Utc::now(),
        })
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
