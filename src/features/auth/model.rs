use std::fmt;

use base64::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::auth::AuthError;

/// Username and password presented by an admin
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse an `Authorization: Basic <base64(user:pass)>` header value
    pub fn from_basic_header(value: &str) -> Result<Self, AuthError> {
        let encoded = value
            .strip_prefix("Basic ")
            .ok_or(AuthError::MalformedHeader)?;
        let decoded = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::MalformedHeader)?;
        let pair = String::from_utf8(decoded).map_err(|_| AuthError::MalformedHeader)?;
        let (username, password) = pair.split_once(':').ok_or(AuthError::MalformedHeader)?;

        Ok(Self::new(username, password))
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Proof that a request passed the admin gate
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminSession {
    pub username: String,
    pub authenticated_at: DateTime<Utc>,
}
