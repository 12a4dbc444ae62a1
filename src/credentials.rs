//! Mapbox access token resolution
//!
//! Only public tokens (prefix `pk`) may be embedded in generated markup, since
//! the token ends up in plain text inside the notebook.

use std::fmt;

use crate::error::{CredentialError, ACCESS_TOKEN_ENV_VAR};

const PUBLIC_TOKEN_PREFIX: &str = "pk";

/// A validated public Mapbox access token
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Resolve a token from an explicit value, falling back to `MAPBOX_ACCESS_TOKEN`
    pub fn resolve(explicit: Option<&str>) -> Result<Self, CredentialError> {
        Self::resolve_with(explicit, |name| std::env::var(name).ok())
    }

    /// Resolve a token using `lookup` for the environment fallback
    pub fn resolve_with<F>(explicit: Option<&str>, lookup: F) -> Result<Self, CredentialError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let token = match explicit {
            Some(token) => token.to_string(),
            None => lookup(ACCESS_TOKEN_ENV_VAR).unwrap_or_default(),
        };

        if token.is_empty() {
            return Err(CredentialError::Missing {
                env_var: ACCESS_TOKEN_ENV_VAR,
            });
        }
        if !token.starts_with(PUBLIC_TOKEN_PREFIX) {
            return Err(CredentialError::NotPublic);
        }

        Ok(AccessToken(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Public tokens are not secret, but keep logs short
        let shown: String = self.0.chars().take(8).collect();
        write!(f, "AccessToken({}…)", shown)
    }
}
