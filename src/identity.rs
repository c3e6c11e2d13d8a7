//! Identity provider abstraction
//!
//! The interactive login flow happens in the browser against the configured
//! identity provider. The server only sees the resulting principal and keeps
//! it so that a restarted process can restore the logged-in state.

mod file;
mod principal;

pub use file::FileIdentityProvider;
pub use principal::validate_principal;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub principal: String,
    pub authenticated_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            authenticated_at: Utc::now(),
        }
    }
}

/// Options passed to [`IdentityProvider::login`]
#[derive(Debug, Clone)]
pub struct LoginOptions {
    /// URL of the interactive identity provider the browser talked to
    pub identity_provider: String,
    /// Principal text the browser obtained from that provider
    pub credential: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),
    #[error("The anonymous principal cannot log in")]
    Anonymous,
    #[error("Identity storage failed: {0}")]
    Storage(#[from] std::io::Error),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn is_authenticated(&self) -> bool;

    async fn identity(&self) -> Option<Identity>;

    async fn login(&self, options: &LoginOptions) -> Result<Identity, AuthError>;

    async fn logout(&self) -> Result<(), AuthError>;
}
