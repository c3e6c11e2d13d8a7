//! Mock identity provider for controller tests

use crate::identity::{validate_principal, AuthError, Identity, IdentityProvider, LoginOptions};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// In-memory identity provider with scriptable failures
#[derive(Default)]
pub struct MockIdentityProvider {
    current: Mutex<Option<Identity>>,
    login_errors: Mutex<VecDeque<AuthError>>,
    logout_errors: Mutex<VecDeque<AuthError>>,
    /// Every options value passed to `login`
    pub logins: Mutex<Vec<LoginOptions>>,
    pub logout_calls: Mutex<usize>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that already holds an authenticated identity
    pub fn authenticated(principal: &str) -> Self {
        let provider = Self::new();
        *provider.current.lock().unwrap() = Some(Identity::new(principal));
        provider
    }

    pub fn fail_next_login(&self, error: AuthError) {
        self.login_errors.lock().unwrap().push_back(error);
    }

    pub fn fail_next_logout(&self, error: AuthError) {
        self.logout_errors.lock().unwrap().push_back(error);
    }

    pub fn login_count(&self) -> usize {
        self.logins.lock().unwrap().len()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn is_authenticated(&self) -> bool {
        self.current.lock().unwrap().is_some()
    }

    async fn identity(&self) -> Option<Identity> {
        self.current.lock().unwrap().clone()
    }

    async fn login(&self, options: &LoginOptions) -> Result<Identity, AuthError> {
        self.logins.lock().unwrap().push(options.clone());
        if let Some(error) = self.login_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        let identity = Identity::new(validate_principal(&options.credential)?);
        *self.current.lock().unwrap() = Some(identity.clone());
        Ok(identity)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        *self.logout_calls.lock().unwrap() += 1;
        if let Some(error) = self.logout_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        *self.current.lock().unwrap() = None;
        Ok(())
    }
}
