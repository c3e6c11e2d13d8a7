//! Application controller

use super::access::{self, AccessEffect, AccessError, AccessEvent, AccessState};
use crate::domain::{Domain, DomainProfile};
use crate::gateway::GatewayRegistry;
use crate::identity::{AuthError, Identity, IdentityProvider, LoginOptions};
use crate::runtime::{start_session, SessionError, SessionHandle};
use crate::state_machine::SessionContext;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("No advisory session is open")]
    NoActiveSession,
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Passed through to the identity provider on login and shown to the page
    pub identity_provider_url: String,
    pub gateway_timeout: Duration,
}

/// Which view the page should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    LoggedOut,
    Home,
    Session,
}

/// Access state as seen by the page
#[derive(Debug, Clone, Serialize)]
pub struct AppView {
    pub screen: Screen,
    pub principal: Option<String>,
    pub active_domain: Option<Domain>,
    pub identity_provider: String,
    pub session_id: Option<String>,
    pub domains: Vec<&'static DomainProfile>,
}

/// Owns the access state and the one mounted session
pub struct AppController {
    identity_provider: Arc<dyn IdentityProvider>,
    gateways: GatewayRegistry,
    config: ControllerConfig,
    state: AccessState,
    session: Option<SessionHandle>,
}

impl AppController {
    /// Build the controller and adopt any identity the provider already holds.
    ///
    /// The provider is asked once; it is not polled afterwards.
    pub async fn initialize(
        identity_provider: Arc<dyn IdentityProvider>,
        gateways: GatewayRegistry,
        config: ControllerConfig,
    ) -> Self {
        let mut controller = Self {
            identity_provider,
            gateways,
            config,
            state: AccessState::LoggedOut,
            session: None,
        };

        if controller.identity_provider.is_authenticated().await {
            if let Some(identity) = controller.identity_provider.identity().await {
                tracing::info!(principal = %identity.principal, "Adopting existing identity");
                // LoggedOut always accepts Restored
                let _ = controller.apply(AccessEvent::Restored { identity });
            }
        }

        controller
    }

    pub fn state(&self) -> &AccessState {
        &self.state
    }

    /// Log in with the principal the browser obtained. Logging in again is a no-op.
    pub async fn login(&mut self, credential: &str) -> Result<Identity, AppError> {
        if let Some(identity) = self.state.identity() {
            tracing::debug!(principal = %identity.principal, "Login while already logged in");
            return Ok(identity.clone());
        }

        let options = LoginOptions {
            identity_provider: self.config.identity_provider_url.clone(),
            credential: credential.to_string(),
        };

        let identity = match self.identity_provider.login(&options).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                return Err(e.into());
            }
        };

        self.apply(AccessEvent::LoginSucceeded {
            identity: identity.clone(),
        })?;
        Ok(identity)
    }

    /// Log out. Local state is cleared even when the provider call fails.
    pub async fn logout(&mut self) {
        if let Err(e) = self.identity_provider.logout().await {
            tracing::warn!(error = %e, "Identity provider logout failed");
        }
        // LoggedOut is accepted from every state
        let _ = self.apply(AccessEvent::LoggedOut);
    }

    /// Open a fresh session for `domain`, replacing any current one
    pub fn select_domain(&mut self, domain: Domain) -> Result<SessionHandle, AppError> {
        self.apply(AccessEvent::SelectDomain { domain })?;
        self.active_session()
    }

    pub fn go_home(&mut self) -> Result<(), AppError> {
        self.apply(AccessEvent::GoHome)?;
        Ok(())
    }

    pub fn active_session(&self) -> Result<SessionHandle, AppError> {
        self.session.clone().ok_or(AppError::NoActiveSession)
    }

    pub fn view(&self) -> AppView {
        let screen = match (&self.state, &self.session) {
            (AccessState::LoggedOut, _) => Screen::LoggedOut,
            (AccessState::LoggedIn { .. }, Some(_)) => Screen::Session,
            (AccessState::LoggedIn { .. }, None) => Screen::Home,
        };

        AppView {
            screen,
            principal: self.state.identity().map(|i| i.principal.clone()),
            active_domain: self.state.active_domain(),
            identity_provider: self.config.identity_provider_url.clone(),
            session_id: self.session.as_ref().map(|s| s.session_id().to_string()),
            domains: Domain::ALL.iter().map(|d| d.profile()).collect(),
        }
    }

    fn apply(&mut self, event: AccessEvent) -> Result<(), AccessError> {
        let result = access::transition(&self.state, event)?;
        self.state = result.new_state;

        for effect in result.effects {
            match effect {
                AccessEffect::MountSession { domain } => {
                    let context = SessionContext::for_domain(domain);
                    tracing::info!(
                        session_id = %context.session_id,
                        domain = %domain,
                        "Mounting session"
                    );
                    let gateway = self.gateways.get(domain);
                    self.session = Some(start_session(context, gateway, self.config.gateway_timeout));
                }
                AccessEffect::UnmountSession => {
                    // Dropping the last handle stops the runtime
                    if let Some(session) = self.session.take() {
                        tracing::info!(
                            session_id = %session.session_id(),
                            domain = %session.domain(),
                            "Unmounting session"
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
