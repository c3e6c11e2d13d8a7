//! Pure access state machine

use crate::domain::Domain;
use crate::identity::Identity;
use thiserror::Error;

/// Who is logged in and which domain they are looking at.
///
/// An active domain without an identity cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccessState {
    #[default]
    LoggedOut,
    LoggedIn {
        identity: Identity,
        active_domain: Option<Domain>,
    },
}

impl AccessState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AccessState::LoggedOut => None,
            AccessState::LoggedIn { identity, .. } => Some(identity),
        }
    }

    pub fn active_domain(&self) -> Option<Domain> {
        match self {
            AccessState::LoggedOut => None,
            AccessState::LoggedIn { active_domain, .. } => *active_domain,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, AccessState::LoggedIn { .. })
    }
}

#[derive(Debug, Clone)]
pub enum AccessEvent {
    /// Identity found by the startup check
    Restored { identity: Identity },
    LoginSucceeded { identity: Identity },
    LoggedOut,
    SelectDomain { domain: Domain },
    GoHome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessEffect {
    /// Construct a fresh session for the domain
    MountSession { domain: Domain },
    /// Discard the current session
    UnmountSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Not logged in")]
    NotAuthenticated,
    #[error("Already logged in")]
    AlreadyLoggedIn,
}

#[derive(Debug, Clone)]
pub struct AccessTransition {
    pub new_state: AccessState,
    pub effects: Vec<AccessEffect>,
}

impl AccessTransition {
    fn to(new_state: AccessState) -> Self {
        Self {
            new_state,
            effects: Vec::new(),
        }
    }

    fn with_effect(mut self, effect: AccessEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

pub fn transition(state: &AccessState, event: AccessEvent) -> Result<AccessTransition, AccessError> {
    match (state, event) {
        (
            AccessState::LoggedOut,
            AccessEvent::Restored { identity } | AccessEvent::LoginSucceeded { identity },
        ) => Ok(AccessTransition::to(AccessState::LoggedIn {
            identity,
            active_domain: None,
        })),
        (
            AccessState::LoggedIn { .. },
            AccessEvent::Restored { .. } | AccessEvent::LoginSucceeded { .. },
        ) => Err(AccessError::AlreadyLoggedIn),

        // Logout is unconditional
        (_, AccessEvent::LoggedOut) => {
            let result = AccessTransition::to(AccessState::LoggedOut);
            if state.active_domain().is_some() {
                Ok(result.with_effect(AccessEffect::UnmountSession))
            } else {
                Ok(result)
            }
        }

        (AccessState::LoggedOut, AccessEvent::SelectDomain { .. } | AccessEvent::GoHome) => {
            Err(AccessError::NotAuthenticated)
        }

        // Re-selecting, even the same domain, always builds a new session
        (
            AccessState::LoggedIn {
                identity,
                active_domain,
            },
            AccessEvent::SelectDomain { domain },
        ) => {
            let mut result = AccessTransition::to(AccessState::LoggedIn {
                identity: identity.clone(),
                active_domain: Some(domain),
            });
            if active_domain.is_some() {
                result = result.with_effect(AccessEffect::UnmountSession);
            }
            Ok(result.with_effect(AccessEffect::MountSession { domain }))
        }

        (
            AccessState::LoggedIn {
                identity,
                active_domain,
            },
            AccessEvent::GoHome,
        ) => {
            let result = AccessTransition::to(AccessState::LoggedIn {
                identity: identity.clone(),
                active_domain: None,
            });
            if active_domain.is_some() {
                Ok(result.with_effect(AccessEffect::UnmountSession))
            } else {
                Ok(result)
            }
        }
    }
}
