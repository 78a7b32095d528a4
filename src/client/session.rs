//! The authenticated session held by a [`NewtClient`](super::NewtClient)

use std::time::{Duration, SystemTime};

use crate::models::AuthStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    LoggedOut,
}

/// What the client knows about its login, as last reported by the gateway.
///
/// Cookies themselves stay inside the transport. This value only records the
/// identity and lifetime so that expiry can be reasoned about; nothing here
/// re-authenticates on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    username: String,
    state: AuthState,
    session_id: Option<String>,
    lifetime: Option<Duration>,
    established_at: SystemTime,
}

impl AuthSession {
    pub(crate) fn authenticated(username: &str, status: &AuthStatus) -> Self {
        Self {
            username: username.to_string(),
            state: AuthState::Authenticated,
            session_id: status.newt_sessionid.clone(),
            lifetime: status.session_lifetime.map(Duration::from_secs),
            established_at: SystemTime::now(),
        }
    }

    pub(crate) fn mark_logged_out(&mut self) {
        self.state = AuthState::LoggedOut;
        self.session_id = None;
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn established_at(&self) -> SystemTime {
        self.established_at
    }

    /// When the gateway will drop the session, if it reported a lifetime
    pub fn expires_at(&self) -> Option<SystemTime> {
        self.lifetime.map(|lifetime| self.established_at + lifetime)
    }

    /// Logged out, or past the reported lifetime at `now`
    pub fn is_expired(&self, now: SystemTime) -> bool {
        if !self.is_authenticated() {
            return true;
        }
        match self.expires_at() {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }
}
