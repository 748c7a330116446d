//! Sign-in, sign-up and session resolution over the auth provider port.

use std::sync::Arc;

use tracing::{info, warn};

use super::ports::AuthProvider;
use super::{AuthSessionObserver, AuthenticatedSession, Error, LoginCredentials, SessionState, SessionToken};

/// Authentication use-cases.
pub struct AuthService<A: ?Sized> {
    provider: Arc<A>,
}

impl<A: ?Sized> Clone for AuthService<A> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<A> AuthService<A>
where
    A: AuthProvider + ?Sized,
{
    /// Wrap a provider.
    pub fn new(provider: Arc<A>) -> Self {
        Self { provider }
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, credentials: &LoginCredentials) -> Result<AuthenticatedSession, Error> {
        let session = self.provider.sign_in(credentials).await?;
        info!(uid = %session.identity.uid, "user signed in");
        Ok(session)
    }

    /// Register and sign in.
    pub async fn sign_up(&self, credentials: &LoginCredentials) -> Result<AuthenticatedSession, Error> {
        let session = self.provider.sign_up(credentials).await?;
        info!(uid = %session.identity.uid, "user signed up");
        Ok(session)
    }

    /// Revoke the provider session. Failures are logged; the caller still
    /// clears its local session.
    pub async fn sign_out(&self, token: &SessionToken) {
        if let Err(err) = self.provider.sign_out(token).await {
            warn!(error = %err, "provider sign-out failed");
        }
    }

    /// Observe identity changes for `token`.
    pub fn observe(&self, token: &SessionToken) -> AuthSessionObserver {
        AuthSessionObserver::spawn(self.provider.watch(token))
    }

    /// Resolve a possibly absent token to a settled session state.
    pub async fn resolve(&self, token: Option<&SessionToken>) -> SessionState {
        match token {
            Some(token) => self.observe(token).wait_until_resolved().await,
            None => SessionState::signed_out(),
        }
    }
}
