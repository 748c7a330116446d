//! Driven port for the hosted authentication provider.
//!
//! Besides the credential operations, the provider exposes a per-token stream
//! of identity changes. The first item resolves the token; later items report
//! sign-out (`None`) or profile changes. A stream that ends keeps the last
//! reported identity.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use super::define_port_error;
use crate::domain::{AuthenticatedSession, Error, Identity, LoginCredentials, SessionToken};

/// Stream of identity snapshots; `None` means signed out.
pub type AuthStateStream = BoxStream<'static, Option<Identity>>;

/// Provider-side profile attributes mirrored from the profile document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderProfile {
    /// New display name; `None` clears it.
    pub display_name: Option<String>,
    /// New avatar URL; `None` clears it.
    pub photo_url: Option<String>,
}

define_port_error! {
    /// Errors raised by auth provider adapters.
    pub enum AuthProviderError {
        /// Unknown email or wrong password.
        InvalidCredentials => "invalid email or password",
        /// Sign-up with an email that already has an account.
        EmailTaken => "an account already exists for this email",
        /// The provider rejected the password as too weak.
        WeakPassword { message: String } => "password rejected: {message}",
        /// The provider could not be reached.
        Connection { message: String } => "auth provider unreachable: {message}",
        /// The token is unknown, expired or revoked.
        InvalidToken => "session token is no longer valid",
        /// Any other provider-side rejection.
        Rejected { message: String } => "auth provider rejected the request: {message}",
    }
}

impl From<AuthProviderError> for Error {
    fn from(value: AuthProviderError) -> Self {
        match value {
            AuthProviderError::InvalidCredentials => Error::unauthorized("invalid email or password"),
            AuthProviderError::InvalidToken => Error::unauthorized("session expired; sign in again"),
            AuthProviderError::EmailTaken => {
                Error::conflict("an account already exists for this email")
            }
            AuthProviderError::WeakPassword { message } => {
                Error::invalid_request(format!("password rejected: {message}"))
            }
            AuthProviderError::Connection { message } => {
                Error::service_unavailable(format!("auth provider unavailable: {message}"))
            }
            AuthProviderError::Rejected { message } => {
                Error::internal(format!("auth provider error: {message}"))
            }
        }
    }
}

/// Credential operations and identity change notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Sign in with email and password.
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedSession, AuthProviderError>;

    /// Create an account and sign it in.
    async fn sign_up(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedSession, AuthProviderError>;

    /// Update the provider's copy of the display name and avatar.
    async fn update_profile(
        &self,
        token: &SessionToken,
        profile: &ProviderProfile,
    ) -> Result<Identity, AuthProviderError>;

    /// Revoke the session behind `token`. Unknown tokens are ignored.
    async fn sign_out(&self, token: &SessionToken) -> Result<(), AuthProviderError>;

    /// Subscribe to identity changes for `token`.
    fn watch(&self, token: &SessionToken) -> AuthStateStream;
}
