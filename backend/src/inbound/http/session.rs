//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The signed-in state lives in an encrypted cookie holding the provider
//! token and the uid it was issued for. Handlers never trust the cookie on
//! its own: [`SessionContext::resolve`] asks the auth provider about the
//! token on every request and clears the cookie once the provider stops
//! recognising it.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::ports::AuthProvider;
use crate::domain::{
    AuthService, AuthenticatedSession, Error, Identity, SessionState, SessionToken, UserId,
};

pub(crate) const TOKEN_KEY: &str = "token";
pub(crate) const USER_ID_KEY: &str = "uid";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store a freshly issued provider session, rotating the cookie.
    pub fn persist(&self, session: &AuthenticatedSession) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, session.identity.uid.as_ref())
            .and_then(|()| self.0.insert(TOKEN_KEY, session.token.expose()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The stored provider token, if any.
    pub fn token(&self) -> Result<Option<SessionToken>, Error> {
        let token = self
            .0
            .get::<String>(TOKEN_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(token.map(SessionToken::new))
    }

    fn stored_user_id(&self) -> Option<UserId> {
        match self.0.get::<String>(USER_ID_KEY) {
            Ok(Some(raw)) => match UserId::new(raw) {
                Ok(id) => Some(id),
                Err(error) => {
                    warn!("invalid user id in session cookie: {error}");
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                warn!("unreadable user id in session cookie: {error}");
                None
            }
        }
    }

    /// Drop everything stored in the session and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Resolve the cookie into a [`SessionState`] through the auth provider.
    ///
    /// A token the provider no longer accepts, or one whose identity does not
    /// match the uid it was stored with, signs the visitor out.
    pub async fn resolve<A>(&self, auth: &AuthService<A>) -> Result<SessionState, Error>
    where
        A: AuthProvider + ?Sized,
    {
        let Some(token) = self.token()? else {
            return Ok(SessionState::signed_out());
        };
        let state = auth.resolve(Some(&token)).await;
        let Some(uid) = state.user_id() else {
            debug!("stored token rejected; clearing session");
            self.clear();
            return Ok(state);
        };
        if self.stored_user_id().as_ref() != Some(uid) {
            warn!(uid = %uid, "session uid does not match token identity; clearing session");
            self.clear();
            return Ok(SessionState::signed_out());
        }
        Ok(state)
    }

    /// Resolve the session and require a signed-in identity.
    ///
    /// Returns the identity with the token it was resolved from, or
    /// `401 Unauthorized`.
    pub async fn authenticate<A>(
        &self,
        auth: &AuthService<A>,
    ) -> Result<(Identity, SessionToken), Error>
    where
        A: AuthProvider + ?Sized,
    {
        let state = self.resolve(auth).await?;
        let identity = state.require_user()?.clone();
        let token = self
            .token()?
            .ok_or_else(|| Error::unauthorized("sign in required"))?;
        Ok((identity, token))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
