//! Signed-in identity tracking.
//!
//! [`AuthSessionObserver`] subscribes once to an [`AuthStateStream`] and
//! republishes each change as a [`SessionState`] snapshot. Owners hold the
//! observer for as long as they need session updates; dropping it ends the
//! subscription.

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::ports::AuthStateStream;
use super::{Error, Identity, UserId};

/// Snapshot of the current session.
///
/// `loading` stays `true` until the provider reports for the first time.
/// While loading, `user == None` means "not yet known", not "signed out".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Signed-in identity, if any.
    pub user: Option<Identity>,
    /// Whether the provider has not reported yet.
    pub loading: bool,
}

impl SessionState {
    /// State before the provider's first report.
    pub fn loading() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    /// Resolved, signed in as `identity`.
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            user: Some(identity),
            loading: false,
        }
    }

    /// Resolved, signed out.
    pub fn signed_out() -> Self {
        Self {
            user: None,
            loading: false,
        }
    }

    /// Uid of the signed-in user, if resolved and signed in.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|identity| &identity.uid)
    }

    /// Signed-in identity or an `unauthorized` error.
    ///
    /// A still-loading session is treated as signed out; callers that can
    /// wait should use [`AuthSessionObserver::wait_until_resolved`] first.
    pub fn require_user(&self) -> Result<&Identity, Error> {
        self.user
            .as_ref()
            .ok_or_else(|| Error::unauthorized("sign in required"))
    }
}

/// Publishes [`SessionState`] snapshots from an auth state stream.
///
/// # Examples
/// ```
/// use futures_util::stream;
/// use futures_util::StreamExt;
/// use pinboard::domain::{AuthSessionObserver, Identity, UserId};
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let identity = Identity::new(UserId::new("u1").expect("uid"));
/// let observer = AuthSessionObserver::spawn(stream::iter([Some(identity.clone())]).boxed());
/// let state = observer.wait_until_resolved().await;
/// assert_eq!(state.user, Some(identity));
/// # });
/// ```
#[derive(Debug)]
pub struct AuthSessionObserver {
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl AuthSessionObserver {
    /// Subscribe to `changes` on a background task.
    pub fn spawn(mut changes: AuthStateStream) -> Self {
        let (tx, rx) = watch::channel(SessionState::loading());
        let task = tokio::spawn(async move {
            while let Some(user) = changes.next().await {
                debug!(signed_in = user.is_some(), "auth state changed");
                let next = SessionState {
                    user,
                    loading: false,
                };
                if tx.send(next).is_err() {
                    return;
                }
            }
            // Provider went quiet without ever reporting: settle as signed out.
            tx.send_if_modified(|state| {
                let was_loading = state.loading;
                state.loading = false;
                was_loading
            });
        });
        Self { state: rx, task }
    }

    /// Latest snapshot.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Wait for the first provider report and return that snapshot.
    pub async fn wait_until_resolved(&self) -> SessionState {
        let mut rx = self.state.clone();
        let resolved = rx.wait_for(|state| !state.loading).await.map(|state| state.clone());
        match resolved {
            Ok(state) => state,
            Err(_) => {
                let state = rx.borrow().clone();
                if state.loading {
                    SessionState::signed_out()
                } else {
                    state
                }
            }
        }
    }

    /// Resolved identity or an `unauthorized` error.
    pub async fn require_user(&self) -> Result<Identity, Error> {
        let state = self.wait_until_resolved().await;
        state.require_user().cloned()
    }
}

impl Drop for AuthSessionObserver {
    fn drop(&mut self) {
        self.task.abort();
    }
}
