//! Process-local auth provider.
//!
//! Accounts and issued tokens live in memory. Identity changes (sign-out,
//! profile edits) are fanned out over a broadcast channel so every
//! `watch` stream for the affected account observes them.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{AuthProvider, AuthProviderError, AuthStateStream, ProviderProfile};
use crate::domain::{AuthenticatedSession, Identity, LoginCredentials, SessionToken, UserId};

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug)]
struct Account {
    password: Zeroizing<String>,
    identity: Identity,
}

#[derive(Debug, Default)]
struct Accounts {
    by_email: HashMap<String, Account>,
    tokens: HashMap<String, UserId>,
}

impl Accounts {
    fn identity_for(&self, uid: &UserId) -> Option<&Identity> {
        self.by_email
            .values()
            .map(|account| &account.identity)
            .find(|identity| &identity.uid == uid)
    }

    fn account_for_mut(&mut self, uid: &UserId) -> Option<&mut Account> {
        self.by_email
            .values_mut()
            .find(|account| &account.identity.uid == uid)
    }

    fn resolve(&self, token: &str) -> Option<Identity> {
        self.tokens
            .get(token)
            .and_then(|uid| self.identity_for(uid))
            .cloned()
    }

    fn issue(&mut self, identity: Identity) -> AuthenticatedSession {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), identity.uid.clone());
        AuthenticatedSession {
            identity,
            token: SessionToken::new(token),
        }
    }
}

/// Identity change for one account. `token` narrows the change to a single
/// session; `None` applies to every session of the account.
#[derive(Debug, Clone)]
struct IdentityEvent {
    uid: UserId,
    token: Option<String>,
    identity: Option<Identity>,
}

/// In-memory [`AuthProvider`] used for development and tests.
#[derive(Debug)]
pub struct MemoryAuthProvider {
    accounts: Mutex<Accounts>,
    events: broadcast::Sender<IdentityEvent>,
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthProvider {
    /// Create a provider with no accounts.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts: Mutex::new(Accounts::default()),
            events,
        }
    }

    fn accounts(&self) -> MutexGuard<'_, Accounts> {
        // Critical sections never panic mid-update, so a poisoned map is
        // still consistent.
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: IdentityEvent) {
        // No receivers simply means nobody is watching.
        let delivered = self.events.send(event).unwrap_or(0);
        debug!(delivered, "identity event published");
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedSession, AuthProviderError> {
        let mut accounts = self.accounts();
        let identity = accounts
            .by_email
            .get(credentials.email())
            .filter(|account| account.password.as_str() == credentials.password())
            .map(|account| account.identity.clone())
            .ok_or_else(AuthProviderError::invalid_credentials)?;
        Ok(accounts.issue(identity))
    }

    async fn sign_up(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedSession, AuthProviderError> {
        if credentials.password().chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthProviderError::weak_password(format!(
                "password should be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let mut accounts = self.accounts();
        if accounts.by_email.contains_key(credentials.email()) {
            return Err(AuthProviderError::email_taken());
        }
        let identity = Identity::new(UserId::random()).with_email(credentials.email());
        accounts.by_email.insert(
            credentials.email().to_owned(),
            Account {
                password: Zeroizing::new(credentials.password().to_owned()),
                identity: identity.clone(),
            },
        );
        info!(uid = %identity.uid, "account registered");
        Ok(accounts.issue(identity))
    }

    async fn update_profile(
        &self,
        token: &SessionToken,
        profile: &ProviderProfile,
    ) -> Result<Identity, AuthProviderError> {
        let updated = {
            let mut accounts = self.accounts();
            let uid = accounts
                .tokens
                .get(token.expose())
                .cloned()
                .ok_or_else(AuthProviderError::invalid_token)?;
            let account = accounts
                .account_for_mut(&uid)
                .ok_or_else(AuthProviderError::invalid_token)?;
            account.identity.display_name = profile.display_name.clone();
            account.identity.photo_url = profile.photo_url.clone();
            account.identity.clone()
        };
        self.publish(IdentityEvent {
            uid: updated.uid.clone(),
            token: None,
            identity: Some(updated.clone()),
        });
        Ok(updated)
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<(), AuthProviderError> {
        let removed = self.accounts().tokens.remove(token.expose());
        if let Some(uid) = removed {
            self.publish(IdentityEvent {
                uid,
                token: Some(token.expose().to_owned()),
                identity: None,
            });
        }
        Ok(())
    }

    fn watch(&self, token: &SessionToken) -> AuthStateStream {
        // Subscribe before reading so no change between the two is lost.
        let receiver = self.events.subscribe();
        let initial = self.accounts().resolve(token.expose());
        let Some(uid) = initial.as_ref().map(|identity| identity.uid.clone()) else {
            return stream::iter([None]).boxed();
        };
        let token = token.expose().to_owned();
        let changes = stream::unfold(receiver, move |mut receiver| {
            let uid = uid.clone();
            let token = token.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(event)
                            if event.uid == uid
                                && event.token.as_ref().is_none_or(|t| *t == token) =>
                        {
                            return Some((event.identity, receiver));
                        }
                        Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        });
        stream::iter([initial]).chain(changes).boxed()
    }
}
