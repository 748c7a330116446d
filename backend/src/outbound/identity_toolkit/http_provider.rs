//! Reqwest-backed Identity Toolkit adapter.
//!
//! ID tokens are stateless JWTs, so sign-out has no provider call; the
//! session cookie is cleared by the caller. `watch` resolves the token once
//! through `accounts:lookup` and then ends.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::dto::{
    AccountDto, ErrorEnvelopeDto, LookupRequestDto, LookupResponseDto, PasswordRequestDto,
    UpdateRequestDto,
};
use crate::domain::ports::{AuthProvider, AuthProviderError, AuthStateStream, ProviderProfile};
use crate::domain::{AuthenticatedSession, Identity, LoginCredentials, SessionToken};

/// Public Identity Toolkit endpoint.
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/";

const SIGN_IN: &str = "accounts:signInWithPassword";
const SIGN_UP: &str = "accounts:signUp";
const UPDATE: &str = "accounts:update";
const LOOKUP: &str = "accounts:lookup";

/// [`AuthProvider`] backed by the Identity Toolkit REST API.
pub struct IdentityToolkitProvider {
    client: Client,
    base_url: Url,
    api_key: Zeroizing<String>,
}

impl IdentityToolkitProvider {
    /// Build the adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key: Zeroizing::new(api_key.into()),
        })
    }

    fn endpoint(&self, method: &str) -> Result<Url, AuthProviderError> {
        endpoint_url(&self.base_url, method, &self.api_key)
    }

    async fn password_call(
        &self,
        method: &str,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedSession, AuthProviderError> {
        let body = PasswordRequestDto {
            email: credentials.email(),
            password: credentials.password(),
            return_secure_token: true,
        };
        let account: AccountDto = post(&self.client, self.endpoint(method)?, &body).await?;
        let token = account
            .id_token
            .clone()
            .ok_or_else(|| AuthProviderError::rejected("response carried no id token"))?;
        let identity = account
            .into_identity()
            .map_err(AuthProviderError::rejected)?;
        Ok(AuthenticatedSession {
            identity,
            token: SessionToken::new(token),
        })
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitProvider {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedSession, AuthProviderError> {
        self.password_call(SIGN_IN, credentials).await
    }

    async fn sign_up(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedSession, AuthProviderError> {
        self.password_call(SIGN_UP, credentials).await
    }

    async fn update_profile(
        &self,
        token: &SessionToken,
        profile: &ProviderProfile,
    ) -> Result<Identity, AuthProviderError> {
        let mut delete_attribute = Vec::new();
        if profile.display_name.is_none() {
            delete_attribute.push("DISPLAY_NAME");
        }
        if profile.photo_url.is_none() {
            delete_attribute.push("PHOTO_URL");
        }
        let body = UpdateRequestDto {
            id_token: token.expose(),
            display_name: profile.display_name.as_deref(),
            photo_url: profile.photo_url.as_deref(),
            delete_attribute,
            return_secure_token: false,
        };
        let account: AccountDto = post(&self.client, self.endpoint(UPDATE)?, &body).await?;
        account.into_identity().map_err(AuthProviderError::rejected)
    }

    async fn sign_out(&self, _token: &SessionToken) -> Result<(), AuthProviderError> {
        debug!("identity toolkit tokens expire on their own; nothing to revoke");
        Ok(())
    }

    fn watch(&self, token: &SessionToken) -> AuthStateStream {
        let client = self.client.clone();
        let url = self.endpoint(LOOKUP);
        let token = Zeroizing::new(token.expose().to_owned());
        stream::once(async move {
            let url = match url {
                Ok(url) => url,
                Err(err) => {
                    warn!(error = %err, "cannot build lookup URL");
                    return None;
                }
            };
            let body = LookupRequestDto {
                id_token: token.as_str(),
            };
            match post::<_, LookupResponseDto>(&client, url, &body).await {
                Ok(found) => found
                    .users
                    .into_iter()
                    .next()
                    .and_then(|account| account.into_identity().ok()),
                Err(err) => {
                    warn!(error = %err, "token lookup failed; treating session as signed out");
                    None
                }
            }
        })
        .boxed()
    }
}

fn endpoint_url(base: &Url, method: &str, api_key: &str) -> Result<Url, AuthProviderError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| AuthProviderError::rejected("identity toolkit URL cannot have a path"))?
        .pop_if_empty()
        .extend(["v1", method]);
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

async fn post<B: Serialize + Sync, T: DeserializeOwned>(
    client: &Client,
    url: Url,
    body: &B,
) -> Result<T, AuthProviderError> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|err| AuthProviderError::connection(err.to_string()))?;
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|err| AuthProviderError::connection(err.to_string()))?;
    if !status.is_success() {
        return Err(map_status_error(status, bytes.as_ref()));
    }
    serde_json::from_slice(bytes.as_ref())
        .map_err(|err| AuthProviderError::rejected(format!("invalid response payload: {err}")))
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AuthProviderError {
    if status.is_server_error() {
        return AuthProviderError::connection(format!("status {}", status.as_u16()));
    }
    let message = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_default();
    map_error_message(&message)
}

/// Map an API error message such as `WEAK_PASSWORD : Password should be at
/// least 6 characters` onto the port error.
fn map_error_message(message: &str) -> AuthProviderError {
    let (code, detail) = message
        .split_once(" : ")
        .map_or((message.trim(), ""), |(code, detail)| (code.trim(), detail.trim()));
    match code {
        "EMAIL_EXISTS" => AuthProviderError::email_taken(),
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED"
        | "INVALID_EMAIL" => AuthProviderError::invalid_credentials(),
        "WEAK_PASSWORD" => AuthProviderError::weak_password(if detail.is_empty() {
            "password is too weak"
        } else {
            detail
        }),
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
            AuthProviderError::invalid_token()
        }
        "" => AuthProviderError::rejected("unrecognised error response"),
        other => AuthProviderError::rejected(other),
    }
}
