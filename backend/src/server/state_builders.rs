//! Builders for the adapters behind [`HttpStatePorts`].

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;
use tracing::{info, warn};

use pinboard::domain::ports::{AuthProvider, DocumentStore, FixtureImageSource, ImageSource};
use pinboard::inbound::http::state::HttpStatePorts;
use pinboard::outbound::firestore::{DEFAULT_FIRESTORE_URL, FirestoreHttpStore, FirestoreSettings};
use pinboard::outbound::identity_toolkit::{DEFAULT_IDENTITY_TOOLKIT_URL, IdentityToolkitProvider};
use pinboard::outbound::memory::{MemoryAuthProvider, MemoryDocumentStore};
use pinboard::outbound::unsplash::UnsplashHttpSource;

use super::config::{AppSettings, AuthBackend, SettingsError, StoreBackend, parse_url};

/// Errors raised while constructing adapters.
#[derive(Debug, thiserror::Error)]
pub enum StateBuildError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to build {adapter} adapter: {message}")]
    Adapter {
        adapter: &'static str,
        message: String,
    },
}

impl StateBuildError {
    fn adapter(adapter: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Adapter {
            adapter,
            message: err.to_string(),
        }
    }
}

/// Build every port the HTTP and WebSocket adapters depend on.
pub fn build_ports(settings: &AppSettings) -> Result<HttpStatePorts, StateBuildError> {
    let timeout = settings.http_timeout()?;
    Ok(HttpStatePorts {
        store: build_store(settings, timeout)?,
        auth: build_auth(settings, timeout)?,
        images: build_images(settings, timeout)?,
        clock: Arc::new(DefaultClock),
        feed_page_size: settings.feed_page_size()?,
    })
}

fn build_store(
    settings: &AppSettings,
    timeout: Duration,
) -> Result<Arc<dyn DocumentStore>, StateBuildError> {
    match settings.store_backend()? {
        StoreBackend::Memory => {
            warn!("using in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Firestore => {
            let project_id = settings
                .firestore_project
                .clone()
                .ok_or(SettingsError::Missing {
                    name: "PINBOARD_FIRESTORE_PROJECT",
                })?;
            let base_url = parse_url(
                "PINBOARD_FIRESTORE_URL",
                settings
                    .firestore_url
                    .as_deref()
                    .unwrap_or(DEFAULT_FIRESTORE_URL),
            )?;
            info!(project = %project_id, url = %base_url, "using Firestore document store");
            let store = FirestoreHttpStore::new(FirestoreSettings {
                base_url,
                project_id,
                bearer_token: settings.firestore_token.clone(),
                timeout,
            })
            .map_err(|err| StateBuildError::adapter("firestore", err))?;
            Ok(Arc::new(store))
        }
    }
}

fn build_auth(
    settings: &AppSettings,
    timeout: Duration,
) -> Result<Arc<dyn AuthProvider>, StateBuildError> {
    match settings.auth_backend()? {
        AuthBackend::Fixture => {
            warn!("using in-memory auth provider; accounts are lost on restart");
            Ok(Arc::new(MemoryAuthProvider::new()))
        }
        AuthBackend::IdentityToolkit => {
            let api_key = settings.auth_api_key.clone().ok_or(SettingsError::Missing {
                name: "PINBOARD_AUTH_API_KEY",
            })?;
            let base_url = parse_url(
                "PINBOARD_AUTH_URL",
                settings
                    .auth_url
                    .as_deref()
                    .unwrap_or(DEFAULT_IDENTITY_TOOLKIT_URL),
            )?;
            let provider = IdentityToolkitProvider::new(base_url, api_key, timeout)
                .map_err(|err| StateBuildError::adapter("identity toolkit", err))?;
            Ok(Arc::new(provider))
        }
    }
}

fn build_images(
    settings: &AppSettings,
    timeout: Duration,
) -> Result<Arc<dyn ImageSource>, StateBuildError> {
    let Some(access_key) = settings.image_access_key.clone() else {
        warn!("no image access key configured; serving fixture feed");
        return Ok(Arc::new(FixtureImageSource::default()));
    };
    let source = UnsplashHttpSource::new(settings.image_api_url()?, access_key, timeout)
        .map_err(|err| StateBuildError::adapter("image source", err))?;
    Ok(Arc::new(source))
}
