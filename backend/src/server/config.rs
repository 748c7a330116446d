//! Application settings loaded via OrthoConfig, and the server configuration
//! built from them.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use pagination::{PageSize, PaginationError};
use serde::Deserialize;
use url::Url;

use pinboard::inbound::http::session_config::SessionSettings;
use pinboard::inbound::http::state::HttpStatePorts;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_IMAGE_API_URL: &str = "https://api.unsplash.com/";

/// Where collections and profiles are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process store; data is lost on restart.
    Memory,
    /// Firestore REST API.
    Firestore,
}

/// Who issues and checks session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthBackend {
    /// In-process accounts for development.
    Fixture,
    /// Identity Toolkit REST API.
    IdentityToolkit,
}

/// Errors raised while interpreting [`AppSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("PINBOARD_BIND_ADDR is not a socket address: {0}")]
    BindAddr(String),
    #[error("PINBOARD_STORE_BACKEND must be `memory` or `firestore`, got `{0}`")]
    StoreBackend(String),
    #[error("PINBOARD_AUTH_BACKEND must be `fixture` or `identity-toolkit`, got `{0}`")]
    AuthBackend(String),
    #[error("{name} must be set for the selected backend")]
    Missing { name: &'static str },
    #[error("{name} is not a valid URL: {message}")]
    Url { name: &'static str, message: String },
    #[error("PINBOARD_FEED_PAGE_SIZE is invalid: {0}")]
    PageSize(#[from] PaginationError),
    #[error("PINBOARD_HTTP_TIMEOUT_SECS must be greater than zero")]
    Timeout,
}

/// Configuration values controlling adapters and the listener.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PINBOARD")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// `memory` (default) or `firestore`.
    pub store_backend: Option<String>,
    /// Firestore project id.
    pub firestore_project: Option<String>,
    /// OAuth bearer token for Firestore; the emulator needs none.
    pub firestore_token: Option<String>,
    /// Firestore API root or emulator address.
    pub firestore_url: Option<String>,
    /// `fixture` (default) or `identity-toolkit`.
    pub auth_backend: Option<String>,
    /// Web API key for Identity Toolkit.
    pub auth_api_key: Option<String>,
    /// Identity Toolkit API root or emulator address.
    pub auth_url: Option<String>,
    /// Image provider API root.
    pub image_api_url: Option<String>,
    /// Image provider access key. Without one the fixture feed is served.
    pub image_access_key: Option<String>,
    /// Images per feed page.
    pub feed_page_size: Option<u32>,
    /// Timeout for outbound HTTP requests, in seconds.
    #[ortho_config(default = 30)]
    pub http_timeout_secs: u64,
}

impl AppSettings {
    /// Listener address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|_| SettingsError::BindAddr(raw.to_owned()))
    }

    /// Selected store backend.
    pub fn store_backend(&self) -> Result<StoreBackend, SettingsError> {
        match self.store_backend.as_deref().map(str::trim) {
            None | Some("memory") => Ok(StoreBackend::Memory),
            Some("firestore") => Ok(StoreBackend::Firestore),
            Some(other) => Err(SettingsError::StoreBackend(other.to_owned())),
        }
    }

    /// Selected auth backend.
    pub fn auth_backend(&self) -> Result<AuthBackend, SettingsError> {
        match self.auth_backend.as_deref().map(str::trim) {
            None | Some("fixture") => Ok(AuthBackend::Fixture),
            Some("identity-toolkit") => Ok(AuthBackend::IdentityToolkit),
            Some(other) => Err(SettingsError::AuthBackend(other.to_owned())),
        }
    }

    /// Images per page, defaulting to [`PageSize::default`].
    pub fn feed_page_size(&self) -> Result<PageSize, SettingsError> {
        self.feed_page_size
            .map_or(Ok(PageSize::default()), PageSize::new)
            .map_err(SettingsError::from)
    }

    /// Outbound HTTP timeout; zero is rejected.
    pub fn http_timeout(&self) -> Result<Duration, SettingsError> {
        match self.http_timeout_secs {
            0 => Err(SettingsError::Timeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Image provider root.
    pub fn image_api_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "PINBOARD_IMAGE_API_URL",
            self.image_api_url.as_deref().unwrap_or(DEFAULT_IMAGE_API_URL),
        )
    }
}

/// Parse `raw` as a URL, naming `name` in the error.
pub(crate) fn parse_url(name: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|err| SettingsError::Url {
        name,
        message: err.to_string(),
    })
}

/// Everything [`super::create_server`] needs.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) ports: HttpStatePorts,
}

impl ServerConfig {
    /// Bundle session settings, listener address and adapters.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, ports: HttpStatePorts) -> Self {
        Self {
            session,
            bind_addr,
            ports,
        }
    }
}
