//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;
use pagination::PageSize;

use crate::domain::ports::{AuthProvider, DocumentStore, ImageSource};
use crate::domain::{AuthService, CollectionStore, ProfileService};

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub images: Arc<dyn ImageSource>,
    pub clock: Arc<dyn Clock>,
    pub feed_page_size: PageSize,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthService<dyn AuthProvider>,
    pub collections: CollectionStore<dyn DocumentStore>,
    pub profiles: ProfileService<dyn DocumentStore, dyn AuthProvider>,
    pub images: Arc<dyn ImageSource>,
    pub feed_page_size: PageSize,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Wire the domain services over the given ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use pagination::PageSize;
    /// use pinboard::domain::ports::FixtureImageSource;
    /// use pinboard::inbound::http::state::{HttpState, HttpStatePorts};
    /// use pinboard::outbound::memory::{MemoryAuthProvider, MemoryDocumentStore};
    ///
    /// let state = HttpState::new(HttpStatePorts {
    ///     store: Arc::new(MemoryDocumentStore::new()),
    ///     auth: Arc::new(MemoryAuthProvider::new()),
    ///     images: Arc::new(FixtureImageSource::default()),
    ///     clock: Arc::new(DefaultClock),
    ///     feed_page_size: PageSize::default(),
    /// });
    /// assert_eq!(state.feed_page_size, PageSize::default());
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            store,
            auth,
            images,
            clock,
            feed_page_size,
        } = ports;
        Self {
            auth: AuthService::new(Arc::clone(&auth)),
            collections: CollectionStore::new(Arc::clone(&store), clock),
            profiles: ProfileService::new(store, auth),
            images,
            feed_page_size,
        }
    }
}
