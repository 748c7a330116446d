//! Domain entities, use-case services and ports.
//!
//! Purpose: keep collection, feed and session rules independent of HTTP and
//! of the concrete document store or auth provider. Inbound adapters call
//! the services here; outbound adapters implement [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - CollectionStore: per-user collection CRUD with cascade delete.
//! - SaveWorkflow: the save-to-collection state machine.
//! - ImageFeed: paginated, de-duplicated discovery feed.
//! - CollectionDetailView: detail page state with two-phase deletes.
//! - AuthSessionObserver / SessionState: signed-in identity tracking.
//! - route_decision: navigation gatekeeping by token presence.

pub mod auth;
pub mod auth_service;
pub mod collection;
pub mod collection_detail;
pub mod collection_store;
pub mod document;
pub mod error;
pub mod feed;
pub mod image_feed;
pub mod ports;
pub mod profile_service;
pub mod route_guard;
pub mod save_workflow;
pub mod session;
pub mod trace_id;
pub mod user;

pub use self::auth::{AuthenticatedSession, LoginCredentials, LoginValidationError, SessionToken};
pub use self::auth_service::AuthService;
pub use self::collection::{
    Collection, CollectionId, CollectionSummary, CollectionValidationError, ImageUrl, SavedImage,
    SavedImageId,
};
pub use self::collection_detail::{
    CollectionDeletion, CollectionDetailView, DetailStatus, PERSONAL_ROUTE, ViewCloser,
};
pub use self::collection_store::{CascadeReport, CollectionStore};
pub use self::document::{CollectionPath, Document, DocumentPath, FieldValue, Fields, PathError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::feed::{DEFAULT_ALT_TEXT, FeedImage, FeedQuery, FeedRequest};
pub use self::image_feed::{FeedStatus, FeedUpdate, ImageFeed, PendingFetch};
pub use self::profile_service::ProfileService;
pub use self::route_guard::{
    RouteDecision, SESSION_COOKIE, SESSION_TTL_SECS, is_guarded, route_decision,
};
pub use self::save_workflow::{LOGIN_ROUTE, SavePrompt, SaveState, SaveTarget, SaveWorkflow};
pub use self::session::{AuthSessionObserver, SessionState};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Identity, UserId, UserProfile, UserValidationError, username_from_email};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use pinboard::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
