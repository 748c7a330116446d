//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use mockable::DefaultClock;
use pagination::PageSize;

use crate::domain::SESSION_COOKIE;
use crate::domain::ports::FixtureImageSource;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{MemoryAuthProvider, MemoryDocumentStore};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Uses the production cookie name and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// State over in-memory adapters and the fixture image source.
pub fn memory_state() -> HttpState {
    HttpState::new(HttpStatePorts {
        store: Arc::new(MemoryDocumentStore::new()),
        auth: Arc::new(MemoryAuthProvider::new()),
        images: Arc::new(FixtureImageSource::default()),
        clock: Arc::new(DefaultClock),
        feed_page_size: PageSize::default(),
    })
}

/// The session cookie set on `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
}

/// Register `email` through `POST /api/v1/signup` and return the session
/// cookie.
pub async fn sign_up(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    email: &str,
) -> Cookie<'static> {
    let res = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(serde_json::json!({"email": email, "password": "analytical"}))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "sign up failed: {}", res.status());
    session_cookie(&res).expect("session cookie")
}
