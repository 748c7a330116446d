//! Shared helpers for HTTP integration tests.
//!
//! Integration tests under `backend/tests/` compile as separate crates, so
//! the app wiring is rebuilt here over the in-memory adapters.

#![allow(dead_code)]

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use mockable::DefaultClock;
use pagination::PageSize;
use serde_json::json;

use pinboard::Trace;
use pinboard::domain::SESSION_COOKIE;
use pinboard::domain::ports::FixtureImageSource;
use pinboard::inbound::http::state::{HttpState, HttpStatePorts};
use pinboard::inbound::http::{api_routes, page_routes};
use pinboard::middleware::RouteGuard;
use pinboard::outbound::memory::{MemoryAuthProvider, MemoryDocumentStore};

/// Password accepted by the in-memory auth provider.
pub const PASSWORD: &str = "analytical";

/// State over the in-memory adapters and the fixture feed.
pub fn memory_state() -> HttpState {
    HttpState::new(HttpStatePorts {
        store: Arc::new(MemoryDocumentStore::new()),
        auth: Arc::new(MemoryAuthProvider::new()),
        images: Arc::new(FixtureImageSource::default()),
        clock: Arc::new(DefaultClock),
        feed_page_size: PageSize::default(),
    })
}

/// Session middleware with a throwaway key and no `Secure` flag.
pub fn session() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Initialise the full app: API, pages, guard and tracing.
pub async fn init_app(
    state: HttpState,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl actix_web::body::MessageBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(session())
            .wrap(RouteGuard)
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(api_routes))
            .configure(page_routes),
    )
    .await
}

/// The session cookie set on `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
}

/// Register `email` and return the session cookie.
pub async fn sign_up<S, B>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(json!({"email": email, "password": PASSWORD}))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "sign up failed: {}", res.status());
    session_cookie(&res).expect("session cookie")
}
