//! Navigation surface: one JSON view model per page.
//!
//! ```text
//! GET /                 latest feed, first page
//! GET /search?q=cats    searched feed, first page
//! GET /login, /signup   auth forms
//! GET /personal         profile and collections (guarded)
//! GET /edit-profile     profile form (guarded)
//! GET /collection/{id}  collection detail (public)
//! ```
//!
//! [`crate::middleware::RouteGuard`] redirects guarded pages when no session
//! cookie is present. A cookie the auth provider no longer accepts gets the
//! same `302 Found` here.

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use pagination::PageNumber;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    CollectionDetailView, CollectionId, CollectionSummary, DetailStatus, Error, FeedQuery,
    FeedStatus, Identity, LOGIN_ROUTE, SavedImage, SessionState, UserProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::feed::{FeedPageResponse, load_page};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// `/` view model.
#[derive(Debug, Serialize)]
pub struct HomePage {
    pub user: Option<Identity>,
    pub feed: FeedPageResponse,
}

/// `/search` view model.
#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub user: Option<Identity>,
    pub query: Option<String>,
    pub feed: FeedPageResponse,
}

/// Query for `/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// `/login` and `/signup` view model.
#[derive(Debug, Serialize)]
pub struct AuthPage {
    /// Which form to render: `login` or `signup`.
    pub form: &'static str,
    pub user: Option<Identity>,
}

/// `/personal` view model.
#[derive(Debug, Serialize)]
pub struct PersonalPage {
    pub user: Identity,
    pub profile: UserProfile,
    pub collections: Vec<CollectionSummary>,
}

/// `/edit-profile` view model.
#[derive(Debug, Serialize)]
pub struct EditProfilePage {
    pub user: Identity,
    pub profile: UserProfile,
}

/// `/collection/{id}` view model.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPage {
    pub collection: CollectionId,
    pub status: DetailStatus,
    pub images: Vec<SavedImage>,
    /// Whether the visitor may delete images or the collection.
    pub can_edit: bool,
}

fn login_redirect() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, LOGIN_ROUTE))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// First feed page, or an empty retryable page when the provider fails.
async fn first_feed_page(state: &HttpState, query: Option<FeedQuery>) -> FeedPageResponse {
    match load_page(state, query, PageNumber::FIRST).await {
        Ok(page) => page,
        Err(err) => {
            warn!(error = %err, "feed fetch failed; rendering empty feed");
            FeedPageResponse {
                page: PageNumber::FIRST.get(),
                images: Vec::new(),
                next_page: Some(PageNumber::FIRST.get()),
                status: FeedStatus::Idle,
            }
        }
    }
}

/// Resolve the session for a guarded page, or `None` when the visitor must
/// be sent to the login page.
async fn guarded_user(state: &HttpState, session: &SessionContext) -> ApiResult<Option<Identity>> {
    let resolved = session.resolve(&state.auth).await?;
    Ok(resolved.user)
}

#[get("/")]
pub async fn home(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<HttpResponse> {
    let resolved = session.resolve(&state.auth).await?;
    let feed = first_feed_page(&state, None).await;
    Ok(HttpResponse::Ok().json(HomePage {
        user: resolved.user,
        feed,
    }))
}

#[get("/search")]
pub async fn search(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<SearchParams>,
) -> ApiResult<HttpResponse> {
    let resolved = session.resolve(&state.auth).await?;
    let query = FeedQuery::from_optional(params.q.as_deref());
    let feed = first_feed_page(&state, query.clone()).await;
    Ok(HttpResponse::Ok().json(SearchPage {
        user: resolved.user,
        query: query.map(|q| q.to_string()),
        feed,
    }))
}

#[get("/login")]
pub async fn login_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let resolved = session.resolve(&state.auth).await?;
    Ok(HttpResponse::Ok().json(AuthPage {
        form: "login",
        user: resolved.user,
    }))
}

#[get("/signup")]
pub async fn signup_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let resolved = session.resolve(&state.auth).await?;
    Ok(HttpResponse::Ok().json(AuthPage {
        form: "signup",
        user: resolved.user,
    }))
}

#[get("/personal")]
pub async fn personal(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let Some(user) = guarded_user(&state, &session).await? else {
        return Ok(login_redirect());
    };
    let profile = state.profiles.load(&user).await?;
    let collections = state.collections.list_collections(Some(&user.uid)).await?;
    Ok(HttpResponse::Ok().json(PersonalPage {
        user,
        profile,
        collections,
    }))
}

#[get("/edit-profile")]
pub async fn edit_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let Some(user) = guarded_user(&state, &session).await? else {
        return Ok(login_redirect());
    };
    let profile = state.profiles.load(&user).await?;
    Ok(HttpResponse::Ok().json(EditProfilePage { user, profile }))
}

/// Collection detail. Anonymous visitors get an empty, read-only view.
#[get("/collection/{id}")]
pub async fn collection(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = CollectionId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let resolved: SessionState = session.resolve(&state.auth).await?;
    let mut view = CollectionDetailView::open(state.collections.clone(), &resolved, id);
    let status = view.load().await?;
    Ok(HttpResponse::Ok().json(CollectionPage {
        collection: view.collection().clone(),
        status,
        images: view.images().to_vec(),
        can_edit: view.has_owner(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::{memory_state, sign_up, test_session_middleware};
    use crate::inbound::http::{auth, collections};

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .app_data(web::Data::new(memory_state()))
            .service(
                web::scope("/api/v1")
                    .service(auth::signup)
                    .service(auth::logout)
                    .service(collections::create_collection)
                    .service(collections::save_image),
            )
            .service(home)
            .service(search)
            .service(login_page)
            .service(signup_page)
            .service(personal)
            .service(edit_profile)
            .service(collection)
    }

    #[actix_web::test]
    async fn home_shows_latest_feed_to_anonymous_visitors() {
        let app = test::init_service(test_app()).await;
        let page: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(page["user"], Value::Null);
        assert_eq!(page["feed"]["images"][0]["id"], "latest-0");
    }

    #[actix_web::test]
    async fn search_echoes_trimmed_query() {
        let app = test::init_service(test_app()).await;
        let page: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/search?q=%20fox%20").to_request(),
        )
        .await;
        assert_eq!(page["query"], "fox");
        assert_eq!(page["feed"]["images"][0]["id"], "fox-0");
    }

    #[actix_web::test]
    async fn personal_redirects_when_session_is_stale() {
        let app = test::init_service(test_app()).await;
        let cookie = sign_up(&app, "ada@example.com").await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/logout")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/personal").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/login")
        );
    }

    #[actix_web::test]
    async fn personal_lists_profile_and_collections() {
        let app = test::init_service(test_app()).await;
        let cookie = sign_up(&app, "ada@example.com").await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/collections")
                .cookie(cookie.clone())
                .set_json(json!({"name": "Travel"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let page: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/personal").cookie(cookie.clone()).to_request(),
        )
        .await;
        assert_eq!(page["profile"]["username"], "ada");
        assert_eq!(page["collections"][0]["id"], "Travel");

        let edit: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/edit-profile").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(edit["user"]["email"], "ada@example.com");
    }

    #[actix_web::test]
    async fn collection_page_is_read_only_for_anonymous_visitors() {
        let app = test::init_service(test_app()).await;
        let page: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/collection/Travel").to_request(),
        )
        .await;
        assert_eq!(page["canEdit"], false);
        assert_eq!(page["status"], "empty");
    }

    #[actix_web::test]
    async fn collection_page_lists_owner_images() {
        let app = test::init_service(test_app()).await;
        let cookie = sign_up(&app, "ada@example.com").await;
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/collections")
                .cookie(cookie.clone())
                .set_json(json!({"name": "Travel"}))
                .to_request(),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/collections/Travel/images")
                .cookie(cookie.clone())
                .set_json(json!({"url": "https://img/1.jpg"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let page: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/collection/Travel").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(page["canEdit"], true);
        assert_eq!(page["status"], "populated");
        assert_eq!(page["images"][0]["url"], "https://img/1.jpg");
    }

    #[actix_web::test]
    async fn login_page_reports_signed_in_user() {
        let app = test::init_service(test_app()).await;
        let cookie = sign_up(&app, "ada@example.com").await;
        let page: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/login").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(page["form"], "login");
        assert_eq!(page["user"]["email"], "ada@example.com");
    }
}
