//! One-shot feed page for clients that paginate themselves.
//!
//! ```text
//! GET /api/v1/feed?q=red%20fox&page=2
//! ```
//!
//! Infinite scrolling with de-duplication across pages lives on the
//! `/ws/feed` socket; this endpoint serves a single page.

use actix_web::{get, web};
use pagination::{PageNumber, PaginationError};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, FeedImage, FeedQuery, FeedStatus, FeedUpdate, ImageFeed};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Query for `GET /feed`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedParams {
    /// Search term; blank or missing shows the latest images.
    pub q: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
}

/// One page of the feed.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedPageResponse {
    #[schema(example = 1)]
    pub page: u32,
    pub images: Vec<FeedImage>,
    /// Page to request next, absent once the feed is exhausted.
    pub next_page: Option<u32>,
    pub status: FeedStatus,
}

fn parse_page(raw: Option<u32>) -> ApiResult<PageNumber> {
    raw.map_or(Ok(PageNumber::FIRST), |page| {
        PageNumber::new(page).map_err(|err: PaginationError| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "page" }))
        })
    })
}

/// Fetch one page of the latest or searched images.
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    params(FeedParams),
    responses(
        (status = 200, description = "Feed page", body = FeedPageResponse),
        (status = 400, description = "Invalid page", body = ErrorSchema),
        (status = 503, description = "Image provider unavailable", body = ErrorSchema)
    ),
    tags = ["feed"],
    operation_id = "feedPage",
    security([])
)]
#[get("/feed")]
pub async fn feed_page(
    state: web::Data<HttpState>,
    params: web::Query<FeedParams>,
) -> ApiResult<web::Json<FeedPageResponse>> {
    let FeedParams { q, page } = params.into_inner();
    let page = parse_page(page)?;
    let response = load_page(&state, FeedQuery::from_optional(q.as_deref()), page).await?;
    Ok(web::Json(response))
}

/// Fetch `page` of the feed for `query` with a fresh [`ImageFeed`].
pub(crate) async fn load_page(
    state: &HttpState,
    query: Option<FeedQuery>,
    page: PageNumber,
) -> ApiResult<FeedPageResponse> {
    let mut feed = ImageFeed::new(query, state.feed_page_size).starting_at(page);

    match feed.advance(state.images.as_ref()).await {
        Some(FeedUpdate::Page { page, .. }) => Ok(FeedPageResponse {
            page: page.get(),
            images: feed.images().to_vec(),
            next_page: (feed.status() == FeedStatus::Idle).then(|| feed.next_page().get()),
            status: feed.status(),
        }),
        Some(FeedUpdate::Exhausted) => Ok(FeedPageResponse {
            page: page.get(),
            images: Vec::new(),
            next_page: None,
            status: FeedStatus::Exhausted,
        }),
        Some(FeedUpdate::FetchFailed { message, .. }) => Err(Error::service_unavailable(message)),
        Some(FeedUpdate::Stale) | None => Err(Error::internal("fresh feed refused to fetch")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    use crate::domain::ports::{ImageSourceError, MockImageSource};
    use crate::inbound::http::test_utils::memory_state;

    async fn get(state: HttpState, uri: &str) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(feed_page)),
        )
        .await;
        test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await
    }

    #[actix_web::test]
    async fn first_page_of_latest_images() {
        let res = get(memory_state(), "/api/v1/feed").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["page"], 1);
        assert_eq!(body["nextPage"], 2);
        assert_eq!(body["images"].as_array().map(Vec::len), Some(10));
        assert_eq!(body["images"][0]["id"], "latest-0");
    }

    #[actix_web::test]
    async fn query_selects_search_results() {
        let res = get(memory_state(), "/api/v1/feed?q=fox&page=2").await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["page"], 2);
        assert_eq!(body["images"][0]["id"], "fox-10");
    }

    #[actix_web::test]
    async fn past_the_end_is_exhausted() {
        let res = get(memory_state(), "/api/v1/feed?page=4").await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "exhausted");
        assert_eq!(body["nextPage"], Value::Null);
        assert_eq!(body["images"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn zero_page_is_rejected() {
        let res = get(memory_state(), "/api/v1/feed?page=0").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn repeated_id_keeps_first_position_and_last_value() {
        let mut source = MockImageSource::new();
        source.expect_fetch_page().returning(|_| {
            Ok(vec![
                FeedImage::new("a", "https://s/a", "https://f/a", Some("first".into())),
                FeedImage::new("b", "https://s/b", "https://f/b", None),
                FeedImage::new("a", "https://s/a2", "https://f/a2", Some("second".into())),
            ])
        });
        let mut state = memory_state();
        state.images = Arc::new(source);

        let res = get(state, "/api/v1/feed").await;
        let body: Value = test::read_body_json(res).await;
        let images = body["images"].as_array().expect("images");
        assert_eq!(images.len(), 2);
        assert_eq!(images[0]["id"], "a");
        assert_eq!(images[0]["alt"], "second");
        assert_eq!(images[0]["fullUrl"], "https://f/a2");
        assert_eq!(images[1]["id"], "b");
    }

    #[actix_web::test]
    async fn provider_failure_is_service_unavailable() {
        let mut source = MockImageSource::new();
        source
            .expect_fetch_page()
            .returning(|_| Err(ImageSourceError::rate_limited("slow down")));
        let mut state = memory_state();
        state.images = Arc::new(source);

        let res = get(state, "/api/v1/feed").await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
