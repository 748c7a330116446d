//! Navigation gatekeeping and tracing across the assembled app.

mod support;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use rstest::rstest;

use pinboard::domain::{LOGIN_ROUTE, TRACE_ID_HEADER};
use support::{init_app, memory_state, sign_up};

#[rstest]
#[case("/personal")]
#[case("/edit-profile")]
#[case("/personal/")]
#[actix_rt::test]
async fn guarded_pages_redirect_anonymous_visitors(#[case] path: &str) {
    let app = init_app(memory_state()).await;
    let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    let location = res
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok());
    assert_eq!(location, Some(LOGIN_ROUTE));
}

#[rstest]
#[case("/")]
#[case("/login")]
#[case("/signup")]
#[case("/search?q=owl")]
#[case("/collection/abc")]
#[actix_rt::test]
async fn public_pages_render_for_anonymous_visitors(#[case] path: &str) {
    let app = init_app(memory_state()).await;
    let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn api_answers_unauthorised_instead_of_redirecting() {
    let app = init_app(memory_state()).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/me").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get(header::LOCATION).is_none());
    assert!(res.headers().get(TRACE_ID_HEADER).is_some());
}

#[actix_web::test]
async fn signed_in_visitors_reach_their_personal_page() {
    let app = init_app(memory_state()).await;
    let cookie = sign_up(&app, "ada@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/personal")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn forged_cookie_passes_guard_but_page_redirects() {
    let app = init_app(memory_state()).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/personal")
            .cookie(actix_web::cookie::Cookie::new(
                pinboard::domain::SESSION_COOKIE,
                "forged",
            ))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
}
