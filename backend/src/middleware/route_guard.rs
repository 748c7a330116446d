//! Navigation guard redirecting anonymous visitors to the login page.
//!
//! The decision itself lives in [`crate::domain::route_decision`]; this
//! middleware only reads the session cookie and issues the redirect.

use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{LOGIN_ROUTE, RouteDecision, SESSION_COOKIE, route_decision};

/// Middleware answering guarded paths with `302 Found` to the login page
/// when no session cookie is present.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use pinboard::middleware::RouteGuard;
///
/// let app = App::new().wrap(RouteGuard);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RouteGuard;

impl<S, B> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RouteGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardMiddleware { service }))
    }
}

/// Service wrapper produced by [`RouteGuard`].
pub struct RouteGuardMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RouteGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let has_token = req.cookie(SESSION_COOKIE).is_some();
        if route_decision(req.path(), has_token) == RouteDecision::RedirectToLogin {
            debug!(path = %req.path(), "no session cookie; redirecting to login");
            let response = HttpResponse::Found()
                .insert_header((header::LOCATION, LOGIN_ROUTE))
                .insert_header((header::CACHE_CONTROL, "no-store"))
                .finish()
                .map_into_right_body();
            let (request, _) = req.into_parts();
            return Box::pin(async move { Ok(ServiceResponse::new(request, response)) });
        }
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use rstest::rstest;

    async fn status_for(path: &str, with_cookie: bool) -> (StatusCode, Option<String>) {
        let app = test::init_service(
            App::new()
                .wrap(RouteGuard)
                .default_service(web::to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let mut req = test::TestRequest::get().uri(path);
        if with_cookie {
            req = req.cookie(Cookie::new(SESSION_COOKIE, "opaque"));
        }
        let res = test::call_service(&app, req.to_request()).await;
        let location = res
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        (res.status(), location)
    }

    #[actix_web::test]
    async fn personal_redirects_without_cookie() {
        let (status, location) = status_for("/personal", false).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location.as_deref(), Some(LOGIN_ROUTE));
    }

    #[rstest]
    #[case("/login")]
    #[case("/collection/abc")]
    #[case("/")]
    #[case("/api/v1/collections")]
    #[actix_rt::test]
    async fn public_paths_pass_through(#[case] path: &str) {
        let (status, _) = status_for(path, false).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn cookie_presence_is_enough() {
        let (status, _) = status_for("/edit-profile", true).await;
        assert_eq!(status, StatusCode::OK);
    }
}
