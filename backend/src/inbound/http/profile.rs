//! Profile handlers for the signed-in user.
//!
//! ```text
//! GET /api/v1/profile
//! PUT /api/v1/profile {"firstName":"Ada","lastName":"Lovelace","bio":"","website":"","photoURL":""}
//! ```

use actix_web::{get, put, web};

use crate::domain::UserProfile;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserProfileSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Load the profile document, filling the username and avatar from the
/// identity when the document lacks them.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = UserProfileSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["profile"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfile>> {
    let (identity, _) = session.authenticate(&state.auth).await?;
    let profile = state.profiles.load(&identity).await?;
    Ok(web::Json(profile))
}

/// Save the profile and mirror name and avatar to the auth provider.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = UserProfileSchema,
    responses(
        (status = 200, description = "Saved profile", body = UserProfileSchema),
        (status = 400, description = "Invalid website or photo URL", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["profile"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UserProfile>,
) -> ApiResult<web::Json<UserProfile>> {
    let (identity, token) = session.authenticate(&state.auth).await?;
    let saved = state
        .profiles
        .update(&identity, &token, payload.into_inner())
        .await?;
    Ok(web::Json(saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use crate::inbound::http::auth;
    use crate::inbound::http::test_utils::{memory_state, sign_up, test_session_middleware};

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
                    .service(auth::me)
                    .service(get_profile)
                    .service(update_profile),
            )
    }

    #[actix_web::test]
    async fn profile_requires_session() {
        let app = test::init_service(test_app()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/profile").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn update_round_trips_and_mirrors_display_name() {
        let app = test::init_service(test_app()).await;
        let cookie = sign_up(&app, "ada@example.com").await;

        let fresh: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/profile")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(fresh["username"], "ada");
        assert_eq!(fresh["firstName"], "");

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/profile")
                .cookie(cookie.clone())
                .set_json(json!({
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "bio": "Analyst",
                    "website": " https://example.com ",
                    "photoURL": ""
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let saved: Value = test::read_body_json(res).await;
        assert_eq!(saved["website"], "https://example.com");

        let loaded: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/profile")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(loaded["lastName"], "Lovelace");

        let identity: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/v1/me").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(identity["displayName"], "Ada Lovelace");
    }

    #[actix_web::test]
    async fn invalid_website_is_rejected() {
        let app = test::init_service(test_app()).await;
        let cookie = sign_up(&app, "ada@example.com").await;

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/profile")
                .cookie(cookie)
                .set_json(json!({"website": "ftp://example.com"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
