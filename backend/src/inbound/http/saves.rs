//! "Save to collection" handlers driving [`SaveWorkflow`].
//!
//! ```text
//! GET  /api/v1/saves/targets?imageUrl=https://img/1.jpg
//! POST /api/v1/saves {"imageUrl":"https://img/1.jpg","target":{"new":"Travel"}}
//! ```
//!
//! Both return the workflow state. Anonymous callers get the
//! `unauthenticated` state pointing at the login page rather than an error,
//! since that is an expected outcome of the flow.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{SaveState, SaveTarget, SaveWorkflow};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query for `GET /saves/targets`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SaveTargetsQuery {
    /// Image the user is about to save.
    pub image_url: String,
}

/// Body for `POST /saves`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[schema(example = "https://img/1.jpg")]
    pub image_url: String,
    pub target: SaveTarget,
}

/// Open the save flow: check the session and list candidate collections.
#[utoipa::path(
    get,
    path = "/api/v1/saves/targets",
    params(SaveTargetsQuery),
    responses(
        (status = 200, description = "Workflow state after opening", body = SaveState),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["saves"],
    operation_id = "openSave"
)]
#[get("/saves/targets")]
pub async fn save_targets(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SaveTargetsQuery>,
) -> ApiResult<web::Json<SaveState>> {
    let resolved = session.resolve(&state.auth).await?;
    let mut workflow = SaveWorkflow::new(state.collections.clone(), query.into_inner().image_url);
    workflow.open(&resolved).await;
    Ok(web::Json(workflow.into_state()))
}

/// Save the image into an existing or a new collection.
///
/// Responds `201 Created` on success. A failed save comes back as the
/// `choosingCollection` state carrying the error, with the refreshed list.
#[utoipa::path(
    post,
    path = "/api/v1/saves",
    request_body = SaveRequest,
    responses(
        (status = 201, description = "Image saved", body = SaveState),
        (status = 200, description = "Save not completed; see state", body = SaveState),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["saves"],
    operation_id = "saveImageToCollection"
)]
#[post("/saves")]
pub async fn save(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SaveRequest>,
) -> ApiResult<HttpResponse> {
    let SaveRequest { image_url, target } = payload.into_inner();
    let resolved = session.resolve(&state.auth).await?;
    let mut workflow = SaveWorkflow::new(state.collections.clone(), image_url);
    workflow.open(&resolved).await;
    workflow.save(target).await;
    let outcome = workflow.into_state();
    let mut response = if matches!(outcome, SaveState::Success { .. }) {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(outcome))
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
                    .service(collections::list_images)
                    .service(save_targets)
                    .service(save),
            )
    }

    #[actix_web::test]
    async fn anonymous_save_points_at_login() {
        let app = test::init_service(test_app()).await;
        let state: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/saves/targets?imageUrl=https%3A%2F%2Fimg%2F1.jpg")
                .to_request(),
        )
        .await;
        assert_eq!(state, json!({"state": "unauthenticated", "redirectTo": "/login"}));
    }

    #[actix_web::test]
    async fn saving_into_new_collection_creates_it() {
        let app = test::init_service(test_app()).await;
        let cookie = sign_up(&app, "ada@example.com").await;

        let targets: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/saves/targets?imageUrl=https%3A%2F%2Fimg%2F1.jpg")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(targets["state"], "choosingCollection");
        assert_eq!(targets["collections"], json!([]));

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/saves")
                .cookie(cookie.clone())
                .set_json(json!({"imageUrl": "https://img/1.jpg", "target": {"new": "Travel"}}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let saved: Value = test::read_body_json(res).await;
        assert_eq!(saved["state"], "success");
        assert_eq!(saved["collection"], "Travel");
        assert_eq!(saved["image"]["url"], "https://img/1.jpg");

        let images: Vec<Value> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/collections/Travel/images")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(images.len(), 1);
    }

    #[actix_web::test]
    async fn blank_new_name_prompts_for_a_name() {
        let app = test::init_service(test_app()).await;
        let cookie = sign_up(&app, "ada@example.com").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/saves")
                .cookie(cookie)
                .set_json(json!({"imageUrl": "https://img/1.jpg", "target": {"new": "  "}}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let state: Value = test::read_body_json(res).await;
        assert_eq!(state["state"], "choosingCollection");
        assert_eq!(state["prompt"], "nameCollection");
    }

    #[actix_web::test]
    async fn unknown_existing_collection_is_not_created_implicitly() {
        let app = test::init_service(test_app()).await;
        let cookie = sign_up(&app, "ada@example.com").await;

        let state: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/saves")
                .cookie(cookie.clone())
                .set_json(json!({"imageUrl": "https://img/1.jpg", "target": {"existing": "Ghost"}}))
                .to_request(),
        )
        .await;
        assert_eq!(state["state"], "choosingCollection");
        assert_eq!(state["error"]["code"], "not_found");
        assert_eq!(state["collections"], json!([]));

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/collections/Ghost/images")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn invalid_url_is_reported_inside_state() {
        let app = test::init_service(test_app()).await;
        let cookie = sign_up(&app, "ada@example.com").await;

        let state: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/saves")
                .cookie(cookie)
                .set_json(json!({"imageUrl": "not a url", "target": {"new": "Travel"}}))
                .to_request(),
        )
        .await;
        assert_eq!(state["state"], "choosingCollection");
        assert_eq!(state["error"]["code"], "invalid_request");
        // The new collection is kept even though the save failed.
        assert_eq!(state["collections"][0]["id"], "Travel");
    }
}
