//! Collection and saved-image handlers.
//!
//! ```text
//! GET    /api/v1/collections
//! POST   /api/v1/collections {"name":"Travel"}
//! DELETE /api/v1/collections/{id}?confirm=true
//! GET    /api/v1/collections/{id}/images
//! POST   /api/v1/collections/{id}/images {"url":"https://img/1.jpg"}
//! DELETE /api/v1/collections/{id}/images/{imageId}
//! ```
//!
//! Every route requires a signed-in user. Deletes go through the collection
//! detail view so they follow the same confirmation and two-phase rules as
//! the page.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::FixedConfirmation;
use crate::domain::{
    CascadeReport, Collection, CollectionDeletion, CollectionDetailView, CollectionId,
    CollectionSummary, Error, SavedImage, SavedImageId, SessionState,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for `POST /collections`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateCollectionRequest {
    #[schema(example = "Travel")]
    pub name: String,
}

/// Body for `POST /collections/{id}/images`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SaveImageRequest {
    #[schema(example = "https://img/1.jpg")]
    pub url: String,
}

/// Query for `DELETE /collections/{id}`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteCollectionQuery {
    /// Answer to "Delete collection and all of its images?". Anything but
    /// `true` cancels.
    #[serde(default)]
    pub confirm: bool,
}

/// Outcome of `DELETE /collections/{id}`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum DeleteCollectionResponse {
    /// The confirmation was declined; nothing changed.
    Cancelled,
    /// The collection is gone; `report` counts the cascaded image deletes.
    Deleted {
        report: CascadeReport,
        #[serde(rename = "navigateTo")]
        #[schema(example = "/personal")]
        navigate_to: String,
    },
}

fn parse_collection_id(raw: &str) -> ApiResult<CollectionId> {
    CollectionId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "id" }))
    })
}

async fn signed_in(state: &HttpState, session: &SessionContext) -> ApiResult<SessionState> {
    let resolved = session.resolve(&state.auth).await?;
    resolved.require_user()?;
    Ok(resolved)
}

async fn require_collection(
    state: &HttpState,
    session: &SessionState,
    id: &CollectionId,
) -> ApiResult<()> {
    if state.collections.collection_exists(session.user_id(), id).await? {
        Ok(())
    } else {
        Err(Error::not_found(format!("collection \"{id}\" not found")))
    }
}

/// List the user's collections with a preview image each.
#[utoipa::path(
    get,
    path = "/api/v1/collections",
    responses(
        (status = 200, description = "Collections", body = [CollectionSummary]),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "listCollections"
)]
#[get("/collections")]
pub async fn list_collections(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CollectionSummary>>> {
    let resolved = signed_in(&state, &session).await?;
    let collections = state.collections.list_collections(resolved.user_id()).await?;
    Ok(web::Json(collections))
}

/// Create an empty collection named by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = Collection),
        (status = 400, description = "Invalid name", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 409, description = "Collection already exists", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "createCollection"
)]
#[post("/collections")]
pub async fn create_collection(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCollectionRequest>,
) -> ApiResult<HttpResponse> {
    let resolved = signed_in(&state, &session).await?;
    let created = state
        .collections
        .create_collection(resolved.user_id(), &payload.name)
        .await?
        .ok_or_else(|| Error::unauthorized("sign in required"))?;
    Ok(HttpResponse::Created().json(created))
}

/// Delete a collection and, best effort, every image in it.
#[utoipa::path(
    delete,
    path = "/api/v1/collections/{id}",
    params(
        ("id" = String, Path, description = "Collection id (its name)"),
        DeleteCollectionQuery
    ),
    responses(
        (status = 200, description = "Deleted or cancelled", body = DeleteCollectionResponse),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "deleteCollection"
)]
#[delete("/collections/{id}")]
pub async fn delete_collection(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<DeleteCollectionQuery>,
) -> ApiResult<web::Json<DeleteCollectionResponse>> {
    let resolved = signed_in(&state, &session).await?;
    let id = parse_collection_id(&path)?;
    let mut view = CollectionDetailView::open(state.collections.clone(), &resolved, id);
    let outcome = view
        .delete_collection(&FixedConfirmation(query.confirm))
        .await?;
    match outcome {
        CollectionDeletion::Cancelled => Ok(web::Json(DeleteCollectionResponse::Cancelled)),
        CollectionDeletion::Deleted {
            report,
            navigate_to,
        } => Ok(web::Json(DeleteCollectionResponse::Deleted {
            report,
            navigate_to: navigate_to.to_owned(),
        })),
        CollectionDeletion::Declined => Err(Error::unauthorized("sign in required")),
        CollectionDeletion::Closed => Err(Error::internal("collection view closed mid-delete")),
    }
}

/// List the images saved in a collection.
#[utoipa::path(
    get,
    path = "/api/v1/collections/{id}/images",
    params(("id" = String, Path, description = "Collection id")),
    responses(
        (status = 200, description = "Saved images", body = [SavedImage]),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "No such collection", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "listImages"
)]
#[get("/collections/{id}/images")]
pub async fn list_images(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<SavedImage>>> {
    let resolved = signed_in(&state, &session).await?;
    let id = parse_collection_id(&path)?;
    require_collection(&state, &resolved, &id).await?;
    let images = state.collections.list_images(resolved.user_id(), &id).await?;
    Ok(web::Json(images))
}

/// Save an image URL into an existing collection.
#[utoipa::path(
    post,
    path = "/api/v1/collections/{id}/images",
    params(("id" = String, Path, description = "Collection id")),
    request_body = SaveImageRequest,
    responses(
        (status = 201, description = "Image saved", body = SavedImage),
        (status = 400, description = "Invalid URL", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "No such collection", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "saveImage"
)]
#[post("/collections/{id}/images")]
pub async fn save_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SaveImageRequest>,
) -> ApiResult<HttpResponse> {
    let resolved = signed_in(&state, &session).await?;
    let id = parse_collection_id(&path)?;
    require_collection(&state, &resolved, &id).await?;
    let saved = state
        .collections
        .save_image(resolved.user_id(), &id, &payload.url)
        .await?
        .ok_or_else(|| Error::unauthorized("sign in required"))?;
    Ok(HttpResponse::Created().json(saved))
}

/// Remove one saved image. Unknown ids succeed without effect.
#[utoipa::path(
    delete,
    path = "/api/v1/collections/{id}/images/{image_id}",
    params(
        ("id" = String, Path, description = "Collection id"),
        ("image_id" = String, Path, description = "Saved image id")
    ),
    responses(
        (status = 204, description = "Image removed"),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["collections"],
    operation_id = "deleteImage"
)]
#[delete("/collections/{id}/images/{image_id}")]
pub async fn delete_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let resolved = signed_in(&state, &session).await?;
    let (raw_collection, raw_image) = path.into_inner();
    let id = parse_collection_id(&raw_collection)?;
    let image = SavedImageId::new(raw_image).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "imageId" }))
    })?;
    let mut view = CollectionDetailView::open(state.collections.clone(), &resolved, id);
    view.delete_image(&image).await?;
    Ok(HttpResponse::NoContent().finish())
}
