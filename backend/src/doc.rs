//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the JSON API. It registers:
//!
//! - **Paths**: every `/api/v1` handler plus the health checks
//! - **Schemas**: domain records and the wrappers in
//!   [`crate::inbound::http::schemas`] that document error, identity and
//!   profile payloads without deriving utoipa traits on them
//! - **Security**: the `authToken` session cookie
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling. Page
//! view models and the feed socket are not part of the document.

use crate::domain::{
    CascadeReport, Collection, CollectionSummary, FeedImage, FeedStatus, SESSION_COOKIE,
    SavePrompt, SaveState, SaveTarget, SavedImage,
};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::collections::{
    CreateCollectionRequest, DeleteCollectionResponse, SaveImageRequest,
};
use crate::inbound::http::feed::FeedPageResponse;
use crate::inbound::http::saves::SaveRequest;
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, IdentitySchema, UserProfileSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE,
                "Encrypted session cookie issued by POST /api/v1/login or /api/v1/signup.",
            ))),
        );
    }
}

/// OpenAPI document for the JSON API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Pinboard API",
        description = "Image discovery feed, personal collections and session-authenticated profile access.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::profile::get_profile,
        crate::inbound::http::profile::update_profile,
        crate::inbound::http::collections::list_collections,
        crate::inbound::http::collections::create_collection,
        crate::inbound::http::collections::delete_collection,
        crate::inbound::http::collections::list_images,
        crate::inbound::http::collections::save_image,
        crate::inbound::http::collections::delete_image,
        crate::inbound::http::saves::save_targets,
        crate::inbound::http::saves::save,
        crate::inbound::http::feed::feed_page,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        IdentitySchema,
        UserProfileSchema,
        LoginRequest,
        CreateCollectionRequest,
        SaveImageRequest,
        DeleteCollectionResponse,
        SaveRequest,
        SaveTarget,
        SavePrompt,
        SaveState,
        Collection,
        CollectionSummary,
        SavedImage,
        CascadeReport,
        FeedImage,
        FeedStatus,
        FeedPageResponse,
    )),
    tags(
        (name = "auth", description = "Sign-in, sign-up and session lookup"),
        (name = "profile", description = "The signed-in user's profile"),
        (name = "collections", description = "Personal collections and their saved images"),
        (name = "saves", description = "Save-to-collection workflow"),
        (name = "feed", description = "Image discovery feed"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
