//! HTTP inbound adapter exposing the JSON API and the page view models.

pub mod auth;
pub mod collections;
pub mod error;
pub mod feed;
pub mod health;
pub mod pages;
pub mod profile;
pub mod saves;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

use actix_web::web;

pub use error::ApiResult;

/// Register the `/api/v1` handlers on `cfg`.
///
/// Callers mount this inside `web::scope("/api/v1")`.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::signup)
        .service(auth::logout)
        .service(auth::me)
        .service(profile::get_profile)
        .service(profile::update_profile)
        .service(collections::list_collections)
        .service(collections::create_collection)
        .service(collections::delete_collection)
        .service(collections::list_images)
        .service(collections::save_image)
        .service(collections::delete_image)
        .service(saves::save_targets)
        .service(saves::save)
        .service(feed::feed_page);
}

/// Register the navigation pages on `cfg`.
pub fn page_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::home)
        .service(pages::search)
        .service(pages::login_page)
        .service(pages::signup_page)
        .service(pages::personal)
        .service(pages::edit_profile)
        .service(pages::collection);
}
