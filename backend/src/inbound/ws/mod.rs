//! WebSocket inbound adapter hosting the infinite-scroll image feed.
//!
//! Responsibilities:
//! - validate upgrade requests (same-origin or local development origins)
//! - spawn one feed session per connection
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{error, warn};
use url::Url;

mod feed_session;

pub mod messages;
pub mod state;

/// Handle WebSocket upgrade for the `/ws/feed` endpoint.
#[get("/ws/feed")]
pub async fn feed_socket(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    let host = req.connection_info().host().to_owned();
    validate_origin(origin_header, &host)?;

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorInternalServerError("WebSocket upgrade failed")
    })?;
    actix_web::rt::spawn(feed_session::handle_feed_session(
        state.images.clone(),
        state.page_size,
        session,
        messages,
    ));
    Ok(response)
}

fn validate_origin(origin_header: &HeaderValue, host: &str) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if is_allowed_origin(&origin, host) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            host, "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

const LOCALHOST: &str = "localhost";

/// Returns true when a parsed Origin may open the feed socket.
///
/// Accepts http(s) origins whose `host[:port]` equals the request's `Host`,
/// and HTTP requests from localhost with a non-zero explicit port so a dev
/// server on another port can connect.
fn is_allowed_origin(origin: &Url, host: &str) -> bool {
    let Some(origin_host) = origin.host_str() else {
        return false;
    };
    if !matches!(origin.scheme(), "http" | "https") {
        return false;
    }
    let authority = match origin.port() {
        Some(port) => format!("{origin_host}:{port}"),
        None => origin_host.to_owned(),
    };
    if authority.eq_ignore_ascii_case(host) {
        return true;
    }
    origin.scheme() == "http"
        && origin_host == LOCALHOST
        && matches!(origin.port(), Some(port) if port != 0)
}
