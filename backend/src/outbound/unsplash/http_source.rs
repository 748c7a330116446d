//! Reqwest-backed image provider adapter.
//!
//! This adapter owns transport details only: URL construction, timeout and
//! HTTP error mapping, and JSON decoding into feed images.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::PhotoPageDto;
use crate::domain::ports::{ImageSource, ImageSourceError};
use crate::domain::{FeedImage, FeedRequest};

const LATEST_PATH: &str = "photos";
const SEARCH_PATH: &str = "search/photos";

/// Image source that queries a photo API over HTTPS.
pub struct UnsplashHttpSource {
    client: Client,
    base_url: Url,
    access_key: Zeroizing<String>,
}

impl UnsplashHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        access_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            access_key: Zeroizing::new(access_key.into()),
        })
    }

    fn page_url(&self, request: &FeedRequest) -> Result<Url, ImageSourceError> {
        let path = if request.query.is_some() {
            SEARCH_PATH
        } else {
            LATEST_PATH
        };
        build_page_url(&self.base_url, path, request, &self.access_key)
    }
}

#[async_trait]
impl ImageSource for UnsplashHttpSource {
    async fn fetch_page(&self, request: &FeedRequest) -> Result<Vec<FeedImage>, ImageSourceError> {
        let url = self.page_url(request)?;
        debug!(page = %request.page.page, search = request.query.is_some(), "fetching feed page");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_page(body.as_ref())
    }
}

fn build_page_url(
    base: &Url,
    path: &str,
    request: &FeedRequest,
    access_key: &str,
) -> Result<Url, ImageSourceError> {
    // A base without a trailing slash would drop its last segment on join.
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    let mut url = base
        .join(path)
        .map_err(|err| ImageSourceError::transport(format!("invalid image API URL: {err}")))?;
    request.page.append_to(&mut url);
    {
        let mut pairs = url.query_pairs_mut();
        if let Some(query) = &request.query {
            pairs.append_pair("query", query.as_ref());
        }
        pairs.append_pair("client_id", access_key);
    }
    Ok(url)
}

fn parse_page(body: &[u8]) -> Result<Vec<FeedImage>, ImageSourceError> {
    let decoded: PhotoPageDto = serde_json::from_slice(body).map_err(|error| {
        ImageSourceError::decode(format!("invalid photo page payload: {error}"))
    })?;
    Ok(decoded.into_feed_images())
}

fn map_transport_error(error: reqwest::Error) -> ImageSourceError {
    if error.is_timeout() {
        ImageSourceError::timeout(error.to_string())
    } else {
        ImageSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ImageSourceError {
    let body_preview = body_preview(body);
    match status {
        StatusCode::TOO_MANY_REQUESTS => ImageSourceError::rate_limited(body_preview),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ImageSourceError::timeout(format!("status {}", status.as_u16()))
        }
        _ => ImageSourceError::upstream(status.as_u16(), body_preview),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
