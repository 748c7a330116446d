//! Driven port for the external image provider.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{FeedImage, FeedRequest};

define_port_error! {
    /// Errors raised while fetching a feed page.
    pub enum ImageSourceError {
        /// The provider could not be reached.
        Transport { message: String } => "image source transport failed: {message}",
        /// The request timed out.
        Timeout { message: String } => "image source request timed out: {message}",
        /// The provider throttled the caller.
        RateLimited { message: String } => "image source rate limited the request: {message}",
        /// The provider answered with a non-success status.
        Upstream { status: u16, message: String } => "image source returned status {status}: {message}",
        /// The response body did not match either accepted shape.
        Decode { message: String } => "image source returned malformed data: {message}",
    }
}

/// Fetch one page of images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Return the images on the requested page. An empty list means the
    /// provider has no more results.
    async fn fetch_page(&self, request: &FeedRequest) -> Result<Vec<FeedImage>, ImageSourceError>;
}

/// Deterministic provider used when no API key is configured.
///
/// Serves `pages` pages of `FeedRequest::page.size` images each, then empty
/// pages. Ids repeat the query so two queries never share ids.
#[derive(Debug, Clone, Copy)]
pub struct FixtureImageSource {
    pages: u32,
}

impl FixtureImageSource {
    /// Serve `pages` non-empty pages.
    pub fn new(pages: u32) -> Self {
        Self { pages }
    }
}

impl Default for FixtureImageSource {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl ImageSource for FixtureImageSource {
    async fn fetch_page(&self, request: &FeedRequest) -> Result<Vec<FeedImage>, ImageSourceError> {
        let page = request.page.page.get();
        if page > self.pages {
            return Ok(Vec::new());
        }
        let prefix = request
            .query
            .as_ref()
            .map_or_else(|| "latest".to_owned(), |query| query.to_string());
        let size = u32::from(request.page.size.get());
        Ok((0..size)
            .map(|offset| {
                let n = (page - 1) * size + offset;
                FeedImage::new(
                    format!("{prefix}-{n}"),
                    format!("https://images.invalid/{prefix}/{n}?w=400"),
                    format!("https://images.invalid/{prefix}/{n}"),
                    None,
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeedQuery;
    use pagination::{PageNumber, PageRequest, PageSize};

    fn request(query: Option<&str>, page: u32) -> FeedRequest {
        FeedRequest {
            query: FeedQuery::from_optional(query),
            page: PageRequest::new(
                PageNumber::new(page).expect("page"),
                PageSize::new(4).expect("size"),
            ),
        }
    }

    #[tokio::test]
    async fn fixture_pages_are_disjoint() {
        let source = FixtureImageSource::new(2);
        let first = source.fetch_page(&request(None, 1)).await.expect("page 1");
        let second = source.fetch_page(&request(None, 2)).await.expect("page 2");
        assert_eq!(first.len(), 4);
        assert!(first.iter().all(|image| !second.contains(image)));
        assert_eq!(first[0].alt, "Image");
    }

    #[tokio::test]
    async fn fixture_runs_dry_after_configured_pages() {
        let source = FixtureImageSource::new(1);
        let page = source
            .fetch_page(&request(Some("cats"), 2))
            .await
            .expect("page 2");
        assert!(page.is_empty());
    }
}
