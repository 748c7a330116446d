//! Transient images shown in the discovery feed.

use std::fmt;

use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Alt text used when the provider omits a description.
pub const DEFAULT_ALT_TEXT: &str = "Image";

/// One image returned by the external provider. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedImage {
    /// Provider id, used for de-duplication.
    pub id: String,
    /// Small preview URL.
    pub thumbnail_url: String,
    /// Full-resolution URL; this is what gets saved.
    pub full_url: String,
    /// Alt text.
    pub alt: String,
}

impl FeedImage {
    /// Build a feed image, substituting [`DEFAULT_ALT_TEXT`] for missing or
    /// blank alt text.
    pub fn new(
        id: impl Into<String>,
        thumbnail_url: impl Into<String>,
        full_url: impl Into<String>,
        alt: Option<String>,
    ) -> Self {
        let alt = alt
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ALT_TEXT.to_owned());
        Self {
            id: id.into(),
            thumbnail_url: thumbnail_url.into(),
            full_url: full_url.into(),
            alt,
        }
    }
}

/// Free-text search query; blank input means the "latest" feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedQuery(String);

impl FeedQuery {
    /// Normalise raw input. Returns `None` for blank queries.
    ///
    /// # Examples
    /// ```
    /// use pinboard::domain::FeedQuery;
    ///
    /// assert!(FeedQuery::parse("   ").is_none());
    /// assert_eq!(FeedQuery::parse(" cats ").map(|q| q.to_string()), Some("cats".to_owned()));
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Parse an optional raw query.
    pub fn from_optional(raw: Option<&str>) -> Option<Self> {
        raw.and_then(Self::parse)
    }
}

impl AsRef<str> for FeedQuery {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FeedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page request against the image provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    /// Search query; `None` for the latest feed.
    pub query: Option<FeedQuery>,
    /// Page number and size.
    pub page: PageRequest,
}
