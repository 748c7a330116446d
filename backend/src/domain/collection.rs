//! Collections and the images saved into them.
//!
//! A collection id is the user-chosen name, trimmed, and doubles as the
//! document key under `users/{uid}/collections/`. Saved images get
//! store-generated ids and keep only their source URL.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::document::is_reserved_segment;

/// Validation errors for collection and saved-image values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionValidationError {
    /// The name was empty once trimmed.
    #[error("collection name must not be empty")]
    EmptyName,
    /// The name contained a path separator.
    #[error("collection name must not contain '/'")]
    NameContainsSlash,
    /// The name is `.`, `..` or of the reserved `__name__` form.
    #[error("collection name {0:?} is reserved")]
    ReservedName(String),
    /// A saved-image id was empty or contained a path separator.
    #[error("image id must be a non-empty path segment")]
    InvalidImageId,
    /// The image URL was blank.
    #[error("image URL must not be empty")]
    EmptyUrl,
    /// The image URL was not absolute http(s).
    #[error("image URL must be an absolute http or https URL")]
    InvalidUrl,
}

/// Collection key derived from a user-chosen name.
///
/// # Examples
/// ```
/// use pinboard::domain::CollectionId;
///
/// let id = CollectionId::new("  Travel ").expect("valid name");
/// assert_eq!(id.as_ref(), "Travel");
/// assert!(CollectionId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionId(String);

impl CollectionId {
    /// Trim and validate a collection name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, CollectionValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CollectionValidationError::EmptyName);
        }
        if trimmed.contains('/') {
            return Err(CollectionValidationError::NameContainsSlash);
        }
        if is_reserved_segment(trimmed) {
            return Err(CollectionValidationError::ReservedName(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CollectionId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CollectionId> for String {
    fn from(value: CollectionId) -> Self {
        value.0
    }
}

impl TryFrom<String> for CollectionId {
    type Error = CollectionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Store-generated identifier of a saved image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SavedImageId(String);

impl SavedImageId {
    /// Validate an image id path segment.
    pub fn new(id: impl Into<String>) -> Result<Self, CollectionValidationError> {
        let id = id.into();
        if id.trim().is_empty() || id.contains('/') || is_reserved_segment(&id) {
            return Err(CollectionValidationError::InvalidImageId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for SavedImageId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SavedImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SavedImageId> for String {
    fn from(value: SavedImageId) -> Self {
        value.0
    }
}

impl TryFrom<String> for SavedImageId {
    type Error = CollectionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Absolute http(s) URL of an image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Validate an image URL.
    ///
    /// # Examples
    /// ```
    /// use pinboard::domain::ImageUrl;
    ///
    /// assert!(ImageUrl::new("https://img/1.jpg").is_ok());
    /// assert!(ImageUrl::new("/relative.jpg").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CollectionValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CollectionValidationError::EmptyUrl);
        }
        let parsed = Url::parse(trimmed).map_err(|_| CollectionValidationError::InvalidUrl)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CollectionValidationError::InvalidUrl);
        }
        // Keep the caller's spelling so stored values match what was saved.
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ImageUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ImageUrl> for String {
    fn from(value: ImageUrl) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImageUrl {
    type Error = CollectionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A user-owned named bucket of saved images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Document key, equal to the trimmed name.
    #[schema(value_type = String, example = "Travel")]
    pub id: CollectionId,
    /// Display name.
    pub name: String,
    /// Creation time; absent for documents written without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Collection plus the URL of its first enumerated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    /// Collection record.
    #[serde(flatten)]
    pub collection: Collection,
    /// Preview image URL; absent for empty collections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub preview_url: Option<ImageUrl>,
}

/// An image saved into a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedImage {
    /// Store-generated id.
    #[schema(value_type = String)]
    pub id: SavedImageId,
    /// Source URL.
    #[schema(value_type = String, example = "https://img/1.jpg")]
    pub url: ImageUrl,
    /// Save time; absent for documents written without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}
