//! Hierarchical document-store paths and field values.
//!
//! Paths alternate collection and document segments:
//! `users/{uid}` is a document, `users/{uid}/collections` a collection,
//! `users/{uid}/collections/{id}/images/{imageId}` a nested document. The
//! layout is shared with other clients of the same store and must stay
//! byte-for-byte stable.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use super::{CollectionId, SavedImageId, UserId};

const USERS: &str = "users";
const COLLECTIONS: &str = "collections";
const IMAGES: &str = "images";

/// Errors raised when assembling a path from raw segments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A segment was empty, contained `/`, or is reserved by the store.
    #[error("invalid path segment: {0:?}")]
    InvalidSegment(String),
    /// The segment count did not match the path kind.
    #[error("path {path:?} has the wrong number of segments for a {kind}")]
    WrongArity {
        /// Offending path.
        path: String,
        /// Expected kind, `document` or `collection`.
        kind: &'static str,
    },
}

/// Whether the store refuses `segment` as an id: `.`, `..` and `__*__`.
pub(crate) fn is_reserved_segment(segment: &str) -> bool {
    segment == "."
        || segment == ".."
        || (segment.len() >= 4 && segment.starts_with("__") && segment.ends_with("__"))
}

fn validate_segments(raw: &str) -> Result<Vec<String>, PathError> {
    raw.split('/')
        .map(|segment| {
            if segment.trim().is_empty() || is_reserved_segment(segment) {
                Err(PathError::InvalidSegment(segment.to_owned()))
            } else {
                Ok(segment.to_owned())
            }
        })
        .collect()
}

/// Path to a single document; always an even number of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath(Vec<String>);

impl DocumentPath {
    /// Parse a slash-separated document path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let segments = validate_segments(raw)?;
        if segments.len() % 2 != 0 {
            return Err(PathError::WrongArity {
                path: raw.to_owned(),
                kind: "document",
            });
        }
        Ok(Self(segments))
    }

    /// `users/{uid}`.
    pub fn user(uid: &UserId) -> Self {
        Self(vec![USERS.to_owned(), uid.to_string()])
    }

    /// `users/{uid}/collections/{id}`.
    pub fn collection(uid: &UserId, id: &CollectionId) -> Self {
        CollectionPath::collections(uid).doc(id.as_ref())
    }

    /// `users/{uid}/collections/{id}/images/{imageId}`.
    pub fn image(uid: &UserId, collection: &CollectionId, image: &SavedImageId) -> Self {
        CollectionPath::images(uid, collection).doc(image.as_ref())
    }

    /// Last segment, the document id.
    pub fn id(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// Collection containing this document.
    pub fn parent(&self) -> CollectionPath {
        let mut segments = self.0.clone();
        segments.pop();
        CollectionPath(segments)
    }

    /// Sub-collection `name` under this document.
    pub fn child(&self, name: &str) -> CollectionPath {
        let mut segments = self.0.clone();
        segments.push(name.to_owned());
        CollectionPath(segments)
    }

    /// Path segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Path to a collection of documents; always an odd number of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(Vec<String>);

impl CollectionPath {
    /// Parse a slash-separated collection path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let segments = validate_segments(raw)?;
        if segments.len() % 2 != 1 {
            return Err(PathError::WrongArity {
                path: raw.to_owned(),
                kind: "collection",
            });
        }
        Ok(Self(segments))
    }

    /// `users/{uid}/collections`.
    pub fn collections(uid: &UserId) -> Self {
        DocumentPath::user(uid).child(COLLECTIONS)
    }

    /// `users/{uid}/collections/{id}/images`.
    pub fn images(uid: &UserId, collection: &CollectionId) -> Self {
        DocumentPath::collection(uid, collection).child(IMAGES)
    }

    /// Document `id` within this collection.
    pub fn doc(&self, id: &str) -> DocumentPath {
        let mut segments = self.0.clone();
        segments.push(id.to_owned());
        DocumentPath(segments)
    }

    /// Whether `path` names a direct child document of this collection.
    pub fn contains(&self, path: &DocumentPath) -> bool {
        path.0.len() == self.0.len() + 1 && path.0.starts_with(&self.0)
    }

    /// Path segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// A single stored field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// UTF-8 string.
    String(String),
    /// Server or client timestamp.
    Timestamp(DateTime<Utc>),
    /// Explicit null.
    Null,
}

impl FieldValue {
    /// String content, if this is a string field.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Timestamp content, if this is a timestamp field.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Field map of one document, ordered by name.
pub type Fields = BTreeMap<String, FieldValue>;

/// A document read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Full path of the document.
    pub path: DocumentPath,
    /// Stored fields.
    pub fields: Fields,
}

impl Document {
    /// Document id (last path segment).
    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// String field lookup.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_str)
    }

    /// Timestamp field lookup.
    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.fields.get(name).and_then(FieldValue::as_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn uid() -> UserId {
        UserId::new("u1").expect("uid")
    }

    #[test]
    fn builds_store_layout_paths() {
        let travel = CollectionId::new("Travel").expect("id");
        let image = SavedImageId::new("img-1").expect("image id");
        assert_eq!(DocumentPath::user(&uid()).to_string(), "users/u1");
        assert_eq!(
            DocumentPath::collection(&uid(), &travel).to_string(),
            "users/u1/collections/Travel"
        );
        assert_eq!(
            DocumentPath::image(&uid(), &travel, &image).to_string(),
            "users/u1/collections/Travel/images/img-1"
        );
        assert_eq!(
            CollectionPath::images(&uid(), &travel).to_string(),
            "users/u1/collections/Travel/images"
        );
    }

    #[rstest]
    #[case("users")]
    #[case("users/u1/collections")]
    fn document_paths_need_even_segments(#[case] raw: &str) {
        assert!(matches!(
            DocumentPath::parse(raw),
            Err(PathError::WrongArity { .. })
        ));
    }

    #[rstest]
    #[case("users//collections")]
    #[case("")]
    #[case("users/u1/collections/../images")]
    #[case("users/__meta__/collections")]
    fn rejects_empty_segments(#[case] raw: &str) {
        assert!(matches!(
            CollectionPath::parse(raw),
            Err(PathError::InvalidSegment(_))
        ));
    }

    #[test]
    fn contains_only_direct_children() {
        let travel = CollectionId::new("Travel").expect("id");
        let collections = CollectionPath::collections(&uid());
        let direct = DocumentPath::collection(&uid(), &travel);
        let nested = CollectionPath::images(&uid(), &travel).doc("img-1");
        assert!(collections.contains(&direct));
        assert!(!collections.contains(&nested));
        assert_eq!(direct.parent(), collections);
    }
}
