//! Driven port for the hierarchical document store.
//!
//! The store offers no cascading deletes and no multi-document transactions;
//! callers compose those from the primitive operations below.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{CollectionPath, Document, DocumentPath, Error, Fields};

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached.
        Connection { message: String } => "document store connection failed: {message}",
        /// The store rejected or failed the operation.
        Query { message: String } => "document store query failed: {message}",
        /// The caller lacks permission for the path.
        PermissionDenied { message: String } => "document store denied access: {message}",
        /// A stored document could not be decoded.
        Decode { message: String } => "document store returned malformed data: {message}",
    }
}

impl From<DocumentStoreError> for Error {
    fn from(value: DocumentStoreError) -> Self {
        match value {
            DocumentStoreError::Connection { message } => {
                Error::service_unavailable(format!("document store unavailable: {message}"))
            }
            DocumentStoreError::PermissionDenied { message } => {
                Error::forbidden(format!("document store denied access: {message}"))
            }
            DocumentStoreError::Query { message } | DocumentStoreError::Decode { message } => {
                Error::internal(format!("document store error: {message}"))
            }
        }
    }
}

/// Primitive document operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document; `None` when it does not exist.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentStoreError>;

    /// Create or fully overwrite the document at `path`.
    async fn set(&self, path: &DocumentPath, fields: Fields) -> Result<(), DocumentStoreError>;

    /// Append a document with a store-generated id and return its path.
    async fn add(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<DocumentPath, DocumentStoreError>;

    /// Enumerate the direct child documents of `collection`.
    ///
    /// A collection that was never written yields an empty list.
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, DocumentStoreError>;

    /// Delete one document. Deleting a missing document succeeds.
    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(DocumentStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(DocumentStoreError::query("bad filter"), ErrorCode::InternalError)]
    #[case(DocumentStoreError::decode("missing field"), ErrorCode::InternalError)]
    #[case(DocumentStoreError::permission_denied("rules"), ErrorCode::Forbidden)]
    fn maps_store_errors_to_domain_codes(
        #[case] error: DocumentStoreError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(Error::from(error).code(), expected);
    }
}
