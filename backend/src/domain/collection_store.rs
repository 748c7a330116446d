//! Per-user collection and saved-image operations over the document store.
//!
//! Every operation takes the owner as `Option<&UserId>`. With no owner (not
//! signed in, or the session is still resolving) the call declines: reads
//! return empty results, writes return `None`, and nothing reaches the store.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::ports::DocumentStore;
use super::{
    Collection, CollectionId, CollectionPath, CollectionSummary, Document, DocumentPath, Error,
    Fields, ImageUrl, SavedImage, SavedImageId, UserId,
};

const FIELD_NAME: &str = "name";
const FIELD_CREATED_AT: &str = "createdAt";
const FIELD_URL: &str = "url";
const FIELD_TIMESTAMP: &str = "timestamp";

/// Outcome of a best-effort cascade delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    /// Images removed before the collection document.
    pub images_deleted: usize,
    /// Images whose delete failed; they may be orphaned.
    pub images_failed: usize,
}

/// Collection accessor bound to a document store and a clock.
pub struct CollectionStore<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> Clone for CollectionStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

fn declined(operation: &'static str) {
    debug!(operation, "no signed-in owner; declining collection operation");
}

impl<S> CollectionStore<S>
where
    S: DocumentStore + ?Sized,
{
    /// Create an accessor.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a collection keyed by the trimmed `name`.
    ///
    /// Fails with `invalid_request` for blank names or names containing `/`
    /// and with `conflict` when a collection with that id already exists.
    pub async fn create_collection(
        &self,
        owner: Option<&UserId>,
        name: &str,
    ) -> Result<Option<Collection>, Error> {
        let Some(owner) = owner else {
            declined("create_collection");
            return Ok(None);
        };
        let id = CollectionId::new(name).map_err(|err| Error::invalid_request(err.to_string()))?;
        let path = DocumentPath::collection(owner, &id);

        if self.store.get(&path).await?.is_some() {
            return Err(Error::conflict(format!("collection \"{id}\" already exists")));
        }

        let created_at = self.clock.utc();
        let mut fields = Fields::new();
        fields.insert(FIELD_NAME.to_owned(), id.as_ref().into());
        fields.insert(FIELD_CREATED_AT.to_owned(), created_at.into());
        self.store.set(&path, fields).await?;

        debug!(owner = %owner, collection = %id, "collection created");
        Ok(Some(Collection {
            name: id.to_string(),
            id,
            created_at: Some(created_at),
        }))
    }

    /// Whether a collection document exists.
    pub async fn collection_exists(
        &self,
        owner: Option<&UserId>,
        id: &CollectionId,
    ) -> Result<bool, Error> {
        let Some(owner) = owner else {
            declined("collection_exists");
            return Ok(false);
        };
        let found = self
            .store
            .get(&DocumentPath::collection(owner, id))
            .await?;
        Ok(found.is_some())
    }

    /// List the owner's collections, each with the URL of its first image.
    ///
    /// Issues one image query per collection. A failed preview query leaves
    /// that collection without a preview instead of failing the listing.
    pub async fn list_collections(
        &self,
        owner: Option<&UserId>,
    ) -> Result<Vec<CollectionSummary>, Error> {
        let Some(owner) = owner else {
            declined("list_collections");
            return Ok(Vec::new());
        };
        let documents = self.store.list(&CollectionPath::collections(owner)).await?;

        let mut summaries = Vec::with_capacity(documents.len());
        for document in documents {
            let Some(collection) = decode_collection(&document) else {
                continue;
            };
            let preview_url = match self
                .store
                .list(&CollectionPath::images(owner, &collection.id))
                .await
            {
                Ok(images) => images.iter().find_map(decode_image).map(|image| image.url),
                Err(err) => {
                    warn!(
                        owner = %owner,
                        collection = %collection.id,
                        error = %err,
                        "preview lookup failed"
                    );
                    None
                }
            };
            summaries.push(CollectionSummary {
                collection,
                preview_url,
            });
        }
        Ok(summaries)
    }

    /// Delete every image in the collection, then the collection itself.
    ///
    /// Image deletes are best effort: failures are logged and counted. The
    /// collection document is removed only when enumeration succeeded.
    pub async fn delete_collection(
        &self,
        owner: Option<&UserId>,
        id: &CollectionId,
    ) -> Result<Option<CascadeReport>, Error> {
        let Some(owner) = owner else {
            declined("delete_collection");
            return Ok(None);
        };
        let images = self.store.list(&CollectionPath::images(owner, id)).await?;

        let mut report = CascadeReport::default();
        for image in &images {
            match self.store.delete(&image.path).await {
                Ok(()) => report.images_deleted += 1,
                Err(err) => {
                    report.images_failed += 1;
                    warn!(path = %image.path, error = %err, "cascade image delete failed");
                }
            }
        }

        self.store
            .delete(&DocumentPath::collection(owner, id))
            .await?;
        debug!(
            owner = %owner,
            collection = %id,
            images_deleted = report.images_deleted,
            images_failed = report.images_failed,
            "collection deleted"
        );
        Ok(Some(report))
    }

    /// Images in enumeration order. Missing and empty collections both
    /// yield an empty list.
    pub async fn list_images(
        &self,
        owner: Option<&UserId>,
        collection: &CollectionId,
    ) -> Result<Vec<SavedImage>, Error> {
        let Some(owner) = owner else {
            declined("list_images");
            return Ok(Vec::new());
        };
        let documents = self
            .store
            .list(&CollectionPath::images(owner, collection))
            .await?;
        Ok(documents.iter().filter_map(decode_image).collect())
    }

    /// Delete one image. Deleting a missing image succeeds.
    pub async fn delete_image(
        &self,
        owner: Option<&UserId>,
        collection: &CollectionId,
        image: &SavedImageId,
    ) -> Result<(), Error> {
        let Some(owner) = owner else {
            declined("delete_image");
            return Ok(());
        };
        self.store
            .delete(&DocumentPath::image(owner, collection, image))
            .await?;
        Ok(())
    }

    /// Append a saved image with a store-generated id.
    ///
    /// Duplicate URLs are allowed and produce distinct records.
    pub async fn save_image(
        &self,
        owner: Option<&UserId>,
        collection: &CollectionId,
        url: &str,
    ) -> Result<Option<SavedImage>, Error> {
        let Some(owner) = owner else {
            declined("save_image");
            return Ok(None);
        };
        let url = ImageUrl::new(url).map_err(|err| Error::invalid_request(err.to_string()))?;

        let saved_at = self.clock.utc();
        let mut fields = Fields::new();
        fields.insert(FIELD_URL.to_owned(), url.as_ref().into());
        fields.insert(FIELD_TIMESTAMP.to_owned(), saved_at.into());
        let path = self
            .store
            .add(&CollectionPath::images(owner, collection), fields)
            .await?;

        let id = SavedImageId::new(path.id())
            .map_err(|err| Error::internal(format!("store returned an unusable id: {err}")))?;
        debug!(owner = %owner, collection = %collection, image = %id, "image saved");
        Ok(Some(SavedImage {
            id,
            url,
            saved_at: Some(saved_at),
        }))
    }
}

fn decode_collection(document: &Document) -> Option<Collection> {
    match CollectionId::new(document.id()) {
        Ok(id) => Some(Collection {
            name: document
                .string(FIELD_NAME)
                .map_or_else(|| id.to_string(), str::to_owned),
            created_at: document.timestamp(FIELD_CREATED_AT),
            id,
        }),
        Err(err) => {
            warn!(path = %document.path, error = %err, "skipping unreadable collection");
            None
        }
    }
}

fn decode_image(document: &Document) -> Option<SavedImage> {
    let decoded = SavedImageId::new(document.id()).and_then(|id| {
        let url = ImageUrl::new(document.string(FIELD_URL).unwrap_or_default())?;
        Ok(SavedImage {
            id,
            url,
            saved_at: document.timestamp(FIELD_TIMESTAMP),
        })
    });
    match decoded {
        Ok(image) => Some(image),
        Err(err) => {
            warn!(path = %document.path, error = %err, "skipping unreadable image");
            None
        }
    }
}
