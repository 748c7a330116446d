//! State behind the collection detail page.
//!
//! Image deletes are applied to the local list only after the store
//! confirms them. Collection deletes go through a [`ConfirmPrompt`] first.
//! Closing the view through its [`ViewCloser`] makes every later result a
//! no-op, so work finishing after the page was left never touches it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::collection_store::{CascadeReport, CollectionStore};
use super::ports::{ConfirmPrompt, DocumentStore};
use super::{CollectionId, Error, SavedImage, SavedImageId, SessionState, UserId};

/// Where the view navigates after deleting its collection.
pub const PERSONAL_ROUTE: &str = "/personal";

/// Rendering state of the image list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DetailStatus {
    /// Images have not been loaded yet.
    Loading,
    /// Loaded, no images.
    Empty,
    /// Loaded, at least one image.
    Populated,
}

/// Outcome of a collection delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionDeletion {
    /// The user declined the prompt; nothing was deleted.
    Cancelled,
    /// The collection was deleted; navigate to `navigate_to`.
    Deleted {
        /// Cascade outcome.
        report: CascadeReport,
        /// Route to show next.
        navigate_to: &'static str,
    },
    /// No signed-in owner; nothing happened.
    Declined,
    /// The view was closed before the delete finished.
    Closed,
}

/// Handle that closes a [`CollectionDetailView`] from elsewhere.
#[derive(Debug, Clone)]
pub struct ViewCloser(Arc<AtomicBool>);

impl ViewCloser {
    /// Mark the view closed.
    pub fn close(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// One open collection detail page.
pub struct CollectionDetailView<S: ?Sized> {
    store: CollectionStore<S>,
    owner: Option<UserId>,
    collection: CollectionId,
    images: Vec<SavedImage>,
    status: DetailStatus,
    closed: Arc<AtomicBool>,
}

impl<S> CollectionDetailView<S>
where
    S: DocumentStore + ?Sized,
{
    /// Mount the view for `collection`. Call [`Self::load`] next.
    pub fn open(store: CollectionStore<S>, session: &SessionState, collection: CollectionId) -> Self {
        Self {
            store,
            owner: session.user_id().cloned(),
            collection,
            images: Vec::new(),
            status: DetailStatus::Loading,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for closing the view.
    pub fn closer(&self) -> ViewCloser {
        ViewCloser(Arc::clone(&self.closed))
    }

    /// Whether the view has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Collection on display.
    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }

    /// Images in enumeration order.
    pub fn images(&self) -> &[SavedImage] {
        &self.images
    }

    /// Current status.
    pub fn status(&self) -> DetailStatus {
        self.status
    }

    /// Whether an owner is attached.
    pub fn has_owner(&self) -> bool {
        self.owner.is_some()
    }

    /// Switch to another collection and reset to `Loading`.
    pub fn set_collection(&mut self, collection: CollectionId) {
        if collection != self.collection {
            self.collection = collection;
            self.images.clear();
            self.status = DetailStatus::Loading;
        }
    }

    /// Load the image list.
    pub async fn load(&mut self) -> Result<DetailStatus, Error> {
        let images = self
            .store
            .list_images(self.owner.as_ref(), &self.collection)
            .await?;
        if self.is_closed() {
            debug!(collection = %self.collection, "view closed; dropping image list");
            return Ok(self.status);
        }
        self.images = images;
        self.refresh_status();
        Ok(self.status)
    }

    /// Delete one image; the local list changes only after the store confirms.
    pub async fn delete_image(&mut self, image: &SavedImageId) -> Result<(), Error> {
        let result = self
            .store
            .delete_image(self.owner.as_ref(), &self.collection, image)
            .await;
        if let Err(err) = result {
            warn!(collection = %self.collection, image = %image, error = %err, "image delete failed");
            return Err(err);
        }
        if self.is_closed() {
            return Ok(());
        }
        self.images.retain(|saved| &saved.id != image);
        self.refresh_status();
        Ok(())
    }

    /// Ask for confirmation, then cascade-delete the collection.
    pub async fn delete_collection(
        &mut self,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<CollectionDeletion, Error> {
        let message = format!(
            "Delete collection \"{}\" and all of its images?",
            self.collection
        );
        if !prompt.confirm(&message).await {
            return Ok(CollectionDeletion::Cancelled);
        }
        let outcome = self
            .store
            .delete_collection(self.owner.as_ref(), &self.collection)
            .await
            .inspect_err(|err| {
                warn!(collection = %self.collection, error = %err, "collection delete failed");
            })?;
        if self.is_closed() {
            return Ok(CollectionDeletion::Closed);
        }
        Ok(match outcome {
            Some(report) => {
                self.images.clear();
                self.status = DetailStatus::Empty;
                CollectionDeletion::Deleted {
                    report,
                    navigate_to: PERSONAL_ROUTE,
                }
            }
            None => CollectionDeletion::Declined,
        })
    }

    fn refresh_status(&mut self) {
        self.status = if self.images.is_empty() {
            DetailStatus::Empty
        } else {
            DetailStatus::Populated
        };
    }
}
