//! Process-local document store.
//!
//! Documents live in an ordered map keyed by path, so enumeration follows
//! document id order within a collection. Like the hosted store, deleting a
//! parent leaves its sub-collections untouched.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{DocumentStore, DocumentStoreError};
use crate::domain::{CollectionPath, Document, DocumentPath, Fields};

/// In-memory [`DocumentStore`] used for development and tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<BTreeMap<DocumentPath, Fields>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents across every collection.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentStoreError> {
        let documents = self.documents.read().await;
        Ok(documents.get(path).map(|fields| Document {
            path: path.clone(),
            fields: fields.clone(),
        }))
    }

    async fn set(&self, path: &DocumentPath, fields: Fields) -> Result<(), DocumentStoreError> {
        self.documents.write().await.insert(path.clone(), fields);
        Ok(())
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<DocumentPath, DocumentStoreError> {
        let path = collection.doc(&Uuid::new_v4().simple().to_string());
        self.documents.write().await.insert(path.clone(), fields);
        debug!(%path, "document added");
        Ok(path)
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, DocumentStoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|(path, _)| collection.contains(path))
            .map(|(path, fields)| Document {
                path: path.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentStoreError> {
        self.documents.write().await.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CollectionId, FieldValue, UserId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn owner() -> UserId {
        UserId::new("ada").expect("uid")
    }

    fn named(name: &str) -> Fields {
        Fields::from([("name".to_owned(), FieldValue::from(name))])
    }

    #[rstest]
    #[tokio::test]
    async fn set_then_get_round_trips(owner: UserId) {
        let store = MemoryDocumentStore::new();
        let path = DocumentPath::collection(&owner, &CollectionId::new("Travel").expect("id"));
        store.set(&path, named("Travel")).await.expect("set");

        let doc = store.get(&path).await.expect("get").expect("present");
        assert_eq!(doc.string("name"), Some("Travel"));
        assert_eq!(doc.id(), "Travel");
    }

    #[rstest]
    #[tokio::test]
    async fn list_returns_direct_children_only(owner: UserId) {
        let store = MemoryDocumentStore::new();
        let travel = CollectionId::new("Travel").expect("id");
        store
            .set(&DocumentPath::collection(&owner, &travel), named("Travel"))
            .await
            .expect("set");
        store
            .add(&CollectionPath::images(&owner, &travel), named("image"))
            .await
            .expect("add");

        let collections = store
            .list(&CollectionPath::collections(&owner))
            .await
            .expect("list");
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].id(), "Travel");
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_parent_keeps_children(owner: UserId) {
        let store = MemoryDocumentStore::new();
        let travel = CollectionId::new("Travel").expect("id");
        let parent = DocumentPath::collection(&owner, &travel);
        store.set(&parent, named("Travel")).await.expect("set");
        store
            .add(&CollectionPath::images(&owner, &travel), named("image"))
            .await
            .expect("add");

        store.delete(&parent).await.expect("delete");
        store.delete(&parent).await.expect("second delete is a no-op");

        let images = store
            .list(&CollectionPath::images(&owner, &travel))
            .await
            .expect("list");
        assert_eq!(images.len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn add_assigns_distinct_ids(owner: UserId) {
        let store = MemoryDocumentStore::new();
        let images = CollectionPath::images(&owner, &CollectionId::new("Travel").expect("id"));
        let first = store.add(&images, named("a")).await.expect("add");
        let second = store.add(&images, named("a")).await.expect("add");
        assert_ne!(first, second);
        assert!(images.contains(&first));
    }
}
