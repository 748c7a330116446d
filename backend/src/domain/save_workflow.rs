//! "Save image to collection" state machine.
//!
//! ```text
//! Idle -> CheckingAuth -> Unauthenticated (terminal)
//!                      -> ChoosingCollection -> Saving -> Success (terminal)
//!                                                      -> ChoosingCollection (with error)
//! ```
//!
//! The collection list is fetched fresh every time the workflow opens. A
//! selection is either an existing collection or a new name; the latter
//! creates the collection and then saves into it. When that save fails the
//! new, empty collection is kept.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::collection_store::CollectionStore;
use super::ports::DocumentStore;
use super::{CollectionId, CollectionSummary, Error, SavedImage, SessionState, UserId};

/// Where unauthenticated users are sent.
pub const LOGIN_ROUTE: &str = "/login";

/// The user's choice of target collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SaveTarget {
    /// Save into an existing collection (`SelectingExisting`).
    Existing(String),
    /// Create a collection with this name, then save into it (`CreatingNew`).
    New(String),
}

/// Prompt shown when the user tried to save without a usable choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SavePrompt {
    /// No existing collection was selected.
    ChooseCollection,
    /// The new-collection name was blank.
    NameCollection,
}

/// Current workflow state.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SaveState {
    /// Not opened yet.
    Idle,
    /// Waiting for the session to resolve.
    CheckingAuth,
    /// No signed-in user; the caller redirects.
    Unauthenticated {
        /// Redirect target.
        #[serde(rename = "redirectTo")]
        redirect_to: String,
    },
    /// Waiting for the user to pick or name a collection.
    ChoosingCollection {
        /// Fresh list of the user's collections.
        collections: Vec<CollectionSummary>,
        /// Set after an empty selection.
        #[serde(skip_serializing_if = "Option::is_none")]
        prompt: Option<SavePrompt>,
        /// Set after a failed save.
        #[serde(skip_serializing_if = "Option::is_none")]
        #[schema(value_type = Option<Object>)]
        error: Option<Error>,
    },
    /// Writing to the store.
    Saving,
    /// The image was saved; the modal closes.
    Success {
        /// Target collection.
        #[schema(value_type = String)]
        collection: CollectionId,
        /// Stored record.
        image: SavedImage,
    },
}

/// One save interaction for one image URL.
pub struct SaveWorkflow<S: ?Sized> {
    store: CollectionStore<S>,
    image_url: String,
    owner: Option<UserId>,
    state: SaveState,
}

impl<S> SaveWorkflow<S>
where
    S: DocumentStore + ?Sized,
{
    /// Start an idle workflow for `image_url`.
    pub fn new(store: CollectionStore<S>, image_url: impl Into<String>) -> Self {
        Self {
            store,
            image_url: image_url.into(),
            owner: None,
            state: SaveState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> &SaveState {
        &self.state
    }

    /// Consume the workflow, returning its final state.
    pub fn into_state(self) -> SaveState {
        self.state
    }

    /// Check the session and, when signed in, load the collection list.
    pub async fn open(&mut self, session: &SessionState) -> &SaveState {
        self.state = SaveState::CheckingAuth;
        match session.user_id() {
            Some(uid) if !session.loading => {
                self.owner = Some(uid.clone());
                self.state = self.choosing(None, None).await;
            }
            _ => {
                debug!("save requested without a session");
                self.owner = None;
                self.state = SaveState::Unauthenticated {
                    redirect_to: LOGIN_ROUTE.to_owned(),
                };
            }
        }
        &self.state
    }

    /// Save into the chosen collection.
    ///
    /// Only valid while choosing; in any other state this is a no-op.
    pub async fn save(&mut self, target: SaveTarget) -> &SaveState {
        let SaveState::ChoosingCollection { collections, .. } = &self.state else {
            return &self.state;
        };

        let prompt = match &target {
            SaveTarget::Existing(name) if name.trim().is_empty() => {
                Some(SavePrompt::ChooseCollection)
            }
            SaveTarget::New(name) if name.trim().is_empty() => Some(SavePrompt::NameCollection),
            _ => None,
        };
        if let Some(prompt) = prompt {
            self.state = SaveState::ChoosingCollection {
                collections: collections.clone(),
                prompt: Some(prompt),
                error: None,
            };
            return &self.state;
        }

        self.state = SaveState::Saving;
        self.state = match self.persist(&target).await {
            Ok(Some((collection, image))) => SaveState::Success { collection, image },
            Ok(None) => SaveState::Unauthenticated {
                redirect_to: LOGIN_ROUTE.to_owned(),
            },
            Err(err) => {
                warn!(error = %err, choice = ?target, "save failed");
                self.choosing(None, Some(err)).await
            }
        };
        &self.state
    }

    async fn persist(
        &self,
        target: &SaveTarget,
    ) -> Result<Option<(CollectionId, SavedImage)>, Error> {
        let owner = self.owner.as_ref();
        let collection = match target {
            SaveTarget::Existing(name) => {
                let id = CollectionId::new(name)
                    .map_err(|err| Error::invalid_request(err.to_string()))?;
                if !self.store.collection_exists(owner, &id).await? {
                    return Err(Error::not_found(format!("collection \"{id}\" does not exist")));
                }
                id
            }
            SaveTarget::New(name) => match self.store.create_collection(owner, name).await? {
                Some(created) => created.id,
                None => return Ok(None),
            },
        };
        let saved = self
            .store
            .save_image(owner, &collection, &self.image_url)
            .await?;
        Ok(saved.map(|image| (collection, image)))
    }

    async fn choosing(&self, prompt: Option<SavePrompt>, error: Option<Error>) -> SaveState {
        match self.store.list_collections(self.owner.as_ref()).await {
            Ok(collections) => SaveState::ChoosingCollection {
                collections,
                prompt,
                error,
            },
            Err(list_err) => {
                warn!(error = %list_err, "collection list unavailable");
                SaveState::ChoosingCollection {
                    collections: Vec::new(),
                    prompt,
                    error: error.or(Some(list_err)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{DocumentStoreError, MockDocumentStore};
    use crate::domain::{Document, DocumentPath, ErrorCode, Fields, Identity};
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    const URL: &str = "https://img/1.jpg";

    #[fixture]
    fn signed_in() -> SessionState {
        SessionState::signed_in(Identity::new(UserId::new("ada").expect("uid")))
    }

    fn workflow(mock: MockDocumentStore) -> SaveWorkflow<MockDocumentStore> {
        SaveWorkflow::new(
            CollectionStore::new(Arc::new(mock), Arc::new(DefaultClock)),
            URL,
        )
    }

    #[rstest]
    #[case(SessionState::signed_out())]
    #[case(SessionState::loading())]
    #[tokio::test]
    async fn unauthenticated_sessions_redirect(#[case] session: SessionState) {
        let mut flow = workflow(MockDocumentStore::new());
        let state = flow.open(&session).await;
        assert_eq!(
            state,
            &SaveState::Unauthenticated {
                redirect_to: "/login".to_owned()
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn opening_fetches_the_list_every_time(signed_in: SessionState) {
        let mut mock = MockDocumentStore::new();
        mock.expect_list().times(2).returning(|_| Ok(Vec::new()));
        let mut flow = workflow(mock);
        flow.open(&signed_in).await;
        let state = flow.open(&signed_in).await;
        assert!(matches!(state, SaveState::ChoosingCollection { .. }));
    }

    #[rstest]
    #[case(SaveTarget::Existing("  ".into()), SavePrompt::ChooseCollection)]
    #[case(SaveTarget::New(String::new()), SavePrompt::NameCollection)]
    #[tokio::test]
    async fn empty_selection_prompts_without_io(
        signed_in: SessionState,
        #[case] target: SaveTarget,
        #[case] expected: SavePrompt,
    ) {
        let mut mock = MockDocumentStore::new();
        mock.expect_list().times(1).returning(|_| Ok(Vec::new()));
        mock.expect_add().never();
        mock.expect_set().never();
        let mut flow = workflow(mock);
        flow.open(&signed_in).await;

        let state = flow.save(target).await;
        assert!(matches!(
            state,
            SaveState::ChoosingCollection { prompt: Some(p), error: None, .. } if *p == expected
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn saving_into_existing_collection_succeeds(signed_in: SessionState) {
        let mut mock = MockDocumentStore::new();
        mock.expect_list().returning(|_| Ok(Vec::new()));
        mock.expect_get().times(1).returning(|path| {
            Ok(Some(Document {
                path: path.clone(),
                fields: Fields::new(),
            }))
        });
        mock.expect_add()
            .times(1)
            .returning(|collection, _| Ok(collection.doc("img-1")));
        let mut flow = workflow(mock);
        flow.open(&signed_in).await;

        let state = flow.save(SaveTarget::Existing("Travel".into())).await;
        let SaveState::Success { collection, image } = state else {
            panic!("expected success, got {state:?}");
        };
        assert_eq!(collection.as_ref(), "Travel");
        assert_eq!(image.url.as_ref(), URL);
    }

    #[rstest]
    #[tokio::test]
    async fn creating_new_collection_creates_then_saves(signed_in: SessionState) {
        let mut mock = MockDocumentStore::new();
        mock.expect_list().returning(|_| Ok(Vec::new()));
        mock.expect_get().times(1).returning(|_| Ok(None));
        mock.expect_set()
            .withf(|path: &DocumentPath, _| path.id() == "Moodboard")
            .times(1)
            .returning(|_, _| Ok(()));
        mock.expect_add()
            .times(1)
            .returning(|collection, _| Ok(collection.doc("img-1")));
        let mut flow = workflow(mock);
        flow.open(&signed_in).await;

        let state = flow.save(SaveTarget::New(" Moodboard ".into())).await;
        assert!(matches!(state, SaveState::Success { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn failed_save_returns_to_choosing_with_error(signed_in: SessionState) {
        let mut mock = MockDocumentStore::new();
        mock.expect_list().times(2).returning(|_| Ok(Vec::new()));
        mock.expect_get().returning(|_| Ok(None));
        mock.expect_set().returning(|_, _| Ok(()));
        mock.expect_add()
            .returning(|_, _| Err(DocumentStoreError::connection("offline")));
        let mut flow = workflow(mock);
        flow.open(&signed_in).await;

        let state = flow.save(SaveTarget::New("Moodboard".into())).await;
        let SaveState::ChoosingCollection { error: Some(err), .. } = state else {
            panic!("expected failure state, got {state:?}");
        };
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn saving_into_missing_collection_is_refused(signed_in: SessionState) {
        let mut mock = MockDocumentStore::new();
        mock.expect_list().times(2).returning(|_| Ok(Vec::new()));
        mock.expect_get().times(1).returning(|_| Ok(None));
        mock.expect_add().never();
        let mut flow = workflow(mock);
        flow.open(&signed_in).await;

        let state = flow.save(SaveTarget::Existing("Ghost".into())).await;
        let SaveState::ChoosingCollection { error: Some(err), .. } = state else {
            panic!("expected refusal, got {state:?}");
        };
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn save_before_open_is_ignored() {
        let mut flow = workflow(MockDocumentStore::new());
        let state = flow.save(SaveTarget::Existing("Travel".into())).await;
        assert_eq!(state, &SaveState::Idle);
    }
}
