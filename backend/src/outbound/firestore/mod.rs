//! Firestore REST v1 document store adapter.

mod dto;
mod http_store;

pub use http_store::{
    DEFAULT_FIRESTORE_URL, FirestoreHttpStore, FirestoreSettings, FirestoreSetupError,
};
