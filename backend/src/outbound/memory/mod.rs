//! In-memory adapters for local development and tests.

mod auth_provider;
mod document_store;

pub use auth_provider::{MIN_PASSWORD_LEN, MemoryAuthProvider};
pub use document_store::MemoryDocumentStore;
