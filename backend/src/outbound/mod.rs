//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **firestore**: document store over the Firestore REST API
//! - **identity_toolkit**: auth provider over the Identity Toolkit REST API
//! - **unsplash**: image source over the photo search API
//! - **memory**: in-process store and auth provider for development and tests
//!
//! Adapters are thin translators that convert between domain types and
//! wire representations. They contain no business logic.

pub mod firestore;
pub mod identity_toolkit;
pub mod memory;
pub mod unsplash;
