//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (document store, image source, auth provider) are implemented
//! by `crate::outbound`; the confirmation prompt is answered by inbound
//! adapters on behalf of the user.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_provider;
mod confirm_prompt;
mod document_store;
mod image_source;

#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{AuthProvider, AuthProviderError, AuthStateStream, ProviderProfile};
#[cfg(test)]
pub use confirm_prompt::MockConfirmPrompt;
pub use confirm_prompt::{ConfirmPrompt, FixedConfirmation};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{DocumentStore, DocumentStoreError};
#[cfg(test)]
pub use image_source::MockImageSource;
pub use image_source::{FixtureImageSource, ImageSource, ImageSourceError};
