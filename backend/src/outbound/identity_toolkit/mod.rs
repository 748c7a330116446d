//! Identity Toolkit REST auth provider adapter.

mod dto;
mod http_provider;

pub use http_provider::{DEFAULT_IDENTITY_TOOLKIT_URL, IdentityToolkitProvider};
