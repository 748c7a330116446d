//! Image provider outbound adapters.
//!
//! A thin HTTP implementation of the `ImageSource` port for Unsplash-style
//! photo APIs.

mod dto;
mod http_source;

pub use http_source::UnsplashHttpSource;
