//! Shared WebSocket adapter state.
//!
//! The feed socket depends on the image source port only, so tests can drive
//! it with the fixture source or a mock.

use std::sync::Arc;

use pagination::PageSize;

use crate::domain::ports::ImageSource;

/// Dependency bundle for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub images: Arc<dyn ImageSource>,
    pub page_size: PageSize,
}

impl WsState {
    /// Construct state from explicit port implementations.
    pub fn new(images: Arc<dyn ImageSource>, page_size: PageSize) -> Self {
        Self { images, page_size }
    }
}
