//! DTOs for decoding image provider responses.
//!
//! The latest-photos endpoint returns a bare array while search wraps the
//! array in `{ "results": [...] }`; both decode through [`PhotoPageDto`].

use serde::Deserialize;

use crate::domain::FeedImage;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum PhotoPageDto {
    Bare(Vec<PhotoDto>),
    Search { results: Vec<PhotoDto> },
}

#[derive(Debug, Deserialize)]
pub(super) struct PhotoDto {
    pub(super) id: String,
    pub(super) urls: PhotoUrlsDto,
    #[serde(default)]
    pub(super) alt_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PhotoUrlsDto {
    pub(super) small: String,
    pub(super) full: String,
}

impl PhotoPageDto {
    pub(super) fn into_feed_images(self) -> Vec<FeedImage> {
        let photos = match self {
            Self::Bare(photos) => photos,
            Self::Search { results } => results,
        };
        photos.into_iter().map(PhotoDto::into_feed_image).collect()
    }
}

impl PhotoDto {
    fn into_feed_image(self) -> FeedImage {
        FeedImage::new(self.id, self.urls.small, self.urls.full, self.alt_description)
    }
}
