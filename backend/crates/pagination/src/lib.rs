//! Page-number pagination primitives.
//!
//! Pinboard pages through external image providers with simple incrementing
//! page numbers rather than opaque cursors. This crate keeps the numeric
//! invariants (pages start at one, sizes are bounded) in one place so the
//! feed state machine and the outbound HTTP adapters agree on them.
//!
//! # Examples
//!
//! ```
//! use pagination::{PageNumber, PageRequest, PageSize};
//! use url::Url;
//!
//! let request = PageRequest::new(PageNumber::FIRST, PageSize::default());
//! let mut url = Url::parse("https://api.example.test/photos").expect("valid url");
//! request.append_to(&mut url);
//! assert_eq!(url.query(), Some("page=1&per_page=10"));
//! ```

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use url::Url;

/// Largest page size accepted by upstream image providers.
pub const MAX_PAGE_SIZE: u8 = 30;

/// Page size used when callers do not choose one.
pub const DEFAULT_PAGE_SIZE: u8 = 10;

/// Errors raised when constructing pagination values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// Page numbers are one-based; zero is rejected.
    #[error("page number must be at least 1")]
    ZeroPage,
    /// Page size fell outside `1..=MAX_PAGE_SIZE`.
    #[error("page size must be between 1 and {max}, got {actual}")]
    PageSizeOutOfRange {
        /// Value supplied by the caller.
        actual: u32,
        /// Inclusive upper bound.
        max: u8,
    },
}

/// One-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageNumber(NonZeroU32);

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Validate and construct a page number.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroPage`] for `0`.
    pub fn new(page: u32) -> Result<Self, PaginationError> {
        NonZeroU32::new(page)
            .map(Self)
            .ok_or(PaginationError::ZeroPage)
    }

    /// Raw page number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// The following page, or `None` once the counter would overflow.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Whether this is the first page.
    #[must_use]
    pub const fn is_first(self) -> bool {
        self.0.get() == 1
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for PageNumber {
    type Error = PaginationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageNumber> for u32 {
    fn from(value: PageNumber) -> Self {
        value.get()
    }
}

/// Number of items requested per page, bounded by [`MAX_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(u8);

impl PageSize {
    /// Validate and construct a page size.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::PageSizeOutOfRange`] when `size` is zero or
    /// larger than [`MAX_PAGE_SIZE`].
    pub fn new(size: u32) -> Result<Self, PaginationError> {
        match u8::try_from(size) {
            Ok(value) if (1..=MAX_PAGE_SIZE).contains(&value) => Ok(Self(value)),
            _ => Err(PaginationError::PageSizeOutOfRange {
                actual: size,
                max: MAX_PAGE_SIZE,
            }),
        }
    }

    /// Raw page size.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE)
    }
}

impl TryFrom<u32> for PageSize {
    type Error = PaginationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        Self::from(value.get())
    }
}

/// A single page request: which page, and how many items per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Requested page.
    pub page: PageNumber,
    /// Requested page size.
    pub size: PageSize,
}

impl PageRequest {
    /// Build a request for `page` with `size` items.
    #[must_use]
    pub const fn new(page: PageNumber, size: PageSize) -> Self {
        Self { page, size }
    }

    /// Request for the first page with the given size.
    #[must_use]
    pub const fn first(size: PageSize) -> Self {
        Self::new(PageNumber::FIRST, size)
    }

    /// Request for the following page, keeping the size.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.page.next().map(|page| Self::new(page, self.size))
    }

    /// Append `page` and `per_page` query parameters to `url`.
    pub fn append_to(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair("page", &self.page.to_string())
            .append_pair("per_page", &self.size.get().to_string());
    }
}
