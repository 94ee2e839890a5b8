//! Pagination primitives shared by carmarket list endpoints.
//!
//! REST listings take a one-based `page` and a bounded `limit`; RPC clients
//! that scroll through results receive the next page as an opaque cursor
//! instead. Both forms resolve to the same [`PageRequest`], so repositories
//! only ever see an offset and a limit.
//!
//! ```
//! use pagination::{Cursor, Page, PageRequest};
//!
//! let request = PageRequest::new(1, 2).expect("valid page");
//! let page = Page::new(vec!["a", "b"], request, 5);
//! assert_eq!(page.meta().total_pages(), 3);
//!
//! let cursor = page.next_cursor().expect("more pages");
//! let decoded = Cursor::decode(&cursor.encode()).expect("round trip");
//! assert_eq!(decoded.request().page(), 2);
//! ```

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Errors raised while validating pagination input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// Page numbers start at one.
    #[error("page must be at least 1")]
    PageOutOfRange,
    /// The limit fell outside `1..=max`.
    #[error("limit must be between 1 and {max}")]
    LimitOutOfRange {
        /// Largest accepted limit.
        max: u32,
    },
    /// A cursor could not be decoded.
    #[error("cursor is malformed")]
    MalformedCursor,
}

/// Validated one-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate a page number and limit.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::PageOutOfRange`] for page zero and
    /// [`PaginationError::LimitOutOfRange`] when `limit` is zero or above
    /// [`MAX_LIMIT`].
    pub const fn new(page: u32, limit: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::PageOutOfRange);
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PaginationError::LimitOutOfRange { max: MAX_LIMIT });
        }
        Ok(Self { page, limit })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip before this page starts.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Request for the page after this one, saturating at `u32::MAX`.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            limit: self.limit,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Summary of where a page sits within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    total: u64,
    page: u32,
    limit: u32,
    total_pages: u32,
}

impl PageMeta {
    fn new(request: PageRequest, total: u64) -> Self {
        let pages = total.div_ceil(u64::from(request.limit()));
        Self {
            total,
            page: request.page(),
            limit: request.limit(),
            total_pages: u32::try_from(pages).unwrap_or(u32::MAX),
        }
    }

    /// Total number of matching items across every page.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// One-based number of this page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size used for the query.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of pages needed to cover `total`.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }
}

/// One page of results plus its position metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    items: Vec<T>,
    meta: PageMeta,
}

impl<T> Page<T> {
    /// Wrap `items` fetched for `request` out of `total` matches.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            meta: PageMeta::new(request, total),
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Position metadata.
    #[must_use]
    pub const fn meta(&self) -> &PageMeta {
        &self.meta
    }

    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.meta.page < self.meta.total_pages
    }

    /// Cursor addressing the following page, if any.
    #[must_use]
    pub fn next_cursor(&self) -> Option<Cursor> {
        if !self.has_next_page() {
            return None;
        }
        PageRequest::new(self.meta.page, self.meta.limit)
            .ok()
            .map(|request| Cursor(request.next()))
    }

    /// Transform every item while keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Opaque continuation token wrapping a [`PageRequest`].
///
/// Encoded as unpadded URL-safe base64 so it can travel in query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor(PageRequest);

#[derive(Serialize, Deserialize)]
struct CursorPayload {
    p: u32,
    l: u32,
}

impl Cursor {
    /// Cursor pointing at `request`.
    #[must_use]
    pub const fn new(request: PageRequest) -> Self {
        Self(request)
    }

    /// The page this cursor addresses.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.0
    }

    /// Render the cursor as an opaque string.
    #[must_use]
    pub fn encode(&self) -> String {
        let payload = serde_json::json!({ "p": self.0.page(), "l": self.0.limit() });
        URL_SAFE_NO_PAD.encode(payload.to_string())
    }

    /// Parse a cursor previously produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::MalformedCursor`] when the token is not
    /// valid base64 JSON, or the page validation error when it decodes to an
    /// out-of-range page.
    pub fn decode(raw: &str) -> Result<Self, PaginationError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw.trim())
            .map_err(|_| PaginationError::MalformedCursor)?;
        let payload: CursorPayload =
            serde_json::from_slice(&bytes).map_err(|_| PaginationError::MalformedCursor)?;
        PageRequest::new(payload.p, payload.l).map(Self)
    }
}
