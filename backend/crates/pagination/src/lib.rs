//! Page-number pagination primitives shared by listing ports.
//!
//! [`PageRequest`] validates a caller's 1-based page number and page size,
//! while [`Page`] wraps one slice of results together with the totals callers
//! need to render navigation. Both types serialise with `camelCase` keys.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures raised by [`PageRequest::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Pages are numbered from 1.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// A validated request for one page of results.
///
/// # Examples
///
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(3, 20)?;
/// assert_eq!(request.offset(), 40);
/// # Ok::<(), pagination::PaginationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "PageRequestDto", into = "PageRequestDto")]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validate a 1-based page number and a non-zero page size.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroPage`] or
    /// [`PaginationError::ZeroPageSize`] when either value is zero.
    pub const fn new(page: u32, page_size: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self { page, page_size })
    }

    /// First page with the given size, falling back to one item per page for
    /// a zero size.
    #[must_use]
    pub const fn first(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: if page_size == 0 { 1 } else { page_size },
        }
    }

    /// Return a copy whose page size does not exceed `max_page_size`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let request = PageRequest::new(1, 500)?.clamped(100);
    /// assert_eq!(request.page_size(), 100);
    /// # Ok::<(), pagination::PaginationError>(())
    /// ```
    #[must_use]
    pub fn clamped(self, max_page_size: u32) -> Self {
        Self {
            page: self.page,
            page_size: self.page_size.min(max_page_size.max(1)),
        }
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)).saturating_mul(u64::from(self.page_size))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageRequestDto {
    page: u32,
    page_size: u32,
}

impl From<PageRequest> for PageRequestDto {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            page_size: value.page_size,
        }
    }
}

impl TryFrom<PageRequestDto> for PageRequest {
    type Error = PaginationError;

    fn try_from(value: PageRequestDto) -> Result<Self, Self::Error> {
        Self::new(value.page, value.page_size)
    }
}

/// One page of results plus navigation totals.
///
/// # Examples
///
/// ```
/// use pagination::{Page, PageRequest};
///
/// let request = PageRequest::new(2, 2)?;
/// let page = Page::new(vec!["c", "d"], request, 5);
/// assert_eq!(page.total_pages, 3);
/// assert!(!page.is_last());
/// # Ok::<(), pagination::PaginationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in listing order.
    pub items: Vec<T>,
    /// The 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Total matching items across all pages.
    pub total: u64,
    /// Number of pages needed to hold `total` items.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Build a page envelope for `items` fetched with `request`.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page(),
            page_size: request.page_size(),
            total,
            total_pages: total.div_ceil(u64::from(request.page_size())),
        }
    }

    /// Empty page for `request`.
    #[must_use]
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Convert every item while keeping the navigation totals.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }

    /// True when no later page exists.
    #[must_use]
    pub fn is_last(&self) -> bool {
        u64::from(self.page) >= self.total_pages
    }
}
