//! Pagination value object.

/// Zero-based page of the remote pet list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageRequest {
    page: u32,
}

impl PageRequest {
    /// Number of records in one page.
    pub const PAGE_SIZE: u32 = 20;

    /// Creates a request for `page`.
    #[must_use]
    pub const fn new(page: u32) -> Self {
        Self { page }
    }

    /// Page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Records per page.
    #[must_use]
    pub const fn size(self) -> u32 {
        Self::PAGE_SIZE
    }

    /// Number of records preceding this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        Self::PAGE_SIZE as u64 * self.page as u64
    }

    /// The following page.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::new(self.page.saturating_add(1))
    }
}

impl std::fmt::Display for PageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {}", self.page)
    }
}
