// Pagination Arithmetic
//
// Page sizes come from a fixed set. Pages are 1-based; positions are
// 0-based and inclusive on both ends.

use serde::{Deserialize, Serialize};

/// Page sizes a leaderboard may be configured with.
pub const ALLOWED_PAGE_SIZES: [u64; 4] = [10, 25, 50, 100];

pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// A page size known to be in `ALLOWED_PAGE_SIZES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PageSize(u64);

impl PageSize {
    /// Validate `size` against the allowed set.
    pub fn new(size: u64) -> Option<Self> {
        ALLOWED_PAGE_SIZES.contains(&size).then_some(Self(size))
    }

    /// Validate `size`, falling back to the default when it is not allowed.
    pub fn or_default(size: u64) -> Self {
        Self::new(size).unwrap_or_default()
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE)
    }
}

impl TryFrom<u64> for PageSize {
    type Error = String;

    fn try_from(size: u64) -> Result<Self, Self::Error> {
        Self::new(size).ok_or_else(|| {
            format!("page size {size} is not one of {ALLOWED_PAGE_SIZES:?}")
        })
    }
}

impl From<PageSize> for u64 {
    fn from(size: PageSize) -> Self {
        size.0
    }
}

/// Number of pages needed to show `members`. Zero members means zero pages.
pub fn total_pages(members: u64, size: PageSize) -> u64 {
    members.div_ceil(size.get())
}

/// Clamp a requested page into `1..=pages`. `None` when there are no pages.
pub fn clamp_page(page: i64, pages: u64) -> Option<u64> {
    if pages == 0 {
        return None;
    }
    let page = u64::try_from(page).unwrap_or(0);
    Some(page.clamp(1, pages))
}

/// Inclusive 0-based position range covered by a 1-based `page`.
pub fn page_bounds(page: u64, size: PageSize) -> (u64, u64) {
    let start = page.saturating_sub(1).saturating_mul(size.get());
    let stop = start.saturating_add(size.get() - 1);
    (start, stop)
}
