//! Offset/limit translation shared by the rating listing and review ledgers.

use serde::Deserialize;

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageQuery {
    /// Zero-based inclusive `[start, end]` range for the store's rank
    /// queries. Values below 1 are treated as 1. No upper bound is applied:
    /// a page past the end comes back from the store as an empty slice, not
    /// an error. The arithmetic saturates, so extreme inputs stay a far
    /// positive range instead of wrapping into one that aliases page 1.
    pub fn to_range(self) -> (isize, isize) {
        let page = self.page.max(1) as isize;
        let size = self.page_size.max(1) as isize;
        let start = (page - 1).saturating_mul(size);
        (start, start.saturating_add(size - 1))
    }
}
