/// Default storefront page size.
pub const DEFAULT_PAGE_SIZE: u64 = 4;

/// Upper bound on a single page.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Offset/limit window over an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub first: u64,
}

impl PageWindow {
    /// Build a window from optional, possibly negative GraphQL arguments.
    pub fn from_args(skip: Option<i32>, first: Option<i32>) -> Self {
        let skip = skip.map_or(0, |s| s.max(0) as u64);
        let first = first
            .map_or(DEFAULT_PAGE_SIZE, |f| f.max(1) as u64)
            .min(MAX_PAGE_SIZE);
        Self { skip, first }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            skip: 0,
            first: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_storefront_page() {
        assert_eq!(
            PageWindow::from_args(None, None),
            PageWindow { skip: 0, first: 4 }
        );
    }

    #[test]
    fn clamps_out_of_range_arguments() {
        assert_eq!(
            PageWindow::from_args(Some(-3), Some(0)),
            PageWindow { skip: 0, first: 1 }
        );
        assert_eq!(PageWindow::from_args(Some(8), Some(500)).first, MAX_PAGE_SIZE);
    }
}
