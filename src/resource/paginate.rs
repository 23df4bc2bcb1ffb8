//! Fixed-size, 1-indexed pagination over the filtered collection

use serde::{Deserialize, Serialize};

/// Number of pages needed for `len` items (0 for an empty collection)
pub fn page_count(len: usize, size: usize) -> usize {
    len.div_ceil(size.max(1))
}

/// Slice `[(page-1)*size, page*size)` clamped to the bounds of `items`.
///
/// Page 0 is treated as page 1; pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, size: usize) -> &[T] {
    let size = size.max(1);
    let page = page.max(1);
    let start = (page - 1).saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// What happens to the current page when a filter changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageResetPolicy {
    /// Jump back to page 1
    #[default]
    Reset,
    /// Keep the page, clamped to the new page count
    Preserve,
}

impl PageResetPolicy {
    /// Page to show after a filter change, given the new page count
    pub fn next_page(self, current: usize, pages: usize) -> usize {
        match self {
            PageResetPolicy::Reset => 1,
            PageResetPolicy::Preserve => current.clamp(1, pages.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(5, 0), 5);
    }

    #[test]
    fn test_paginate_bounds() {
        let items: Vec<u32> = (1..=23).collect();
        assert_eq!(paginate(&items, 1, 10), &items[0..10]);
        assert_eq!(paginate(&items, 3, 10), &[21, 22, 23]);
        assert!(paginate(&items, 4, 10).is_empty());
        assert_eq!(paginate(&items, 0, 10), paginate(&items, 1, 10));
        assert!(paginate::<u32>(&[], 1, 10).is_empty());
    }

    #[test]
    fn test_reset_policy() {
        assert_eq!(PageResetPolicy::Reset.next_page(4, 9), 1);
        assert_eq!(PageResetPolicy::Preserve.next_page(4, 9), 4);
        assert_eq!(PageResetPolicy::Preserve.next_page(4, 2), 2);
        assert_eq!(PageResetPolicy::Preserve.next_page(4, 0), 1);
    }

    #[test]
    fn test_policy_serde() {
        let policy: PageResetPolicy = serde_json::from_str("\"preserve\"").unwrap();
        assert_eq!(policy, PageResetPolicy::Preserve);
        assert_eq!(serde_json::to_string(&PageResetPolicy::Reset).unwrap(), "\"reset\"");
    }
}
