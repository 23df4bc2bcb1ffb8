//! Property-based tests using proptest
//!
//! These tests verify filtering, pagination and slug derivation over
//! randomized collections and inputs.

use proptest::prelude::*;
use std::collections::BTreeMap;
use tshop::entity::{Record, Tag};
use tshop::form::slugify;
use tshop::resource::{
    apply_filters, get_resource, page_count, paginate, FilterState, PageResetPolicy,
};

/// Generate an arbitrary tag
fn arb_tag() -> impl Strategy<Value = Tag> {
    (
        "[a-z0-9]{1,8}",                      // id
        "[A-Za-z][A-Za-z0-9 ]{0,20}",         // name
        prop::option::of("[a-z ]{0,30}"),     // description
        any::<bool>(),                        // active
    )
        .prop_map(|(id, name, description, active)| Tag {
            id,
            slug: slugify(&name),
            name,
            description,
            active,
            created_at: None,
        })
}

/// Generate a list of tags
fn arb_tag_list() -> impl Strategy<Value = Vec<Tag>> {
    prop::collection::vec(arb_tag(), 0..100)
}

/// Generate filter state that only uses fields tags have
fn arb_filter() -> impl Strategy<Value = FilterState> {
    (
        "[a-z ]{0,4}",
        prop::option::of(prop_oneof![Just("active"), Just("inactive")]),
        prop::option::of("[a-z0-9]{1,8}"),
    )
        .prop_map(|(search, status, id)| {
            let mut selections = BTreeMap::new();
            if let Some(id) = id {
                selections.insert("id".to_string(), id);
            }
            FilterState {
                search,
                selections,
                status: status.map(str::to_string),
                date: None,
            }
        })
}

fn filter(items: &[Tag], state: &FilterState) -> Vec<Tag> {
    let def = get_resource(Tag::KEY).expect("tags are registered");
    apply_filters(items, &state.predicates(def))
}

mod filter_tests {
    use super::*;

    proptest! {
        /// Filtering an already-filtered list changes nothing
        #[test]
        fn test_filter_idempotent(items in arb_tag_list(), state in arb_filter()) {
            let once = filter(&items, &state);
            let twice = filter(&once, &state);
            prop_assert_eq!(once, twice);
        }

        /// Filtered output is an order-preserving subsequence of the input
        #[test]
        fn test_filter_preserves_order(items in arb_tag_list(), state in arb_filter()) {
            let result = filter(&items, &state);
            let mut source = items.iter();
            for item in &result {
                prop_assert!(source.any(|candidate| candidate == item));
            }
        }

        /// An empty filter state keeps every record
        #[test]
        fn test_empty_filter_returns_all(items in arb_tag_list()) {
            let result = filter(&items, &FilterState::default());
            prop_assert_eq!(result.len(), items.len());
        }

        /// Status filtering agrees with the record's flag
        #[test]
        fn test_status_filter_matches_flag(items in arb_tag_list(), active in any::<bool>()) {
            let state = FilterState {
                status: Some(if active { "active" } else { "inactive" }.to_string()),
                ..Default::default()
            };
            let result = filter(&items, &state);
            prop_assert!(result.iter().all(|t| t.active == active));
            prop_assert_eq!(
                result.len(),
                items.iter().filter(|t| t.active == active).count()
            );
        }

        /// Search is case-insensitive
        #[test]
        fn test_search_case_insensitive(items in arb_tag_list(), needle in "[a-z]{1,3}") {
            let lower = FilterState { search: needle.clone(), ..Default::default() };
            let upper = FilterState { search: needle.to_uppercase(), ..Default::default() };
            prop_assert_eq!(filter(&items, &lower), filter(&items, &upper));
        }
    }
}

mod pagination_tests {
    use super::*;

    proptest! {
        /// Concatenating every page reproduces the collection exactly
        #[test]
        fn test_pages_partition_items(items in prop::collection::vec(any::<u32>(), 0..200), size in 1usize..25) {
            let pages = page_count(items.len(), size);
            let mut joined = Vec::new();
            for page in 1..=pages {
                let slice = paginate(&items, page, size);
                prop_assert!(!slice.is_empty());
                prop_assert!(slice.len() <= size);
                joined.extend_from_slice(slice);
            }
            prop_assert_eq!(joined, items.clone());
            prop_assert!(paginate(&items, pages + 1, size).is_empty());
        }

        /// Preserve keeps the page in range; Reset always goes to page 1
        #[test]
        fn test_page_reset_policy(current in 0usize..50, pages in 0usize..50) {
            let preserved = PageResetPolicy::Preserve.next_page(current, pages);
            prop_assert!(preserved >= 1);
            prop_assert!(preserved <= pages.max(1));
            prop_assert_eq!(PageResetPolicy::Reset.next_page(current, pages), 1);
        }
    }
}

mod slug_tests {
    use super::*;
    use regex::Regex;

    proptest! {
        /// Slugs are lowercase ASCII words joined by single dashes
        #[test]
        fn test_slug_charset(input in "\\PC{0,40}") {
            let slug = slugify(&input);
            let pattern = Regex::new("^[a-z0-9]+(-[a-z0-9]+)*$|^$").unwrap();
            prop_assert!(pattern.is_match(&slug), "bad slug {:?} from {:?}", slug, input);
        }

        /// Slugifying a slug returns it unchanged
        #[test]
        fn test_slug_idempotent(input in "\\PC{0,40}") {
            let once = slugify(&input);
            prop_assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn test_slug_example() {
        assert_eq!(slugify("New Arrival!! 2024"), "new-arrival-2024");
    }
}
