//! Property tests for the filter/sort/paginate engine
//!
//! Tests cover:
//! - `count` equals the number of matches regardless of pagination
//! - Page length is `min(limit, count - offset)`
//! - Sorted pages are monotone and ties keep insertion order

use dex_state_cache::error::StateResult;
use dex_state_cache::handlers::query::{run_query, SortField};
use dex_state_cache::handlers::{Pagination, SortOrder};
use proptest::prelude::*;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
struct Row {
    position: usize,
    volume: u32,
    active: bool,
}

#[derive(Debug, Clone, Copy)]
struct ByVolume;

impl SortField<Row> for ByVolume {
    fn sort_value(&self, row: &Row) -> StateResult<Decimal> {
        Ok(Decimal::from(row.volume))
    }
}

fn rows(volumes: &[(u32, bool)]) -> Vec<Row> {
    volumes
        .iter()
        .enumerate()
        .map(|(position, &(volume, active))| Row {
            position,
            volume,
            active,
        })
        .collect()
}

fn order_strategy() -> impl Strategy<Value = SortOrder> {
    prop_oneof![Just(SortOrder::Asc), Just(SortOrder::Desc)]
}

proptest! {
    /// Test that count ignores pagination and the page has the expected length
    #[test]
    fn test_count_and_page_length(
        volumes in prop::collection::vec((0u32..50, any::<bool>()), 0..40),
        offset in 0usize..50,
        limit in prop::option::of(0usize..20),
    ) {
        let table = rows(&volumes);
        let matches = table.iter().filter(|row| row.active).count();

        let page = run_query(
            table.iter(),
            |row: &Row| Ok(row.active),
            None::<(ByVolume, SortOrder)>,
            Pagination { offset, limit },
        )
        .unwrap();

        prop_assert_eq!(page.count, matches);
        let remaining = matches.saturating_sub(offset);
        let expected = limit.map_or(remaining, |limit| limit.min(remaining));
        prop_assert_eq!(page.items.len(), expected);
        prop_assert!(page.items.iter().all(|row| row.active));
    }

    /// Test that sorted output is monotone and stable for equal keys
    #[test]
    fn test_sort_monotone_and_stable(
        volumes in prop::collection::vec((0u32..5, Just(true)), 0..40),
        order in order_strategy(),
    ) {
        let table = rows(&volumes);
        let page = run_query(
            table.iter(),
            |_: &Row| Ok(true),
            Some((ByVolume, order)),
            Pagination::default(),
        )
        .unwrap();

        prop_assert_eq!(page.items.len(), table.len());
        for window in page.items.windows(2) {
            let (a, b) = (window[0], window[1]);
            match order {
                SortOrder::Asc => prop_assert!(a.volume <= b.volume),
                SortOrder::Desc => prop_assert!(a.volume >= b.volume),
            }
            if a.volume == b.volume {
                prop_assert!(a.position < b.position, "ties keep insertion order");
            }
        }
    }
}
