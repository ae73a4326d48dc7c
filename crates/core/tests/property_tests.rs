//! Property tests for the paging and aggregation invariants.

use proptest::prelude::*;
use serde_json::json;
use sigdash_core::aggregate::{aggregate_sectors, top_picks, type_distribution};
use sigdash_core::domain::signal::Signal;
use sigdash_core::paging::{compute_page_window, PageItem, Pager};

// ── Strategies ───────────────────────────────────────────────────────

fn arb_signal() -> impl Strategy<Value = Signal> {
    (
        "[A-Z]{2,5}",
        prop::sample::select(vec!["IT", "ENERGY", "HEALTHCARE", "MATERIALS"]),
        prop::sample::select(vec!["BUY", "HOLD", "SELL"]),
        -50.0..50.0_f64,
        -20.0..20.0_f64,
    )
        .prop_map(|(symbol, sector, signal_type, yoy, mom)| {
            serde_json::from_value(json!({
                "symbol": symbol,
                "sector": sector,
                "signalType": signal_type,
                "yoyGrowth": yoy,
                "momGrowth": mom,
                "expectedReturn": yoy / 2.0,
                "confidenceScore": 50,
            }))
            .expect("generated signal is valid")
        })
}

fn pages(window: &[PageItem]) -> Vec<u32> {
    window
        .iter()
        .filter_map(|item| match item {
            PageItem::Page(p) => Some(*p),
            PageItem::Ellipsis => None,
        })
        .collect()
}

// ── Page window ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn window_is_anchored_on_first_and_last(total in 1u32..500, seed in any::<u32>()) {
        let current = seed % total + 1;
        let window = compute_page_window(current, total);

        prop_assert_eq!(window.first(), Some(&PageItem::Page(1)));
        prop_assert_eq!(window.last(), Some(&PageItem::Page(total)));
        prop_assert!(window.len() <= 7);
        prop_assert!(pages(&window).contains(&current));

        let ellipses = window.iter().filter(|i| **i == PageItem::Ellipsis).count();
        prop_assert!(ellipses <= 2);
        if total <= 7 {
            prop_assert_eq!(ellipses, 0);
        }
    }

    #[test]
    fn window_pages_strictly_increase(total in 1u32..500, seed in any::<u32>()) {
        let current = seed % total + 1;
        let listed = pages(&compute_page_window(current, total));
        prop_assert!(listed.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn pager_never_leaves_bounds(total_items in 0u64..200, moves in prop::collection::vec(any::<bool>(), 0..40)) {
        let mut pager = Pager::new(10);
        pager.set_total_items(total_items);
        for forward in moves {
            if forward { pager.next(); } else { pager.prev(); }
            prop_assert!(pager.current() >= 1);
            prop_assert!(pager.current() <= pager.total_pages().max(1));
        }
    }
}

// ── Aggregation ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn distribution_accounts_for_every_signal(signals in prop::collection::vec(arb_signal(), 0..40)) {
        let d = type_distribution(&signals);
        prop_assert_eq!(d.total, signals.len());
        if signals.is_empty() {
            prop_assert!(d.is_empty());
        } else {
            let counted: usize = d.buckets.iter().map(|b| b.count).sum();
            prop_assert_eq!(counted, signals.len());
            let percent: f64 = d.buckets.iter().map(|b| b.percent).sum();
            prop_assert!((percent - 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn sector_counts_sum_to_total(signals in prop::collection::vec(arb_signal(), 0..40)) {
        let sectors = aggregate_sectors(&signals);
        let counted: u64 = sectors.iter().map(|s| s.signal_count).sum();
        prop_assert_eq!(counted, signals.len() as u64);

        let mut seen = std::collections::HashSet::new();
        prop_assert!(sectors.iter().all(|s| seen.insert(s.sector.clone())));
    }

    #[test]
    fn top_picks_preserve_source_order(signals in prop::collection::vec(arb_signal(), 0..20), n in 0usize..10) {
        let picks = top_picks(&signals, n);
        prop_assert_eq!(picks.len(), n.min(signals.len()));
        for (idx, pick) in picks.iter().enumerate() {
            prop_assert_eq!(pick.rank, idx + 1);
            prop_assert_eq!(&pick.signal, &signals[idx]);
        }
    }
}
