use kura::{
    ClassicReservoir, KeyedItem, Reservoir, SamplingError, SkipReservoir, StreamSampler,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;

proptest! {
    #[test]
    fn prop_keyed_uniform_size_invariant(
        k in 0usize..20,
        items in prop::collection::vec(0u32..1000, 0..50),
        seed in any::<u64>(),
    ) {
        let mut s = Reservoir::uniform(k, ChaCha8Rng::seed_from_u64(seed));
        for (n, &item) in items.iter().enumerate() {
            s.offer(item).expect("unit weight");
            prop_assert!(s.size() <= k);
            prop_assert_eq!(s.size(), std::cmp::min(n + 1, k));
        }

        prop_assert_eq!(s.size(), std::cmp::min(items.len(), k));
        prop_assert_eq!(s.seen(), items.len() as u64);
    }

    #[test]
    fn prop_keyed_weighted_size_invariant(
        k in 0usize..20,
        items in prop::collection::vec((0u32..1000, 1e-3f64..1e3), 0..50),
        seed in any::<u64>(),
    ) {
        let mut s = Reservoir::weighted(k, ChaCha8Rng::seed_from_u64(seed));
        for &(item, w) in &items {
            s.offer_weighted(item, w).expect("weight ok");
        }

        let total: f64 = items.iter().map(|&(_, w)| w).sum();
        prop_assert_eq!(s.size(), std::cmp::min(items.len(), k));
        prop_assert_eq!(s.seen(), items.len() as u64);
        prop_assert!((s.total_weight() - total).abs() <= 1e-9 * total.max(1.0));
    }

    #[test]
    fn prop_skip_size_invariant(
        k in 0usize..20,
        items in prop::collection::vec(0u32..1000, 0..50)
    ) {
        let mut s = SkipReservoir::new(k, ChaCha8Rng::seed_from_u64(11));
        s.offer_all(items.iter().copied()).expect("no overflow");

        prop_assert_eq!(s.samples().len(), std::cmp::min(items.len(), k));
        prop_assert_eq!(s.seen(), items.len() as u64);
    }

    #[test]
    fn prop_classic_size_invariant(
        k in 0usize..20,
        items in prop::collection::vec(0u32..1000, 0..50)
    ) {
        let mut s = ClassicReservoir::new(k, ChaCha8Rng::seed_from_u64(12));
        s.offer_all(items.iter().copied()).expect("no overflow");

        prop_assert_eq!(s.samples().len(), std::cmp::min(items.len(), k));
        prop_assert_eq!(s.seen(), items.len() as u64);
    }
}

proptest! {
    #[test]
    fn prop_sample_is_subset_of_stream(
        k in 1usize..10,
        n in 0usize..60,
        seed in any::<u64>(),
    ) {
        let mut s = Reservoir::weighted(k, ChaCha8Rng::seed_from_u64(seed));
        for i in 0..n {
            s.offer_weighted(i, 1.0 + (i % 7) as f64).expect("weight ok");
        }
        let mut sample = s.drain().into_items();
        sample.sort_unstable();
        sample.dedup();
        prop_assert_eq!(sample.len(), std::cmp::min(n, k));
        prop_assert!(sample.iter().all(|&i| i < n));
    }

    #[test]
    fn prop_invalid_weight_is_a_no_op(
        prefix in prop::collection::vec(0.1f64..10.0, 0..10),
        bad in prop_oneof![
            Just(0.0f64),
            Just(-0.0f64),
            Just(f64::NAN),
            Just(f64::INFINITY),
            Just(f64::NEG_INFINITY),
            -1e6f64..-1e-9,
        ],
    ) {
        let mut s = Reservoir::weighted(4, ChaCha8Rng::seed_from_u64(5));
        for (i, &w) in prefix.iter().enumerate() {
            s.offer_weighted(i, w).expect("weight ok");
        }
        let before: Vec<u64> = s.keyed_items().map(KeyedItem::sequence).collect();
        let seen = s.seen();
        let total = s.total_weight();

        let err = s.offer_weighted(usize::MAX, bad).expect_err("rejected");
        let is_invalid_weight = matches!(err, SamplingError::InvalidWeight { .. });
        prop_assert!(is_invalid_weight);

        let after: Vec<u64> = s.keyed_items().map(KeyedItem::sequence).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(s.seen(), seen);
        prop_assert_eq!(s.total_weight(), total);
        prop_assert!(!s.is_overflowed());
    }

    #[test]
    fn prop_equal_scores_never_tie(
        score in prop::num::f64::ANY,
        payload in any::<u8>(),
    ) {
        let a = KeyedItem::new(payload, score);
        let b = KeyedItem::new(payload, score);
        prop_assert_ne!(a.cmp(&b), Ordering::Equal);
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        prop_assert_eq!(a.cmp(&a), Ordering::Equal);
    }
}
