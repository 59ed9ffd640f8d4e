//! Keyed items and key strategies.
//!
//! A [`KeyedItem`] pairs a caller item with a random score. Scores alone are not
//! enough to order a reservoir: two draws can tie, and a heap that cannot tell
//! two entries apart has no well-defined minimum. Every keyed item therefore
//! carries a sequence number taken from a process-wide counter, and the order is
//! (score, sequence). Two distinct keyed items never compare equal.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// An item together with the score that ranks it inside a reservoir.
///
/// Equality and hashing follow identity (the sequence number), not the payload:
/// two samples that carry equal items are still two samples. Not `Clone` for
/// the same reason.
#[derive(Debug)]
pub struct KeyedItem<T> {
    item: T,
    score: f64,
    seq: u64,
}

impl<T> KeyedItem<T> {
    /// Wrap `item` with `score`, assigning a fresh sequence number.
    pub fn new(item: T, score: f64) -> Self {
        Self {
            item,
            score,
            seq: NEXT_SEQUENCE.fetch_add(1, AtomicOrdering::Relaxed),
        }
    }

    /// The wrapped item.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// The key this item is ranked by.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Tie-break discriminator; strictly increasing in construction order.
    pub fn sequence(&self) -> u64 {
        self.seq
    }

    /// Unwrap the item, discarding its key.
    pub fn into_item(self) -> T {
        self.item
    }
}

impl<T> Ord for KeyedItem<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl<T> PartialOrd for KeyedItem<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for KeyedItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<T> Eq for KeyedItem<T> {}

impl<T> Hash for KeyedItem<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.seq.hash(state);
    }
}

/// How a uniform draw and a weight become a score. Larger scores are better.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum KeyStrategy {
    /// Score is the draw itself; every item has unit weight.
    #[default]
    Uniform,
    /// Efraimidis–Spirakis A-Res, kept in log space: `ln(u) / w`.
    ///
    /// This is the logarithm of `u^(1/w)`, so the order is the same, but it does
    /// not collapse to `0.0` for tiny weights the way the power form does.
    Weighted,
}

impl KeyStrategy {
    /// Score for a draw `u` in `[0, 1)` and a validated weight.
    #[inline]
    pub fn key(self, u: f64, weight: f64) -> f64 {
        match self {
            Self::Uniform => u,
            Self::Weighted => u.max(f64::MIN_POSITIVE).ln() / weight,
        }
    }

    /// Exact probability that an item of `weight` scores above `threshold`.
    pub fn admission_probability(self, weight: f64, threshold: f64) -> f64 {
        match self {
            Self::Uniform => 1.0 - threshold,
            // ln(u)/w > t  <=>  u > exp(w t)
            Self::Weighted => -(weight * threshold).exp_m1(),
        }
    }
}
