//! Keyed reservoir sampling.
//!
//! Every offered item gets a random key; the reservoir keeps the `k` items with
//! the largest keys in a min-heap, so the eviction candidate is always at the
//! root.
//!
//! - [`KeyStrategy::Uniform`]: key `u ~ Uniform[0, 1)`. Keeping the top-k of
//!   i.i.d. uniform keys gives every item inclusion probability `k / n`.
//! - [`KeyStrategy::Weighted`]: key `ln(u) / w` (A-Res). Weighted sampling
//!   without replacement in one pass.
//!
//! Both cost O(log k) per admitted item and O(k) memory.
//!
//! ## References
//!
//! - Efraimidis & Spirakis (2006): weighted random sampling with a reservoir (A-Res).
//!
//! Notes:
//! - The random source is owned by the reservoir and injected at construction,
//!   so a seeded RNG reproduces a sample exactly.
//! - Numerical limits are enforced by [`OverflowGuard`]; once it trips the
//!   reservoir is terminal.

use rand::Rng;
use tracing::{debug, trace, warn};

use crate::error::{validate_weight, OverflowCause, SamplingError};
use crate::guard::{OverflowGuard, RunningState};
use crate::heap::KeyHeap;
use crate::keyed::{KeyStrategy, KeyedItem};
use crate::stream::{Sample, StreamSampler, WeightedStreamSampler};

/// Lifecycle of a reservoir.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservoirState {
    /// Nothing retained yet.
    Empty,
    /// Holds fewer than `capacity` items.
    Filling,
    /// Holds `capacity` items; new items must beat the worst one.
    Full,
    /// The overflow guard tripped; every further offer fails.
    Overflowed,
}

/// Bounded reservoir ordered by random keys.
///
/// Not synchronized: share it across producers behind a single lock around
/// each offer.
#[derive(Debug)]
pub struct Reservoir<T, R> {
    heap: KeyHeap<T>,
    strategy: KeyStrategy,
    running: RunningState,
    guard: OverflowGuard,
    overflow: Option<OverflowCause>,
    rng: R,
}

impl<T, R: Rng> Reservoir<T, R> {
    /// Create a reservoir of at most `capacity` items.
    ///
    /// `capacity == 0` is allowed; such a reservoir counts offers and keeps nothing.
    pub fn new(capacity: usize, strategy: KeyStrategy, rng: R) -> Self {
        Self {
            heap: KeyHeap::new(capacity),
            strategy,
            running: RunningState::default(),
            guard: OverflowGuard::new(),
            overflow: None,
            rng,
        }
    }

    /// Uniform reservoir: every item has the same inclusion probability.
    pub fn uniform(capacity: usize, rng: R) -> Self {
        Self::new(capacity, KeyStrategy::Uniform, rng)
    }

    /// Weighted reservoir (A-Res).
    pub fn weighted(capacity: usize, rng: R) -> Self {
        Self::new(capacity, KeyStrategy::Weighted, rng)
    }

    /// Replace the default overflow guard, e.g. to match an RNG whose draws
    /// are coarser than `rand`'s `f64` grid.
    pub fn with_guard(mut self, guard: OverflowGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Offer an item with unit weight.
    #[inline]
    pub fn offer(&mut self, item: T) -> Result<bool, SamplingError> {
        self.offer_weighted(item, 1.0)
    }

    /// Offer an item with an explicit weight.
    ///
    /// A uniform reservoir only accepts a weight of exactly `1.0`.
    ///
    /// # Errors
    ///
    /// - [`SamplingError::InvalidWeight`] for a non-finite or non-positive weight;
    ///   the reservoir is left untouched.
    /// - [`SamplingError::StreamOverflow`] when the overflow guard trips, or
    ///   tripped on an earlier call.
    pub fn offer_weighted(&mut self, item: T, weight: f64) -> Result<bool, SamplingError> {
        if let Some(cause) = self.overflow {
            trace!(%cause, "offer rejected by overflowed reservoir");
            return Err(SamplingError::StreamOverflow(cause));
        }

        let weight = validate_weight(weight)?;
        if self.strategy == KeyStrategy::Uniform && weight != 1.0 {
            return Err(SamplingError::InvalidWeight {
                weight,
                reason: "uniform reservoir only accepts unit weight",
            });
        }

        let threshold = if self.heap.is_full() {
            self.heap.peek_min().map(KeyedItem::score)
        } else {
            None
        };
        let next = match self
            .guard
            .check_admission(&self.running, self.strategy, weight, threshold)
        {
            Ok(next) => next,
            Err(cause) => return Err(self.trip(cause, weight)),
        };

        if self.heap.capacity() == 0 {
            self.running = next;
            return Ok(false);
        }

        let u: f64 = self.rng.random();
        let mut score = self.strategy.key(u, weight);
        if self.strategy == KeyStrategy::Weighted {
            score = match self.guard.check_key(score) {
                Ok(score) => score,
                Err(cause) => return Err(self.trip(cause, weight)),
            };
        }

        self.running = next;
        let was_full = self.heap.is_full();
        let admitted = self.heap.offer(KeyedItem::new(item, score));
        if !was_full && self.heap.is_full() {
            debug!(
                capacity = self.heap.capacity(),
                seen = self.running.seen,
                "reservoir full"
            );
        }
        Ok(admitted)
    }

    fn trip(&mut self, cause: OverflowCause, weight: f64) -> SamplingError {
        warn!(
            %cause,
            weight,
            seen = self.running.seen,
            total_weight = self.running.total_weight,
            strategy = ?self.strategy,
            "reservoir overflowed; sample is frozen"
        );
        self.overflow = Some(cause);
        SamplingError::StreamOverflow(cause)
    }
}

impl<T, R> Reservoir<T, R> {
    /// Current occupancy, `0..=capacity`.
    pub fn size(&self) -> usize {
        self.heap.len()
    }

    /// Maximum number of retained items.
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }

    /// True while nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.heap.len() == 0
    }

    /// The overflow guard in use.
    pub fn guard(&self) -> &OverflowGuard {
        &self.guard
    }

    /// Items offered successfully so far (rejected-by-error offers excluded).
    pub fn seen(&self) -> u64 {
        self.running.seen
    }

    /// Sum of the weights of all successfully offered items.
    pub fn total_weight(&self) -> f64 {
        self.running.total_weight
    }

    /// How this reservoir draws keys.
    pub fn strategy(&self) -> KeyStrategy {
        self.strategy
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReservoirState {
        if self.overflow.is_some() {
            ReservoirState::Overflowed
        } else if self.heap.len() == 0 {
            ReservoirState::Empty
        } else if self.heap.is_full() {
            ReservoirState::Full
        } else {
            ReservoirState::Filling
        }
    }

    /// Whether the overflow guard has tripped.
    pub fn is_overflowed(&self) -> bool {
        self.overflow.is_some()
    }

    /// What tripped the overflow guard, if anything did.
    pub fn overflow_cause(&self) -> Option<OverflowCause> {
        self.overflow
    }

    /// Worst retained score: the key a new item has to beat once full.
    pub fn threshold(&self) -> Option<f64> {
        self.heap.peek_min().map(KeyedItem::score)
    }

    /// Retained items with their keys, in heap order.
    pub fn keyed_items(&self) -> impl Iterator<Item = &KeyedItem<T>> {
        self.heap.iter()
    }

    /// Retained items, in heap order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.heap.iter().map(KeyedItem::item)
    }

    /// Snapshot of the current contents; the reservoir keeps sampling.
    pub fn drain(&self) -> Sample<T>
    where
        T: Clone,
    {
        Sample::new(self.items().cloned().collect(), self.is_overflowed())
    }

    /// Consume the reservoir and return its contents.
    pub fn into_sample(self) -> Sample<T> {
        let degraded = self.is_overflowed();
        Sample::new(self.heap.into_items(), degraded)
    }
}

impl<T, R: Rng> StreamSampler<T> for Reservoir<T, R> {
    fn offer(&mut self, item: T) -> Result<bool, SamplingError> {
        Reservoir::offer(self, item)
    }

    fn size(&self) -> usize {
        Reservoir::size(self)
    }

    fn capacity(&self) -> usize {
        Reservoir::capacity(self)
    }

    fn seen(&self) -> u64 {
        Reservoir::seen(self)
    }

    fn drain(&self) -> Sample<T>
    where
        T: Clone,
    {
        Reservoir::drain(self)
    }
}

impl<T, R: Rng> WeightedStreamSampler<T> for Reservoir<T, R> {
    fn offer_weighted(&mut self, item: T, weight: f64) -> Result<bool, SamplingError> {
        Reservoir::offer_weighted(self, item, weight)
    }
}
