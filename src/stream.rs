//! The streaming contract shared by every sampler, and the materialized sample.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SamplingError;

/// Contents of a reservoir at some point in the stream, in no particular order.
///
/// `degraded` is set when the sampler had already overflowed: the items are
/// what it held, but they are no longer guaranteed to be an unbiased sample of
/// the stream that was fed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample<T> {
    items: Vec<T>,
    degraded: bool,
}

impl<T> Sample<T> {
    pub(crate) fn new(items: Vec<T>, degraded: bool) -> Self {
        Self { items, degraded }
    }

    /// Number of sampled items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing was sampled.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the sample was computed under degraded precision.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The sampled items as a slice.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Iterate over the sampled items.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Take the sampled items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> IntoIterator for Sample<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Sample<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Single-pass sampler over a stream of unknown length.
///
/// `offer` returns `Ok(true)` when the item entered the reservoir and
/// `Ok(false)` when it lost to the current contents. Errors never admit.
pub trait StreamSampler<T> {
    /// Offer the next item of the stream.
    fn offer(&mut self, item: T) -> Result<bool, SamplingError>;

    /// Offer every item in order, stopping at the first error.
    ///
    /// Returns how many items were admitted (an admitted item may have been
    /// evicted again by a later one).
    fn offer_all<I>(&mut self, items: I) -> Result<usize, SamplingError>
    where
        I: IntoIterator<Item = T>,
        Self: Sized,
    {
        let mut admitted = 0;
        for item in items {
            if self.offer(item)? {
                admitted += 1;
            }
        }
        Ok(admitted)
    }

    /// Current reservoir occupancy, at most [`capacity`](Self::capacity).
    fn size(&self) -> usize;

    /// Maximum number of retained items.
    fn capacity(&self) -> usize;

    /// Items offered successfully so far.
    fn seen(&self) -> u64;

    /// True while nothing is retained.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Copy of the current contents. The sampler keeps going.
    fn drain(&self) -> Sample<T>
    where
        T: Clone;
}

/// A sampler whose items carry positive weights.
pub trait WeightedStreamSampler<T>: StreamSampler<T> {
    /// Offer the next item with a positive, finite weight.
    fn offer_weighted(&mut self, item: T, weight: f64) -> Result<bool, SamplingError>;

    /// Weighted counterpart of [`StreamSampler::offer_all`].
    fn offer_weighted_all<I>(&mut self, items: I) -> Result<usize, SamplingError>
    where
        I: IntoIterator<Item = (T, f64)>,
        Self: Sized,
    {
        let mut admitted = 0;
        for (item, weight) in items {
            if self.offer_weighted(item, weight)? {
                admitted += 1;
            }
        }
        Ok(admitted)
    }
}
