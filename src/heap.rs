//! Bounded min-heap of keyed items.
//!
//! The minimum is the worst retained item, i.e. the eviction candidate.
//! Replacement goes through `BinaryHeap::peek_mut`, which sifts the new root
//! down once instead of paying for a pop followed by a push.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::keyed::KeyedItem;

/// Most slots reserved up front. Larger reservoirs grow by admission, so a
/// huge `K` costs nothing until items actually arrive.
pub(crate) const INITIAL_RESERVE: usize = 1 << 16;

#[derive(Debug)]
pub(crate) struct KeyHeap<T> {
    heap: BinaryHeap<Reverse<KeyedItem<T>>>,
    capacity: usize,
}

impl<T> KeyHeap<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity.min(INITIAL_RESERVE)),
            capacity,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    pub(crate) fn peek_min(&self) -> Option<&KeyedItem<T>> {
        self.heap.peek().map(|Reverse(k)| k)
    }

    /// Swap out the minimum for `keyed`, returning the evicted entry.
    pub(crate) fn replace_min(&mut self, keyed: KeyedItem<T>) -> Option<KeyedItem<T>> {
        let mut top = self.heap.peek_mut()?;
        Some(std::mem::replace(&mut top.0, keyed))
    }

    /// Admit `keyed` if there is room or it beats the current minimum.
    pub(crate) fn offer(&mut self, keyed: KeyedItem<T>) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if !self.is_full() {
            self.heap.push(Reverse(keyed));
            return true;
        }
        let beats_min = self.peek_min().is_some_and(|min| keyed > *min);
        if beats_min {
            // Evicted entry is dropped here.
            self.replace_min(keyed);
        }
        beats_min
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &KeyedItem<T>> {
        self.heap.iter().map(|Reverse(k)| k)
    }

    pub(crate) fn into_items(self) -> Vec<T> {
        self.heap
            .into_vec()
            .into_iter()
            .map(|Reverse(k)| k.into_item())
            .collect()
    }
}
