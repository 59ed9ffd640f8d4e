//! Index-replacement uniform samplers.
//!
//! These keep the sample in a plain `Vec` and overwrite a random slot instead of
//! ranking items by key. They are cheaper than the keyed [`Reservoir`] for the
//! uniform case but cannot take weights.
//!
//! - [`SkipReservoir`]: **Algorithm L** (Li, 1994). Draws how many items to
//!   skip before the next replacement: O(k(1 + log(N/k))) RNG calls.
//! - [`ClassicReservoir`]: **Algorithm R** (Vitter, 1985). One draw per item;
//!   kept as a correctness baseline.
//!
//! ## References
//!
//! - Vitter (1985): reservoir sampling “Algorithm R”.
//! - Li (1994): reservoir sampling “Algorithm L” (skip-based).
//!
//! [`Reservoir`]: crate::reservoir::Reservoir

use rand::Rng;
use tracing::warn;

use crate::error::{OverflowCause, SamplingError};
use crate::heap::INITIAL_RESERVE;
use crate::stream::{Sample, StreamSampler};

/// Uniform draw in `(0, 1)`, safe to take the log of.
#[inline]
fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random::<f64>().max(f64::MIN_POSITIVE)
}

/// Uniform reservoir using Algorithm L.
#[derive(Debug, Clone)]
pub struct SkipReservoir<T, R> {
    k: usize,
    seen: u64,
    samples: Vec<T>,
    skip: u64,
    w: f64,
    rng: R,
    overflow: Option<OverflowCause>,
}

impl<T, R: Rng> SkipReservoir<T, R> {
    /// Create a new sampler that keeps at most `k` samples.
    pub fn new(k: usize, rng: R) -> Self {
        Self {
            k,
            seen: 0,
            samples: Vec::with_capacity(k.min(INITIAL_RESERVE)),
            skip: 0,
            w: 0.0, // Initialized when reservoir fills
            rng,
            overflow: None,
        }
    }

    /// Add an item from the stream.
    ///
    /// If `k == 0`, this discards all items.
    pub fn offer(&mut self, item: T) -> Result<bool, SamplingError> {
        if let Some(cause) = self.overflow {
            return Err(SamplingError::StreamOverflow(cause));
        }
        let Some(seen) = self.seen.checked_add(1) else {
            return Err(self.trip(OverflowCause::StreamLength));
        };

        if self.k == 0 {
            self.seen = seen;
            return Ok(false);
        }

        // Phase 1: filling the reservoir
        if self.samples.len() < self.k {
            if self.samples.len() + 1 == self.k {
                // Initial W = u^(1/k)
                let w = (open_unit(&mut self.rng).ln() / self.k as f64).exp();
                let skip = match self.next_skip(w) {
                    Ok(skip) => skip,
                    Err(cause) => return Err(self.trip(cause)),
                };
                self.w = w;
                self.skip = skip;
            }
            self.samples.push(item);
            self.seen = seen;
            return Ok(true);
        }

        // Phase 2: skip items
        if self.skip > 0 {
            self.skip -= 1;
            self.seen = seen;
            return Ok(false);
        }

        // Skip counter hit 0: replace a uniformly chosen slot
        let replace_idx = self.rng.random_range(0..self.k);
        let w = self.w * (open_unit(&mut self.rng).ln() / self.k as f64).exp();
        let skip = match self.next_skip(w) {
            Ok(skip) => skip,
            Err(cause) => return Err(self.trip(cause)),
        };

        self.samples[replace_idx] = item;
        self.w = w;
        self.skip = skip;
        self.seen = seen;
        Ok(true)
    }

    /// Li's skip length: `floor(ln(u) / ln(1 - W))`.
    ///
    /// `ln_1p` keeps `ln(1 - W)` exact for small `W`; the computation only
    /// breaks once `W` itself underflows. Skips beyond `u64::MAX` saturate, and
    /// the seen counter trips first.
    fn next_skip(&mut self, w: f64) -> Result<u64, OverflowCause> {
        // W == 1 is legal: ln(1 - W) is -inf and the skip is 0.
        if !(w > 0.0 && w <= 1.0) {
            return Err(OverflowCause::SkipPrecision);
        }
        let denom = (-w).ln_1p();
        let skip = (open_unit(&mut self.rng).ln() / denom).floor();
        if !skip.is_finite() || skip < 0.0 {
            return Err(OverflowCause::SkipPrecision);
        }
        Ok(skip as u64)
    }

    fn trip(&mut self, cause: OverflowCause) -> SamplingError {
        warn!(%cause, seen = self.seen, w = self.w, "skip reservoir overflowed");
        self.overflow = Some(cause);
        SamplingError::StreamOverflow(cause)
    }
}

impl<T, R> SkipReservoir<T, R> {
    /// Get the current sample (size ≤ k).
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    /// Number of items observed so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Whether the guard has tripped. The sampler then refuses all offers.
    pub fn is_overflowed(&self) -> bool {
        self.overflow.is_some()
    }

    /// Consume the sampler and return its sample.
    pub fn into_sample(self) -> Sample<T> {
        let degraded = self.is_overflowed();
        Sample::new(self.samples, degraded)
    }
}

impl<T, R: Rng> StreamSampler<T> for SkipReservoir<T, R> {
    fn offer(&mut self, item: T) -> Result<bool, SamplingError> {
        SkipReservoir::offer(self, item)
    }

    fn size(&self) -> usize {
        self.samples.len()
    }

    fn capacity(&self) -> usize {
        self.k
    }

    fn seen(&self) -> u64 {
        self.seen
    }

    fn drain(&self) -> Sample<T>
    where
        T: Clone,
    {
        Sample::new(self.samples.clone(), self.is_overflowed())
    }
}

/// Uniform reservoir using Algorithm R.
#[derive(Debug, Clone)]
pub struct ClassicReservoir<T, R> {
    k: usize,
    seen: u64,
    samples: Vec<T>,
    rng: R,
    overflow: Option<OverflowCause>,
}

impl<T, R: Rng> ClassicReservoir<T, R> {
    /// Create a new sampler that keeps at most `k` samples.
    pub fn new(k: usize, rng: R) -> Self {
        Self {
            k,
            seen: 0,
            samples: Vec::with_capacity(k.min(INITIAL_RESERVE)),
            rng,
            overflow: None,
        }
    }

    /// Add an item from the stream.
    pub fn offer(&mut self, item: T) -> Result<bool, SamplingError> {
        if let Some(cause) = self.overflow {
            return Err(SamplingError::StreamOverflow(cause));
        }
        let Some(seen) = self.seen.checked_add(1) else {
            warn!(seen = self.seen, "classic reservoir overflowed");
            self.overflow = Some(OverflowCause::StreamLength);
            return Err(SamplingError::StreamOverflow(OverflowCause::StreamLength));
        };
        self.seen = seen;

        if self.k == 0 {
            return Ok(false);
        }

        if self.samples.len() < self.k {
            self.samples.push(item);
            return Ok(true);
        }

        // Algorithm R: replace with probability k / seen.
        let j = self.rng.random_range(0..seen);
        if j < self.k as u64 {
            self.samples[j as usize] = item;
            return Ok(true);
        }
        Ok(false)
    }
}

impl<T, R> ClassicReservoir<T, R> {
    /// Get the current sample (size ≤ k).
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    /// Number of items observed so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Whether the guard has tripped. The sampler then refuses all offers.
    pub fn is_overflowed(&self) -> bool {
        self.overflow.is_some()
    }

    /// Consume the sampler and return its sample.
    pub fn into_sample(self) -> Sample<T> {
        let degraded = self.is_overflowed();
        Sample::new(self.samples, degraded)
    }
}

impl<T, R: Rng> StreamSampler<T> for ClassicReservoir<T, R> {
    fn offer(&mut self, item: T) -> Result<bool, SamplingError> {
        ClassicReservoir::offer(self, item)
    }

    fn size(&self) -> usize {
        self.samples.len()
    }

    fn capacity(&self) -> usize {
        self.k
    }

    fn seen(&self) -> u64 {
        self.seen
    }

    fn drain(&self) -> Sample<T>
    where
        T: Clone,
    {
        Sample::new(self.samples.clone(), self.is_overflowed())
    }
}
