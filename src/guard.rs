//! Overflow guard.
//!
//! A reservoir decides admissions by comparing a fresh key against the worst
//! retained key. That comparison is only meaningful while the uniform source can
//! actually produce a draw that wins it. `rand` produces `f64` draws on a grid of
//! step 2^-53, so once the exact admission probability of an item drops to that
//! step or below, the item is rejected with probability one even though its
//! true inclusion probability is positive. From then on the sample is biased,
//! and the guard stops the stream instead.
//!
//! Checks, in order, before the key is drawn:
//! 1. the seen counter fits in a `u64`;
//! 2. the cumulative weight stays finite;
//! 3. when the reservoir is full, the admission probability against the current
//!    worst score is above [`DRAW_RESOLUTION`].
//!
//! After the draw, weighted keys must be normal floats: `ln(u) / w` turns
//! subnormal (or zero) for enormous weights and infinite for subnormal weights,
//! and many distinct items would then share one boundary score.
//!
//! Uniform reservoirs only reach check 3 after on the order of `K * 2^53`
//! items, so in practice the guard is a weighted-sampling concern: very long
//! streams, or extreme weight ratios.

use crate::error::OverflowCause;
use crate::keyed::KeyStrategy;

/// Step between consecutive uniform `f64` draws.
pub const DRAW_RESOLUTION: f64 = 1.0 / (1u64 << 53) as f64;

/// Scalar accumulators updated on every accepted offer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningState {
    /// Items offered without error.
    pub seen: u64,
    /// Sum of their weights.
    pub total_weight: f64,
}

/// Numerical limits a reservoir checks on every offer.
///
/// The resolution is the grid step of the uniform source. It defaults to
/// [`DRAW_RESOLUTION`], which matches `rand`'s `f64` draws; an RNG adapter with a
/// coarser (or finer) grid should say so through [`with_resolution`].
///
/// [`with_resolution`]: Self::with_resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverflowGuard {
    resolution: f64,
}

impl Default for OverflowGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl OverflowGuard {
    /// Guard for `rand`'s 2^-53 draw grid.
    pub fn new() -> Self {
        Self::with_resolution(DRAW_RESOLUTION)
    }

    /// Guard for a source whose uniform draws are `resolution` apart.
    ///
    /// Admissions whose probability is at or below `resolution` trip the guard,
    /// so a larger value stops the stream earlier.
    pub fn with_resolution(resolution: f64) -> Self {
        Self { resolution }
    }

    /// Smallest admission probability the guard still accepts (exclusive).
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Pre-draw checks. Returns the running state to commit if the offer
    /// goes through; `state` itself is never touched.
    ///
    /// `threshold` is the worst retained score, present only when the
    /// reservoir is full.
    pub fn check_admission(
        &self,
        state: &RunningState,
        strategy: KeyStrategy,
        weight: f64,
        threshold: Option<f64>,
    ) -> Result<RunningState, OverflowCause> {
        let seen = state
            .seen
            .checked_add(1)
            .ok_or(OverflowCause::StreamLength)?;

        let total_weight = state.total_weight + weight;
        if !total_weight.is_finite() {
            return Err(OverflowCause::WeightSum);
        }

        if let Some(t) = threshold {
            let p = strategy.admission_probability(weight, t);
            // NaN must trip as well.
            if !(p > self.resolution) {
                return Err(OverflowCause::AdmissionResolution);
            }
        }

        Ok(RunningState { seen, total_weight })
    }

    /// Post-draw check for weighted keys.
    pub fn check_key(&self, key: f64) -> Result<f64, OverflowCause> {
        if key.is_normal() {
            Ok(key)
        } else {
            Err(OverflowCause::DegenerateKey)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(seen: u64, total_weight: f64) -> RunningState {
        RunningState { seen, total_weight }
    }

    #[test]
    fn resolution_is_f64_draw_step() {
        assert_eq!(DRAW_RESOLUTION, f64::EPSILON / 2.0);
    }

    #[test]
    fn advances_running_state() {
        let g = OverflowGuard::new();
        let next = g
            .check_admission(&state(4, 10.0), KeyStrategy::Weighted, 2.5, None)
            .expect("within bounds");
        assert_eq!(next, state(5, 12.5));
    }

    #[test]
    fn trips_on_counter_overflow() {
        let g = OverflowGuard::new();
        let err = g
            .check_admission(&state(u64::MAX, 1.0), KeyStrategy::Uniform, 1.0, None)
            .expect_err("counter full");
        assert_eq!(err, OverflowCause::StreamLength);
    }

    #[test]
    fn trips_on_infinite_weight_sum() {
        let g = OverflowGuard::new();
        let err = g
            .check_admission(&state(1, f64::MAX), KeyStrategy::Weighted, f64::MAX, None)
            .expect_err("sum overflows");
        assert_eq!(err, OverflowCause::WeightSum);
    }

    #[test]
    fn uniform_threshold_at_top_of_grid_trips() {
        let g = OverflowGuard::new();
        let top = 1.0 - DRAW_RESOLUTION;
        let err = g
            .check_admission(&state(9, 9.0), KeyStrategy::Uniform, 1.0, Some(top))
            .expect_err("no draw can beat the threshold");
        assert_eq!(err, OverflowCause::AdmissionResolution);

        let below = 1.0 - 4.0 * DRAW_RESOLUTION;
        assert!(g
            .check_admission(&state(9, 9.0), KeyStrategy::Uniform, 1.0, Some(below))
            .is_ok());
    }

    #[test]
    fn weighted_light_item_against_heavy_threshold_trips() {
        let g = OverflowGuard::new();
        // Worst retained key of ln(0.5): an item of weight 1e-20 needs a draw
        // above exp(-6.9e-21), which rounds to 1.
        let t = 0.5f64.ln();
        let err = g
            .check_admission(&state(1, 1.0), KeyStrategy::Weighted, 1e-20, Some(t))
            .expect_err("below resolution");
        assert_eq!(err, OverflowCause::AdmissionResolution);

        assert!(g
            .check_admission(&state(1, 1.0), KeyStrategy::Weighted, 1e-6, Some(t))
            .is_ok());
    }

    #[test]
    fn coarser_resolution_trips_earlier() {
        let fine = OverflowGuard::new();
        let coarse = OverflowGuard::with_resolution(1.0 / 1024.0);
        assert_eq!(coarse.resolution(), 1.0 / 1024.0);

        // Admission probability 1 - t = 2^-12.
        let t = 1.0 - 1.0 / 4096.0;
        let s = state(3, 3.0);
        assert!(fine
            .check_admission(&s, KeyStrategy::Uniform, 1.0, Some(t))
            .is_ok());
        assert_eq!(
            coarse.check_admission(&s, KeyStrategy::Uniform, 1.0, Some(t)),
            Err(OverflowCause::AdmissionResolution)
        );
        assert_eq!(OverflowGuard::default(), fine);
    }

    #[test]
    fn degenerate_keys_are_rejected() {
        let g = OverflowGuard::new();
        assert_eq!(g.check_key(-0.5), Ok(-0.5));
        for key in [0.0, -0.0, -1e-310, f64::NEG_INFINITY, f64::NAN] {
            assert_eq!(g.check_key(key), Err(OverflowCause::DegenerateKey));
        }
    }
}
