//! Error types shared by every sampler.
//!
//! Offering an item can fail in exactly two ways: the caller passed a weight the
//! key formula cannot use ([`SamplingError::InvalidWeight`]), or the running
//! numerical state can no longer support an unbiased decision
//! ([`SamplingError::StreamOverflow`]). The second one is terminal for the
//! sampler that raised it.

use thiserror::Error;

/// Why a sampler stopped accepting items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum OverflowCause {
    /// The seen-items counter would exceed `u64::MAX`.
    #[error("stream length exceeds {} items", u64::MAX)]
    StreamLength,
    /// The cumulative weight is no longer a finite number.
    #[error("cumulative weight is no longer finite")]
    WeightSum,
    /// The incoming item could only be admitted by a draw finer than the
    /// resolution of the uniform source.
    #[error("admission probability fell to the draw resolution")]
    AdmissionResolution,
    /// A weighted key underflowed or overflowed to a boundary value.
    #[error("weighted key degenerated to a boundary value")]
    DegenerateKey,
    /// The skip distance of a skip-based sampler can no longer be computed.
    #[error("skip computation lost precision")]
    SkipPrecision,
}

/// Failure of a single `offer`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    /// The weight is not finite, not positive, or not accepted by the strategy.
    #[error("invalid weight {weight}: {reason}")]
    InvalidWeight { weight: f64, reason: &'static str },
    /// The sampler reached a state in which further admissions would be biased.
    #[error("stream overflow: {0}")]
    StreamOverflow(OverflowCause),
}

impl SamplingError {
    /// Whether this error is terminal for the sampler that returned it.
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::StreamOverflow(_))
    }
}

impl From<OverflowCause> for SamplingError {
    fn from(cause: OverflowCause) -> Self {
        Self::StreamOverflow(cause)
    }
}

/// Errors for [`ReservoirConfig`](crate::config::ReservoirConfig) validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The requested capacity is above [`MAX_CAPACITY`](crate::config::MAX_CAPACITY).
    #[error("capacity {capacity} exceeds the maximum of {max}")]
    CapacityTooLarge { capacity: usize, max: usize },
}

/// Reject weights that cannot produce a key.
pub(crate) fn validate_weight(weight: f64) -> Result<f64, SamplingError> {
    if !weight.is_finite() {
        return Err(SamplingError::InvalidWeight {
            weight,
            reason: "weight must be finite",
        });
    }
    if weight <= 0.0 {
        return Err(SamplingError::InvalidWeight {
            weight,
            reason: "weight must be > 0",
        });
    }
    Ok(weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_weight_accepts_positive_finite() {
        assert_eq!(validate_weight(1.0), Ok(1.0));
        assert_eq!(validate_weight(f64::MIN_POSITIVE), Ok(f64::MIN_POSITIVE));
        assert_eq!(validate_weight(f64::MAX), Ok(f64::MAX));
    }

    #[test]
    fn validate_weight_rejects_bad_values() {
        for w in [0.0, -0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = validate_weight(w).expect_err("bad weight rejected");
            assert!(matches!(err, SamplingError::InvalidWeight { .. }));
            assert!(!err.is_overflow());
        }
    }

    #[test]
    fn overflow_messages_are_descriptive() {
        let err = SamplingError::from(OverflowCause::WeightSum);
        assert!(err.is_overflow());
        assert_eq!(
            err.to_string(),
            "stream overflow: cumulative weight is no longer finite"
        );
    }
}
