//! Reservoir configuration.
//!
//! ```
//! use kura::{KeyStrategy, ReservoirConfig};
//!
//! let mut r = ReservoirConfig::weighted(16).with_seed(7).build::<&str>()?;
//! r.offer_weighted("a", 3.0)?;
//! assert_eq!(r.strategy(), KeyStrategy::Weighted);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::keyed::KeyStrategy;
use crate::reservoir::Reservoir;

/// Largest capacity a config may request.
///
/// Reservoirs reserve only a bounded number of slots up front and grow as items
/// are admitted, so this caps what a full reservoir may eventually hold.
pub const MAX_CAPACITY: usize = u32::MAX as usize;

/// Everything needed to build a [`Reservoir`] except the item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReservoirConfig {
    /// Maximum number of retained items. `0` keeps nothing.
    pub capacity: usize,
    /// How keys are drawn. Defaults to uniform.
    #[cfg_attr(feature = "serde", serde(default))]
    pub strategy: KeyStrategy,
    /// Seed for [`build`](Self::build); `None` seeds from the thread RNG.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
}

impl ReservoirConfig {
    /// Unseeded config for `capacity` items.
    pub fn new(capacity: usize, strategy: KeyStrategy) -> Self {
        Self {
            capacity,
            strategy,
            seed: None,
        }
    }

    /// Unseeded uniform config.
    pub fn uniform(capacity: usize) -> Self {
        Self::new(capacity, KeyStrategy::Uniform)
    }

    /// Unseeded weighted (A-Res) config.
    pub fn weighted(capacity: usize) -> Self {
        Self::new(capacity, KeyStrategy::Weighted)
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the capacity against [`MAX_CAPACITY`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                capacity: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(())
    }

    /// Build a reservoir driven by a [`StdRng`].
    pub fn build<T>(&self) -> Result<Reservoir<T, StdRng>, ConfigError> {
        let rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        self.build_with_rng(rng)
    }

    /// Build a reservoir around a caller-supplied RNG. The seed is ignored.
    pub fn build_with_rng<T, R: Rng>(&self, rng: R) -> Result<Reservoir<T, R>, ConfigError> {
        self.validate()?;
        Ok(Reservoir::new(self.capacity, self.strategy, rng))
    }
}
