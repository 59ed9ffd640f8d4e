//! `kura`: single-pass reservoir sampling.
//!
//! Keeps a fixed-size random sample of a stream of unknown length, uniform or
//! weight-proportional, in O(k) memory.
//!
//! Exposed modules:
//! - `reservoir`: keyed reservoir (uniform keys, or A-Res weighted keys) over a bounded heap.
//! - `skip`: index-replacement uniform samplers (Algorithm L/R).
//! - `guard`: the numerical overflow guard that freezes a sampler before it turns biased.
//! - `keyed`: keyed items and key strategies.
//! - `stream`: the `StreamSampler` contract and the materialized `Sample`.
//! - `config`: `ReservoirConfig` for building seeded reservoirs.
//!
//! ```
//! use kura::Reservoir;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut r = Reservoir::weighted(2, StdRng::seed_from_u64(7));
//! r.offer_weighted("rare", 0.5)?;
//! r.offer_weighted("common", 20.0)?;
//! r.offer_weighted("typical", 1.0)?;
//! assert_eq!(r.size(), 2);
//! # Ok::<(), kura::SamplingError>(())
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod guard;
mod heap;
pub mod keyed;
pub mod reservoir;
pub mod skip;
pub mod stream;

pub use config::ReservoirConfig;
pub use error::{ConfigError, OverflowCause, SamplingError};
pub use guard::{OverflowGuard, DRAW_RESOLUTION};
pub use keyed::{KeyStrategy, KeyedItem};
pub use reservoir::{Reservoir, ReservoirState};
pub use skip::{ClassicReservoir, SkipReservoir};
pub use stream::{Sample, StreamSampler, WeightedStreamSampler};
