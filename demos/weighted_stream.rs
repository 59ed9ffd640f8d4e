//! Weighted stream sampling with the overflow guard in the loop.
//!
//! Feeds a power-law weighted stream (many light items, a few heavy ones) into
//! a weighted reservoir and compares it against a uniform one on the same
//! stream. Then pushes an item far too light to ever be admitted and shows the
//! reservoir freezing instead of quietly dropping it.

use kura::{Reservoir, ReservoirConfig, SamplingError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let weights: Vec<f64> = (0..50)
        .map(|i| 1.0 / (1.0 + (i as f64)).powf(1.3))
        .collect();

    let k = 10usize;

    let mut weighted = ReservoirConfig::weighted(k).with_seed(7).build::<usize>()?;
    let mut uniform = Reservoir::uniform(k, ChaCha8Rng::seed_from_u64(7));
    for (i, &w) in weights.iter().enumerate() {
        weighted.offer_weighted(i, w)?;
        uniform.offer(i)?;
    }

    let mut pick_w = weighted.drain().into_items();
    let mut pick_u = uniform.drain().into_items();
    pick_w.sort_unstable();
    pick_u.sort_unstable();

    println!("weights[0..10]:");
    for (i, w) in weights.iter().take(10).enumerate() {
        println!("  i={i:2}  w={w:.6}");
    }
    println!();
    println!("weighted reservoir (A-Res) indices: {pick_w:?}");
    println!("uniform reservoir indices:          {pick_u:?}");
    println!(
        "weighted: seen={} total_weight={:.4} threshold={:?}",
        weighted.seen(),
        weighted.total_weight(),
        weighted.threshold()
    );

    match weighted.offer_weighted(usize::MAX, 1e-30) {
        Err(SamplingError::StreamOverflow(cause)) => {
            println!("guard tripped: {cause}");
            let frozen = weighted.drain();
            println!(
                "frozen sample of {} items, degraded={}",
                frozen.len(),
                frozen.is_degraded()
            );
        }
        other => println!("unexpected: {other:?}"),
    }

    Ok(())
}
