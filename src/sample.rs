use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::record::ChainRecord;

/// Distinct cell barcodes, in order of first appearance. Records without a barcode are ignored.
pub fn distinct_cells<'a, I>(records: I) -> IndexSet<&'a str>
where
    I: IntoIterator<Item = &'a ChainRecord>,
{
    records.into_iter().filter_map(|r| r.cell_id()).collect()
}

/// Creates the random number generator used for sampling. A fixed seed gives reproducible
/// samples; otherwise the generator is seeded from the OS.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Picks `n` distinct cells at random, without replacement. If fewer than `n` cells exist, every
/// cell is returned instead.
pub fn sample_cells<'a>(cells: &IndexSet<&'a str>, n: usize, rng: &mut StdRng) -> IndexSet<&'a str> {
    let n = if n > cells.len() {
        info!(
            "Sample size bigger than cell count, sampling n={} instead",
            cells.len()
        );
        cells.len()
    } else {
        info!("Sampling {n} cells from the data");
        n
    };

    let pool: Vec<&'a str> = cells.iter().copied().collect();
    pool.choose_multiple(rng, n).copied().collect()
}

/// The records belonging to any of the sampled cells, in input order.
pub fn subset<'a>(records: &'a [ChainRecord], cells: &IndexSet<&str>) -> Vec<&'a ChainRecord> {
    records
        .iter()
        .filter(|r| r.cell_id().is_some_and(|id| cells.contains(id)))
        .collect()
}
