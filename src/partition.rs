use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::filter::{filter_cells, filter_cells_with_stats, FilterStatistics};
use crate::record::ChainRecord;

/// How records are split before filtering.
#[derive(Clone, Debug)]
pub struct PartitionOpts {
    /// Compartments to keep, in the order they are processed. Records from any other
    /// compartment are not placed in a partition.
    pub compartments: Vec<String>,
    /// Whether to split by donor before splitting by compartment
    pub by_donor: bool,
}

/// A group of records that is filtered on its own: one compartment, and possibly one donor.
pub struct Partition<'a> {
    pub donor: Option<String>,
    pub compartment: String,
    pub records: Vec<&'a ChainRecord>,
}

pub struct Partitioning<'a> {
    /// Non-empty partitions in processing order
    pub partitions: Vec<Partition<'a>>,
    /// Number of records which were not placed into any partition
    pub unassigned: usize,
}

/// Splits records into partitions, so that the chain filter never sees more than one
/// compartment at a time.
///
/// Donors are processed in ascending order, and compartments in the order given by `opts`.
/// Within a partition, records keep their input order. Records with a missing donor (when
/// splitting by donor), or a compartment which was not asked for, are left out.
pub fn partition<'a, I>(records: I, opts: &PartitionOpts) -> Partitioning<'a>
where
    I: IntoIterator<Item = &'a ChainRecord>,
{
    let n_compartments = opts.compartments.len();
    let compartment_idx: HashMap<&str, usize> = opts
        .compartments
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    // donor -> records by compartment index. Without a donor split, everything is under `None`.
    let mut groups: BTreeMap<Option<&'a str>, Vec<Vec<&'a ChainRecord>>> = BTreeMap::new();
    let mut unassigned = 0;

    for rec in records {
        let Some(&idx) = rec.compartment().and_then(|c| compartment_idx.get(c)) else {
            unassigned += 1;
            continue;
        };

        let donor = if opts.by_donor {
            match rec.donor() {
                Some(d) => Some(d),
                None => {
                    unassigned += 1;
                    continue;
                }
            }
        } else {
            None
        };

        groups
            .entry(donor)
            .or_insert_with(|| vec![Vec::new(); n_compartments])[idx]
            .push(rec);
    }

    let partitions = groups
        .into_iter()
        .flat_map(|(donor, by_compartment)| {
            by_compartment
                .into_iter()
                .zip(opts.compartments.iter())
                .filter(|(records, _)| !records.is_empty())
                .map(move |(records, compartment)| Partition {
                    donor: donor.map(str::to_string),
                    compartment: compartment.clone(),
                    records,
                })
        })
        .collect();

    Partitioning {
        partitions,
        unassigned,
    }
}

/// Filters each partition separately and concatenates the results in partition order.
pub fn filter_partitioned<'a>(partitions: &[Partition<'a>]) -> Vec<&'a ChainRecord> {
    partitions
        .iter()
        .flat_map(|p| filter_cells(&p.records))
        .collect()
}

/// Same as `filter_partitioned`, but filters the partitions on a thread pool and also returns
/// the merged statistics. The output order does not depend on `threads`.
pub fn filter_partitioned_parallel<'a>(
    partitions: &[Partition<'a>],
    threads: usize,
) -> Result<(Vec<&'a ChainRecord>, FilterStatistics)> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Could not create the thread pool")?;

    let results: Vec<(Vec<&'a ChainRecord>, FilterStatistics)> = pool.install(|| {
        partitions
            .par_iter()
            .map(|p| {
                let (kept, stats) = filter_cells_with_stats(&p.records);
                debug!(
                    "donor {} / {}: kept {} of {} rows",
                    p.donor.as_deref().unwrap_or("-"),
                    p.compartment,
                    stats.retained_rows,
                    stats.input_rows
                );
                (kept, stats)
            })
            .collect()
    });

    let mut stats = FilterStatistics::default();
    let mut kept = Vec::new();
    for (records, partition_stats) in results {
        kept.extend(records);
        stats.merge(&partition_stats);
    }

    Ok((kept, stats))
}
