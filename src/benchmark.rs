use std::hint::black_box;
use std::io::prelude::*;
use std::time::{Duration, Instant};

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;

use crate::partition::{filter_partitioned, partition, PartitionOpts};
use crate::record::ChainRecord;
use crate::sample::{distinct_cells, make_rng, sample_cells, subset};
use crate::table::ChainTable;

pub struct BenchmarkOpts {
    /// The first sample size, which is doubled until it reaches the number of cells
    pub floor: usize,
    pub seed: Option<u64>,
    pub partition: PartitionOpts,
    pub delimiter: u8,
}

/// One measurement: the time taken to partition and filter the rows of `sample_size` cells.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkPoint {
    pub sample_size: usize,
    pub elapsed_ns: u64,
}

/// Sample sizes for a file with `n_cells` cells: `floor`, `2 * floor`, `4 * floor`, ... while
/// strictly smaller than `n_cells`.
pub fn sample_sizes(floor: usize, n_cells: usize) -> Vec<usize> {
    std::iter::successors((floor > 0).then_some(floor), |s| s.checked_mul(2))
        .take_while(|s| *s < n_cells)
        .collect()
}

/// Times one partition + filter + concatenation pass over `records`.
pub fn time_filter(records: &[&ChainRecord], opts: &PartitionOpts) -> Duration {
    let start = Instant::now();

    let parts = partition(records.iter().copied(), opts);
    let kept = filter_partitioned(&parts.partitions);
    black_box(kept);

    start.elapsed()
}

/// Runs the asymptotic benchmark over an input file, writing a `sample_size,elapsed_ns` line
/// to `writer` as soon as each sample size has been measured.
///
/// # Returns
///
/// Every measurement, in increasing sample size order.
///
/// # Errors
///
/// This function will return an error if the input file cannot be read, if donor splitting is
/// requested but there is no `donor` column, or if writing fails.
pub fn benchmark(
    input: &str,
    writer: &mut impl Write,
    opts: &BenchmarkOpts,
) -> Result<Vec<BenchmarkPoint>> {
    info!("Reading {input}");
    let table = ChainTable::from_path(input, opts.delimiter)?;
    if opts.partition.by_donor {
        table.schema.require_donor()?;
    }

    let cells = distinct_cells(&table.records);
    info!(
        "There are {} rows and {} cells",
        table.records.len(),
        cells.len()
    );

    let sizes = sample_sizes(opts.floor, cells.len());
    if sizes.is_empty() {
        warn!(
            "There are only {} cells, which is not more than the smallest sample size of {}",
            cells.len(),
            opts.floor
        );
    }

    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    let mut rng = make_rng(opts.seed);
    let mut points = Vec::with_capacity(sizes.len());

    for sample_size in sizes {
        let sample = sample_cells(&cells, sample_size, &mut rng);
        let records = subset(&table.records, &sample);

        let elapsed = time_filter(&records, &opts.partition);
        let point = BenchmarkPoint {
            sample_size,
            elapsed_ns: u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX),
        };
        info!("Elapsed: {} ns", point.elapsed_ns);

        wtr.serialize(point)?;
        wtr.flush()?;
        points.push(point);
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_double_from_floor() {
        assert_eq!(sample_sizes(64, 1000), vec![64, 128, 256, 512]);
        assert_eq!(sample_sizes(64, 512), vec![64, 128, 256]);
        assert_eq!(sample_sizes(3, 13), vec![3, 6, 12]);
    }

    #[test]
    fn no_sizes_for_small_inputs() {
        assert!(sample_sizes(64, 64).is_empty());
        assert!(sample_sizes(64, 0).is_empty());
        assert!(sample_sizes(0, 100).is_empty());
    }

    #[test]
    fn writes_one_line_per_size() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");

        let mut contents = String::from("barcode,donor,compartment,chain\n");
        for i in 0..20 {
            let compartment = if i % 2 == 0 { "pbmc" } else { "tonsil" };
            contents += &format!("C{i},D{},{compartment},TRA\n", i % 3);
            contents += &format!("C{i},D{},{compartment},TRB\n", i % 3);
        }
        std::fs::write(&input, contents).unwrap();

        let opts = BenchmarkOpts {
            floor: 2,
            seed: Some(3),
            partition: PartitionOpts {
                compartments: vec!["pbmc".to_string(), "tonsil".to_string()],
                by_donor: true,
            },
            delimiter: b',',
        };

        let mut out = Vec::new();
        let points = benchmark(input.to_str().unwrap(), &mut out, &opts).unwrap();

        let sizes: Vec<usize> = points.iter().map(|p| p.sample_size).collect();
        assert_eq!(sizes, vec![2, 4, 8, 16]);

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("2,"));
        assert!(lines[3].starts_with("16,"));
    }
}
