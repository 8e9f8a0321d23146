use anyhow::{Context, Result};
use itertools::Itertools;

use crate::partition::{filter_partitioned_parallel, partition, PartitionOpts};
use crate::preset::FormatChoice;
use crate::record::ChainRecord;
use crate::report::{run_date, RunReport};
use crate::sample::{distinct_cells, make_rng, sample_cells, subset};
use crate::table::{write_table_to_path, ChainTable};

/// Everything needed for a single run of the `filter` command.
pub struct FilterRun<'a> {
    pub input: &'a str,
    pub output: &'a str,
    pub sample: Option<usize>,
    pub seed: Option<u64>,
    pub partition: PartitionOpts,
    pub threads: usize,
    pub format: FormatChoice,
    pub delimiter: u8,
    pub report: Option<&'a str>,
}

/// Reads an input file, optionally samples cells from it, filters each partition separately and
/// writes the surviving rows back out.
///
/// # Returns
///
/// A `RunReport` describing the run. It is also written to `run.report`, if given.
///
/// # Errors
///
/// This function will return an error if:
/// * The input file cannot be read, or lacks a required column.
/// * The output format does not match the input columns, or a `%d` column is not numeric.
/// * The output file cannot be written.
pub fn filter_file(run: &FilterRun) -> Result<RunReport> {
    // time everything!
    let now = std::time::Instant::now();

    info!("Reading {}", run.input);
    let table = ChainTable::from_path(run.input, run.delimiter)?;
    if run.partition.by_donor {
        table.schema.require_donor()?;
    }

    // check the output format before doing any work
    let format = run
        .format
        .resolve(table.schema.width())
        .context("Invalid output format")?;

    let cells = distinct_cells(&table.records);
    info!(
        "There are {} rows and {} cells",
        table.records.len(),
        cells.len()
    );

    let (records, sampled_cells): (Vec<&ChainRecord>, Option<usize>) = match run.sample {
        Some(n) => {
            let mut rng = make_rng(run.seed);
            let sample = sample_cells(&cells, n, &mut rng);
            (subset(&table.records, &sample), Some(sample.len()))
        }
        None => (table.records.iter().collect(), None),
    };

    // avoids problems where a cell may be high-quality in one compartment, but not the other
    let parts = partition(records, &run.partition);
    if parts.unassigned > 0 {
        info!(
            "Skipping {} rows outside of the selected partitions (compartments: {}{})",
            parts.unassigned,
            run.partition.compartments.iter().join(", "),
            if run.partition.by_donor { ", by donor" } else { "" }
        );
    }

    let (kept, statistics) = filter_partitioned_parallel(&parts.partitions, run.threads)?;
    info!(
        "There are {} rows and {} cells",
        kept.len(),
        statistics.retained_cells
    );
    debug!(
        "{} incomplete rows, {} paired cells, {} cells with multiple beta chains",
        statistics.incomplete_rows, statistics.paired_cells, statistics.multi_beta_cells
    );

    info!("Writing to {}", run.output);
    write_table_to_path(run.output, &table.schema, &kept, &format, run.delimiter)?;
    info!("Done writing to {}", run.output);

    let report = RunReport {
        tcrfilter_version: crate::cli::VERSION.to_string(),
        run_date: run_date(),
        input: run.input.to_string(),
        output: run.output.to_string(),
        compartments: run.partition.compartments.clone(),
        by_donor: run.partition.by_donor,
        input_rows: table.records.len(),
        input_cells: cells.len(),
        sampled_cells,
        unassigned_rows: parts.unassigned,
        statistics,
        elapsed: now.elapsed().as_secs_f64(),
    };

    if let Some(path) = run.report {
        report.write(path)?;
        info!("Wrote run report to {path}");
    }

    Ok(report)
}
