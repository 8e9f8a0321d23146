use anyhow::{Context, Result};
use serde::Serialize;

use crate::filter::FilterStatistics;

/// Information about a single run of the filter, written as JSON when `--report` is given.
#[derive(Serialize, Debug)]
pub struct RunReport {
    pub tcrfilter_version: String,
    pub run_date: String,
    pub input: String,
    pub output: String,
    pub compartments: Vec<String>,
    pub by_donor: bool,
    pub input_rows: usize,
    pub input_cells: usize,
    pub sampled_cells: Option<usize>,
    pub unassigned_rows: usize,
    pub statistics: FilterStatistics,
    pub elapsed: f64,
}

impl RunReport {
    /// Writes the report to `path` as pretty-printed JSON.
    pub fn write(&self, path: &str) -> Result<()> {
        let file =
            std::fs::File::create(path).with_context(|| format!("Could not create {path}"))?;
        serde_json::to_writer_pretty(file, self).context("Could not serialize report")?;
        Ok(())
    }
}

pub fn run_date() -> String {
    format!("{:?}", chrono::offset::Local::now())
}
