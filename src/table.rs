use std::borrow::Cow;
use std::fs::File;
use std::io::prelude::*;

use anyhow::{Context, Result};
use csv::{Reader, ReaderBuilder, WriterBuilder};
use tempfile::NamedTempFile;

use crate::error::TcrError;
use crate::format::OutputFormat;
use crate::record::{ChainRecord, Schema};

/// Parses a delimiter given on the command line. Only single ASCII characters are accepted,
/// with `\t` (or the word `tab`) as an alias for a tab.
pub fn parse_delimiter(arg: &str) -> Result<u8, TcrError> {
    match arg {
        "\\t" | "tab" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        s => Err(TcrError::InvalidDelimiter(s.to_string())),
    }
}

/// An input file held in memory: its header, and every row.
pub struct ChainTable {
    pub schema: Schema,
    pub records: Vec<ChainRecord>,
}

impl ChainTable {
    /// Reads a delimited file with a header row.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The file cannot be opened.
    /// * A row cannot be parsed, or has a different number of fields to the header.
    /// * The header does not contain the `barcode`, `chain` and `compartment` columns.
    pub fn from_path(path: &str, delimiter: u8) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Unable to open file {path}"))?;

        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(file);

        Self::from_csv(&mut rdr).with_context(|| format!("Could not read {path}"))
    }

    pub fn from_csv<R: Read>(rdr: &mut Reader<R>) -> Result<Self> {
        let header = rdr.headers().context("Could not read the header row")?;
        let schema = Schema::from_header(header.iter())?;

        let mut records = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            // row 1 is the header
            let row = result.with_context(|| format!("Could not parse row {}", row + 2))?;
            records.push(schema.record(row.iter()));
        }

        Ok(ChainTable { schema, records })
    }
}

/// Writes the header and records to `writer`, formatting each column with `format`.
///
/// Missing fields are written as empty strings, although filtered records never have any.
///
/// # Returns
///
/// The inner writer, after everything has been flushed to it.
pub fn write_table<W: Write>(
    writer: W,
    schema: &Schema,
    records: &[&ChainRecord],
    format: &OutputFormat,
    delimiter: u8,
) -> Result<W> {
    format.check_width(schema.width())?;

    let mut wtr = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    wtr.write_record(&schema.columns)?;

    for rec in records {
        let row = rec
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| match field {
                Some(v) => format.format_field(idx, v, &schema.columns[idx]),
                None => Ok(Cow::Borrowed("")),
            })
            .collect::<Result<Vec<_>, _>>()?;

        wtr.write_record(row.iter().map(|f| f.as_bytes()))?;
    }

    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("Could not flush output: {}", e.error()))
}

/// Writes a table to `path`. The data is first written into a temporary file in the same
/// directory, and only moved to `path` once everything has been written, so a failure never
/// leaves a partial file behind.
pub fn write_table_to_path(
    path: &str,
    schema: &Schema,
    records: &[&ChainRecord],
    format: &OutputFormat,
    delimiter: u8,
) -> Result<()> {
    // get the directory of the output file
    let mut tempfile_dir = std::path::absolute(path)?;
    tempfile_dir.pop();

    let temp_file = NamedTempFile::new_in(&tempfile_dir)
        .with_context(|| format!("Could not create a temporary file in {}", tempfile_dir.display()))?;

    let mut temp_file = write_table(temp_file, schema, records, format, delimiter)?;
    temp_file.flush()?;

    temp_file
        .persist(path)
        .with_context(|| format!("Could not write to {path}"))?;

    Ok(())
}
