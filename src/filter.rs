use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::record::{Chain, ChainRecord};

/// Counts describing one run of the chain filter.
///
/// Cells are counted per partition: a barcode which appears in two compartments is counted once
/// in each, since it is judged separately in each.
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterStatistics {
    pub input_rows: usize,
    pub incomplete_rows: usize,
    pub cells: usize,
    pub paired_cells: usize,
    pub multi_beta_cells: usize,
    pub retained_rows: usize,
    pub retained_cells: usize,
}

impl FilterStatistics {
    /// Adds the counts of another (disjoint) partition to this one.
    pub fn merge(&mut self, other: &FilterStatistics) {
        self.input_rows += other.input_rows;
        self.incomplete_rows += other.incomplete_rows;
        self.cells += other.cells;
        self.paired_cells += other.paired_cells;
        self.multi_beta_cells += other.multi_beta_cells;
        self.retained_rows += other.retained_rows;
        self.retained_cells += other.retained_cells;
    }
}

/// Cell-level verdicts for one partition.
struct CellSets<'a> {
    /// Cells with at least one alpha and at least one beta chain
    paired: HashSet<&'a str>,
    /// Cells with more than one beta chain
    multi_beta: HashSet<&'a str>,
}

impl CellSets<'_> {
    fn keeps(&self, record: &ChainRecord) -> bool {
        record
            .cell_id()
            .is_some_and(|id| self.paired.contains(id) && !self.multi_beta.contains(id))
    }
}

/// Only complete records take part in pairing, so `records` must already have had incomplete
/// rows removed.
fn cell_sets<'a>(records: &[&'a ChainRecord]) -> CellSets<'a> {
    let mut alpha: HashSet<&'a str> = HashSet::new();
    let mut beta_counts: HashMap<&'a str, usize> = HashMap::new();

    for &rec in records {
        let Some(id) = rec.cell_id() else { continue };
        match rec.chain {
            Chain::Alpha => {
                alpha.insert(id);
            }
            Chain::Beta => *beta_counts.entry(id).or_insert(0) += 1,
            Chain::Other => {}
        }
    }

    let paired = beta_counts
        .keys()
        .filter(|id| alpha.contains(*id))
        .copied()
        .collect();

    let multi_beta = beta_counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, _)| *id)
        .collect();

    CellSets { paired, multi_beta }
}

/// Removes every cell which does not have a paired alpha and beta chain, or which has more than
/// one beta chain. Records with a missing field are dropped before any cell is judged.
///
/// The records must all come from one compartment (see `crate::partition`). Input order is
/// preserved, and the input is not modified.
///
/// A cell is kept with any number of alpha chains; only beta chains are limited to one.
///
/// # Example
///
/// ```
/// use tcrfilter::filter::filter_cells;
/// use tcrfilter::record::Schema;
///
/// let schema = Schema::from_header(["barcode", "chain", "compartment"]).unwrap();
/// let records = vec![
///     schema.record(["C1", "TRA", "pbmc"]),
///     schema.record(["C1", "TRB", "pbmc"]),
///     schema.record(["C2", "TRB", "pbmc"]),
///     schema.record(["C2", "TRB", "pbmc"]),
/// ];
/// let refs: Vec<_> = records.iter().collect();
///
/// let kept = filter_cells(&refs);
/// assert_eq!(kept.len(), 2);
/// assert!(kept.iter().all(|r| r.cell_id() == Some("C1")));
/// ```
pub fn filter_cells<'a>(records: &[&'a ChainRecord]) -> Vec<&'a ChainRecord> {
    let complete: Vec<&'a ChainRecord> =
        records.iter().copied().filter(|r| r.is_complete()).collect();

    let sets = cell_sets(&complete);

    complete.into_iter().filter(|r| sets.keeps(r)).collect()
}

/// Same as `filter_cells`, but also counts what was removed and why.
pub fn filter_cells_with_stats<'a>(
    records: &[&'a ChainRecord],
) -> (Vec<&'a ChainRecord>, FilterStatistics) {
    let complete: Vec<&'a ChainRecord> =
        records.iter().copied().filter(|r| r.is_complete()).collect();

    let sets = cell_sets(&complete);
    let cells: HashSet<&str> = complete.iter().filter_map(|r| r.cell_id()).collect();

    let kept: Vec<&'a ChainRecord> = complete.iter().copied().filter(|r| sets.keeps(r)).collect();
    let retained_cells: HashSet<&str> = kept.iter().filter_map(|r| r.cell_id()).collect();

    let stats = FilterStatistics {
        input_rows: records.len(),
        incomplete_rows: records.len() - complete.len(),
        cells: cells.len(),
        paired_cells: sets.paired.len(),
        multi_beta_cells: sets.multi_beta.len(),
        retained_rows: kept.len(),
        retained_cells: retained_cells.len(),
    };

    (kept, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Schema;

    fn schema() -> Schema {
        Schema::from_header(["barcode", "chain", "compartment", "cdr3", "umis"]).unwrap()
    }

    fn rec(cell: &str, chain: &str, cdr3: &str) -> ChainRecord {
        schema().record([cell, chain, "X", cdr3, "3"])
    }

    fn kept_ids(records: &[ChainRecord]) -> Vec<String> {
        let refs: Vec<&ChainRecord> = records.iter().collect();
        filter_cells(&refs)
            .iter()
            .map(|r| format!("{}:{:?}", r.cell_id().unwrap(), r.chain))
            .collect()
    }

    #[test]
    fn paired_cell_is_kept() {
        let records = vec![rec("C1", "TRA", "CAVR"), rec("C1", "TRB", "CASS")];
        assert_eq!(kept_ids(&records), vec!["C1:Alpha", "C1:Beta"]);
    }

    #[test]
    fn duplicate_beta_without_alpha_is_removed() {
        let records = vec![
            rec("C1", "TRA", "CAVR"),
            rec("C1", "TRB", "CASS"),
            rec("C2", "TRB", "CASS"),
            rec("C2", "TRB", "CASR"),
        ];
        assert_eq!(kept_ids(&records), vec!["C1:Alpha", "C1:Beta"]);
    }

    #[test]
    fn two_alphas_one_beta_is_kept() {
        let records = vec![
            rec("C1", "TRA", "CAVR"),
            rec("C1", "TRA", "CAMS"),
            rec("C1", "TRB", "CASS"),
        ];
        assert_eq!(kept_ids(&records).len(), 3);
    }

    #[test]
    fn one_alpha_two_betas_is_removed_entirely() {
        let records = vec![
            rec("C1", "TRA", "CAVR"),
            rec("C1", "TRB", "CASS"),
            rec("C1", "TRB", "CASR"),
        ];
        assert!(kept_ids(&records).is_empty());
    }

    #[test]
    fn unpaired_cells_are_removed() {
        let records = vec![rec("A", "TRA", "CAVR"), rec("B", "TRB", "CASS")];
        assert!(kept_ids(&records).is_empty());
    }

    #[test]
    fn incomplete_beta_does_not_pair() {
        let records = vec![rec("C1", "TRA", "CAVR"), rec("C1", "TRB", "None")];
        assert!(kept_ids(&records).is_empty());
    }

    #[test]
    fn incomplete_beta_does_not_count_as_duplicate() {
        let records = vec![
            rec("C1", "TRA", "CAVR"),
            rec("C1", "TRB", "CASS"),
            rec("C1", "TRB", ""),
        ];
        assert_eq!(kept_ids(&records), vec!["C1:Alpha", "C1:Beta"]);
    }

    #[test]
    fn other_chains_follow_the_cell() {
        let records = vec![
            rec("C1", "TRA", "CAVR"),
            rec("C1", "Multi", "CAGG"),
            rec("C1", "TRB", "CASS"),
            rec("C2", "Multi", "CAGG"),
            rec("C2", "TRA", "CAVR"),
        ];
        assert_eq!(kept_ids(&records), vec!["C1:Alpha", "C1:Other", "C1:Beta"]);
    }

    #[test]
    fn duplicate_alpha_is_not_multi_beta() {
        // two identical alpha rows must not be mistaken for a multi-beta cell
        let records = vec![
            rec("C1", "TRA", "CAVR"),
            rec("C1", "TRA", "CAVR"),
            rec("C1", "TRB", "CASS"),
        ];
        assert_eq!(kept_ids(&records).len(), 3);
    }

    #[test]
    fn empty_input() {
        assert!(filter_cells(&[]).is_empty());
        let (kept, stats) = filter_cells_with_stats(&[]);
        assert!(kept.is_empty());
        assert_eq!(stats, FilterStatistics::default());
    }

    #[test]
    fn filtering_is_idempotent() {
        let records = vec![
            rec("C1", "TRA", "CAVR"),
            rec("C1", "TRB", "CASS"),
            rec("C2", "TRA", "CAVR"),
            rec("C3", "TRB", "CASS"),
            rec("C3", "TRB", "CASS"),
            rec("C3", "TRA", "CAVR"),
            rec("C4", "TRA", "NA"),
            rec("C4", "TRB", "CASS"),
        ];
        let refs: Vec<&ChainRecord> = records.iter().collect();

        let once = filter_cells(&refs);
        let twice = filter_cells(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn repeated_calls_agree() {
        let records = vec![rec("C1", "TRA", "CAVR"), rec("C1", "TRB", "CASS")];
        let refs: Vec<&ChainRecord> = records.iter().collect();
        assert_eq!(filter_cells(&refs), filter_cells(&refs));
    }

    #[test]
    fn statistics() {
        let records = vec![
            rec("C1", "TRA", "CAVR"),
            rec("C1", "TRB", "CASS"),
            rec("C2", "TRA", "CAVR"),
            rec("C2", "TRB", "CASS"),
            rec("C2", "TRB", "CASR"),
            rec("C3", "TRA", "CAVR"),
            rec("C4", "TRB", "NaN"),
        ];
        let refs: Vec<&ChainRecord> = records.iter().collect();
        let (kept, stats) = filter_cells_with_stats(&refs);

        assert_eq!(kept, filter_cells(&refs));
        assert_eq!(
            stats,
            FilterStatistics {
                input_rows: 7,
                incomplete_rows: 1,
                cells: 3,
                paired_cells: 2,
                multi_beta_cells: 1,
                retained_rows: 2,
                retained_cells: 1,
            }
        );
    }

    #[test]
    fn merge_statistics() {
        let mut a = FilterStatistics {
            input_rows: 4,
            retained_rows: 2,
            ..Default::default()
        };
        let b = FilterStatistics {
            input_rows: 3,
            cells: 2,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.input_rows, 7);
        assert_eq!(a.retained_rows, 2);
        assert_eq!(a.cells, 2);
    }
}
