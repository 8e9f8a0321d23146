use crate::error::TcrError;

pub const BARCODE_COLUMN: &str = "barcode";
pub const CHAIN_COLUMN: &str = "chain";
pub const COMPARTMENT_COLUMN: &str = "compartment";
pub const DONOR_COLUMN: &str = "donor";

/// Field values which are read as missing, in addition to the empty string. These are the
/// conventional null markers written by spreadsheet and dataframe tools.
const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns true if a raw field value should be treated as missing.
pub fn is_missing(value: &str) -> bool {
    value.is_empty() || NULL_TOKENS.contains(&value)
}

/// The T-cell receptor chain of a record.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Chain {
    /// `TRA`
    Alpha,
    /// `TRB`
    Beta,
    /// Anything else, including unassigned or missing chains
    Other,
}

impl Chain {
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("TRA") => Chain::Alpha,
            Some("TRB") => Chain::Beta,
            _ => Chain::Other,
        }
    }
}

/// A single row of the contig annotation table.
///
/// Every field of the row is kept in `fields`, in header order, so that the row can be written
/// back out unchanged. The columns which the filter and partitioner look at are also extracted.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainRecord {
    pub cell_id: Option<String>,
    pub chain: Chain,
    pub compartment: Option<String>,
    pub donor: Option<String>,
    pub fields: Vec<Option<String>>,
}

impl ChainRecord {
    /// A record is complete if none of its fields are missing.
    pub fn is_complete(&self) -> bool {
        self.fields.iter().all(Option::is_some)
    }

    pub fn cell_id(&self) -> Option<&str> {
        self.cell_id.as_deref()
    }

    pub fn compartment(&self) -> Option<&str> {
        self.compartment.as_deref()
    }

    pub fn donor(&self) -> Option<&str> {
        self.donor.as_deref()
    }
}

/// The column layout of an input file, with the positions of the columns that are needed
/// for filtering.
#[derive(Clone, Debug)]
pub struct Schema {
    pub columns: Vec<String>,
    barcode: usize,
    chain: usize,
    compartment: usize,
    donor: Option<usize>,
}

impl Schema {
    /// Builds a schema from a header row.
    ///
    /// # Errors
    ///
    /// Returns `TcrError::MissingColumn` if the `barcode`, `chain` or `compartment` columns are
    /// absent. The `donor` column is optional here; see `Schema::require_donor`.
    pub fn from_header<I, S>(header: I) -> Result<Self, TcrError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns: Vec<String> = header.into_iter().map(|c| c.as_ref().to_string()).collect();

        let position = |name: &str| columns.iter().position(|c| c == name);
        let required = |name: &str| {
            position(name).ok_or_else(|| TcrError::MissingColumn {
                column: name.to_string(),
                header: columns.join(","),
            })
        };

        Ok(Schema {
            barcode: required(BARCODE_COLUMN)?,
            chain: required(CHAIN_COLUMN)?,
            compartment: required(COMPARTMENT_COLUMN)?,
            donor: position(DONOR_COLUMN),
            columns,
        })
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Checks that the schema has a `donor` column, for donor partitioning.
    pub fn require_donor(&self) -> Result<usize, TcrError> {
        self.donor.ok_or_else(|| TcrError::MissingColumn {
            column: DONOR_COLUMN.to_string(),
            header: self.columns.join(","),
        })
    }

    /// Converts raw field values into a `ChainRecord`. Null markers become `None`.
    pub fn record<I, S>(&self, values: I) -> ChainRecord
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Vec<Option<String>> = values
            .into_iter()
            .map(|v| {
                let v = v.as_ref();
                (!is_missing(v)).then(|| v.to_string())
            })
            .collect();

        let field = |idx: usize| fields.get(idx).cloned().flatten();

        ChainRecord {
            cell_id: field(self.barcode),
            chain: Chain::from_label(fields.get(self.chain).and_then(|c| c.as_deref())),
            compartment: field(self.compartment),
            donor: self.donor.and_then(field),
            fields,
        }
    }
}
