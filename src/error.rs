use thiserror::Error;

#[derive(Error, Debug)]
pub enum TcrError {
    #[error(
        "required column `{column}` not found in the header:
    {header}
suggestion: the input should be a 10x contig annotation file with GEX annotations integrated"
    )]
    MissingColumn { column: String, header: String },

    #[error(
        "output format has {spec} columns, but the input has {header} columns.
suggestion: pass --fmt with one specifier per column, or use --preset verbatim"
    )]
    FormatWidthMismatch { spec: usize, header: usize },

    #[error("invalid format specifier `{token}` at column {column}: should be `%s` or `%d`")]
    InvalidFormatSpec { token: String, column: usize },

    #[error("value `{value}` in column `{column}` cannot be formatted as an integer (`%d`)")]
    NonNumericValue { value: String, column: String },

    #[error("delimiter must be a single ASCII character, got `{0}`")]
    InvalidDelimiter(String),
}
