use std::borrow::Cow;

use crate::error::TcrError;

/// How a single output column is written.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColumnFormat {
    /// `%s`: the field is written exactly as it was read
    Text,
    /// `%d`: the field is parsed as a number and written as an integer, truncated toward zero
    Integer,
}

/// A fixed, per-column output format, written as a list of printf-style specifiers such as
/// `%s,%s,%d`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputFormat {
    columns: Vec<ColumnFormat>,
}

impl OutputFormat {
    /// Every column written verbatim.
    pub fn verbatim(width: usize) -> Self {
        OutputFormat {
            columns: vec![ColumnFormat::Text; width],
        }
    }

    /// Parses a format string. Specifiers are separated by `delimiter`, and surrounding
    /// whitespace is ignored.
    pub fn parse(spec: &str, delimiter: char) -> Result<Self, TcrError> {
        let columns = spec
            .split(delimiter)
            .enumerate()
            .map(|(column, token)| match token.trim() {
                "%s" => Ok(ColumnFormat::Text),
                "%d" => Ok(ColumnFormat::Integer),
                other => Err(TcrError::InvalidFormatSpec {
                    token: other.to_string(),
                    column,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OutputFormat { columns })
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnFormat] {
        &self.columns
    }

    /// The format is fixed ahead of time, so it has to agree with the file being written.
    pub fn check_width(&self, header_width: usize) -> Result<(), TcrError> {
        if self.width() != header_width {
            return Err(TcrError::FormatWidthMismatch {
                spec: self.width(),
                header: header_width,
            });
        }
        Ok(())
    }

    /// Formats the value of column `idx`. `column` is the column name, used for errors.
    pub fn format_field<'a>(
        &self,
        idx: usize,
        value: &'a str,
        column: &str,
    ) -> Result<Cow<'a, str>, TcrError> {
        match self.columns.get(idx) {
            Some(ColumnFormat::Integer) => format_integer(value)
                .map(Cow::Owned)
                .ok_or_else(|| TcrError::NonNumericValue {
                    value: value.to_string(),
                    column: column.to_string(),
                }),
            _ => Ok(Cow::Borrowed(value)),
        }
    }
}

/// printf `%d` semantics for a textual number: integers pass through, floats are truncated.
fn format_integer(value: &str) -> Option<String> {
    let value = value.trim();
    if let Ok(v) = value.parse::<i64>() {
        return Some(v.to_string());
    }
    let v = value.parse::<f64>().ok()?;
    v.is_finite().then(|| (v.trunc() as i64).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_spec() {
        let fmt = OutputFormat::parse("%s,%d, %s", ',').unwrap();
        assert_eq!(
            fmt.columns(),
            &[ColumnFormat::Text, ColumnFormat::Integer, ColumnFormat::Text]
        );
    }

    #[test]
    fn parse_rejects_unknown_specifier() {
        let err = OutputFormat::parse("%s,%f", ',').unwrap_err();
        assert!(matches!(err, TcrError::InvalidFormatSpec { column: 1, .. }));
    }

    #[test]
    fn integer_truncates_floats() {
        let fmt = OutputFormat::parse("%d", ',').unwrap();
        assert_eq!(fmt.format_field(0, "3.0", "umis").unwrap(), "3");
        assert_eq!(fmt.format_field(0, "12.9", "umis").unwrap(), "12");
        assert_eq!(fmt.format_field(0, "-2.5", "umis").unwrap(), "-2");
        assert_eq!(fmt.format_field(0, "41", "umis").unwrap(), "41");
    }

    #[test]
    fn integer_rejects_text() {
        let fmt = OutputFormat::parse("%d", ',').unwrap();
        let err = fmt.format_field(0, "TRB", "chain").unwrap_err();
        assert!(matches!(err, TcrError::NonNumericValue { .. }));
        assert!(fmt.format_field(0, "inf", "reads").is_err());
    }

    #[test]
    fn text_is_verbatim() {
        let fmt = OutputFormat::verbatim(2);
        assert_eq!(fmt.format_field(1, "3.50", "x").unwrap(), "3.50");
    }

    #[test]
    fn width_mismatch() {
        let fmt = OutputFormat::verbatim(3);
        assert!(fmt.check_width(3).is_ok());
        assert!(matches!(
            fmt.check_width(4),
            Err(TcrError::FormatWidthMismatch { spec: 3, header: 4 })
        ));
    }
}
