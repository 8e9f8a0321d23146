use crate::error::TcrError;
use crate::format::OutputFormat;

/// The 34-column contig annotation layout used by the lab, with the GEX annotations integrated.
const LAB_10X_FORMAT: &str = "%s,%s,%s,%s,%d,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%s,%d,%d,%s,%s,%d,%d,%s,%s";

/// Enum representing different preset output formats.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum PresetOutputFormats {
    /// Every column is written exactly as it was read
    Verbatim,

    /// 10x `filtered_contig_annotations` with GEX annotations, as used by the lab. Count
    /// columns are written as integers.
    #[value(name = "lab10x")]
    Lab10x,
}

/// Returns the output format for a preset.
///
/// # Arguments
///
/// * `preset` - A reference to a `PresetOutputFormats` enum variant.
/// * `width` - The number of columns in the input file. Only used by `Verbatim`, since the other
///   presets have a fixed width.
pub fn get_output_format(preset: &PresetOutputFormats, width: usize) -> OutputFormat {
    match preset {
        PresetOutputFormats::Verbatim => OutputFormat::verbatim(width),
        PresetOutputFormats::Lab10x => OutputFormat::parse(LAB_10X_FORMAT, ',')
            .unwrap_or_else(|_| unreachable!("the lab format only contains %s and %d")),
    }
}

/// Where the output format comes from: a preset, or a format string given with `--fmt`.
#[derive(Clone, Debug)]
pub enum FormatChoice {
    Preset(PresetOutputFormats),
    Custom(String),
}

impl FormatChoice {
    pub fn from_args(preset: &PresetOutputFormats, fmt: &Option<String>) -> Self {
        match fmt {
            Some(v) => {
                info!("Using specified output format: {v}");
                FormatChoice::Custom(v.clone())
            }
            None => FormatChoice::Preset(*preset),
        }
    }

    /// Builds the output format for a file with `width` columns. Custom formats are always
    /// comma separated, whatever the file delimiter is.
    pub fn resolve(&self, width: usize) -> Result<OutputFormat, TcrError> {
        let format = match self {
            FormatChoice::Preset(preset) => get_output_format(preset, width),
            FormatChoice::Custom(spec) => OutputFormat::parse(spec, ',')?,
        };
        format.check_width(width)?;
        Ok(format)
    }
}
