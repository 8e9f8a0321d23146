use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Parser, Subcommand};

use crate::preset::PresetOutputFormats;

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🧬 tcrfilter version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   QC filtering of paired TCR alpha/beta chains from 10x contig annotations";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    flatten_help = true,
    styles = STYLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Keep only cells with a paired alpha and beta chain, and at most one beta chain
    #[command(arg_required_else_help = true)]
    Filter {
        /// the input .csv file
        #[arg(short, long)]
        file: String,

        /// the output .csv file
        #[arg(short, long)]
        outfile: String,

        /// sample N cells from the input file before filtering
        #[arg(short = 'n', long)]
        sample: Option<usize>,

        /// seed for sampling, for reproducible samples
        #[arg(long, requires = "sample")]
        seed: Option<u64>,

        /// compartments to filter, in output order. cells are judged separately in each
        /// compartment, and rows from any other compartment are dropped.
        #[arg(
            long,
            value_delimiter = ',',
            default_values_t = vec![String::from("pbmc"), String::from("tonsil")]
        )]
        compartments: Vec<String>,

        /// split by donor before splitting by compartment. requires a `donor` column
        #[arg(long, action)]
        by_donor: bool,

        /// the number of threads to use
        #[arg(short, long, default_value_t = 4)]
        threads: usize,

        /// output column format preset
        #[arg(long, value_enum, conflicts_with = "fmt", default_value = "verbatim")]
        preset: PresetOutputFormats,

        /// custom output column format, with one `%s` (as read) or `%d` (integer) per column.
        /// for example, for a four-column file:
        ///     %s,%s,%d,%s
        #[arg(long, verbatim_doc_comment)]
        fmt: Option<String>,

        /// field delimiter of the input and output files
        #[arg(
            short,
            long,
            value_parser = |x: &str| crate::table::parse_delimiter(x),
            default_value = ","
        )]
        delimiter: u8,

        /// write a JSON report of the run to this file
        #[arg(long)]
        report: Option<String>,
    },

    /// Measure filtering time at increasing sample sizes (doubling from --floor)
    #[command(arg_required_else_help = true)]
    Benchmark {
        /// the input .csv file
        #[arg(short, long)]
        file: String,

        /// the output file for `sample_size,elapsed_ns` lines. defaults to standard output
        #[arg(short, long)]
        outfile: Option<String>,

        /// the smallest sample size
        #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u64).range(1..))]
        floor: u64,

        /// seed for sampling, for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// compartments to filter, in processing order
        #[arg(
            long,
            value_delimiter = ',',
            default_values_t = vec![String::from("pbmc"), String::from("tonsil")]
        )]
        compartments: Vec<String>,

        /// do not split by donor before splitting by compartment
        #[arg(long, action)]
        no_donor_split: bool,

        /// field delimiter of the input file
        #[arg(
            short,
            long,
            value_parser = |x: &str| crate::table::parse_delimiter(x),
            default_value = ","
        )]
        delimiter: u8,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn filter_defaults() {
        let cli = Cli::parse_from(["tcrfilter", "filter", "-f", "in.csv", "-o", "out.csv"]);
        let Commands::Filter {
            compartments,
            by_donor,
            delimiter,
            sample,
            ..
        } = cli.command
        else {
            panic!("expected the filter subcommand");
        };
        assert_eq!(compartments, vec!["pbmc", "tonsil"]);
        assert!(!by_donor);
        assert_eq!(delimiter, b',');
        assert_eq!(sample, None);
    }

    #[test]
    fn preset_conflicts_with_fmt() {
        let res = Cli::try_parse_from([
            "tcrfilter", "filter", "-f", "a", "-o", "b", "--preset", "lab10x", "--fmt", "%s",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn benchmark_floor_must_be_positive() {
        let res = Cli::try_parse_from(["tcrfilter", "benchmark", "-f", "a", "--floor", "0"]);
        assert!(res.is_err());
    }
}
