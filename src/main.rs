extern crate env_logger;
#[macro_use]
extern crate log;
use std::{
    fs::File,
    io::{prelude::*, stdout, BufWriter},
    path::Path,
};

use anyhow::Result;
use clap::Parser;

use tcrfilter::benchmark::{self, BenchmarkOpts};
use tcrfilter::cli::{self, Cli, Commands};
use tcrfilter::partition::PartitionOpts;
use tcrfilter::pipeline::{self, FilterRun};
use tcrfilter::preset::FormatChoice;

/// Creates a `BufWriter` for the given output option. This allows for an output file to be passed
/// or otherwise will default to using standard output.
///
/// If `output` is `Some`, it creates a file at the specified path and returns a `BufWriter` for it.
/// If `output` is `None`, it returns a `BufWriter` for the standard output.
fn get_writer(output: &Option<String>) -> Result<impl Write> {
    // get output as a BufWriter - equal to stdout if None
    let writer = BufWriter::new(match output {
        Some(ref x) => {
            let file = File::create(Path::new(x))?;
            Box::new(file) as Box<dyn Write + Send>
        }
        None => Box::new(stdout()) as Box<dyn Write + Send>,
    });
    Ok(writer)
}

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    info!("tcrfilter v{}", cli::VERSION);

    match &cli.command {
        Commands::Filter {
            file,
            outfile,
            sample,
            seed,
            compartments,
            by_donor,
            threads,
            preset,
            fmt,
            delimiter,
            report,
        } => {
            let run = FilterRun {
                input: file,
                output: outfile,
                sample: *sample,
                seed: *seed,
                partition: PartitionOpts {
                    compartments: compartments.clone(),
                    by_donor: *by_donor,
                },
                threads: *threads,
                format: FormatChoice::from_args(preset, fmt),
                delimiter: *delimiter,
                report: report.as_deref(),
            };

            pipeline::filter_file(&run)?;
            info!("Completed successfully.")
        }
        Commands::Benchmark {
            file,
            outfile,
            floor,
            seed,
            compartments,
            no_donor_split,
            delimiter,
        } => {
            let opts = BenchmarkOpts {
                floor: usize::try_from(*floor)?,
                seed: *seed,
                partition: PartitionOpts {
                    compartments: compartments.clone(),
                    by_donor: !*no_donor_split,
                },
                delimiter: *delimiter,
            };

            let mut writer = get_writer(outfile)?;
            let points = benchmark::benchmark(file, &mut writer, &opts)?;
            writer.flush()?;

            info!("Completed {} sample sizes.", points.len())
        }
    };
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
