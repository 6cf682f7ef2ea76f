use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::OffsetTime;

use crate::args::StandardArgs;
use crate::structs::EstimatorConfig;
use crate::subcommands::{allele_freqs, mrca, roh_arms};

#[derive(Parser, Debug)]
#[command(author, version, about, styles=get_styles())]
pub struct Arguments {
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Args, Debug, Clone)]
pub struct LogAndVerbosity {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, default_value_t = 3)]
    pub verbosity: u8,

    /// A file path to save logs to
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Silence all warning and info messages
    #[arg(long)]
    pub silent: bool,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Estimate the age of a mutation based on the Gamma method from flanking arm lengths
    Mrca {
        // Arm lengths file with the columns sample, left_cm and right_cm
        #[command(flatten)]
        args: StandardArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,

        /// Allele frequency used for the chance-sharing correction
        #[arg(long, conflicts_with = "freq_file")]
        freq: Option<f64>,

        /// Allele frequency table from `rohage freqs`, the median frequency is used
        #[arg(long)]
        freq_file: Option<PathBuf>,

        /// Number of individuals to use, defaults to all rows
        #[arg(short = 'n', long)]
        n: Option<usize>,

        #[command(flatten)]
        config: EstimatorConfig,

        /// Also output the estimates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Measure the arms of the runs of homozygosity flanking a variant
    Arms {
        // PLINK .hom file
        #[command(flatten)]
        args: StandardArgs,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,

        /// The variant coordinate, i.e. chr9:27573534
        #[arg(short = 'c', long)]
        coords: String,

        /// Recombination rate file
        #[arg(short = 'r', long)]
        recombination_rates: PathBuf,

        /// List of samples to include (one ID per row)
        #[arg(short = 'S', long, value_delimiter = ' ', num_args = 1.. )]
        samples: Option<Vec<PathBuf>>,
    },

    /// Compute allele frequencies from PLINK .raw and .map files
    Freqs {
        // PLINK .raw file
        #[command(flatten)]
        args: StandardArgs,

        /// PLINK .map file
        map: PathBuf,

        #[command(flatten)]
        log_and_verbosity: LogAndVerbosity,

        /// Drop markers with a frequency of 0 or 1
        #[arg(long)]
        exclude_fixed: bool,

        /// Number of threads
        #[arg(short = 't', long, default_value_t = 8)]
        threads: usize,
    },
}

impl SubCommand {
    pub fn threads(&self) -> usize {
        match self {
            SubCommand::Freqs { threads, .. } => *threads,
            _ => 1,
        }
    }

    #[rustfmt::skip]
    pub fn log_and_verbosity(&self) -> (u8, &Option<PathBuf>, bool) {
        match self {
            SubCommand::Mrca { log_and_verbosity, .. }
            | SubCommand::Arms { log_and_verbosity, .. }
            | SubCommand::Freqs { log_and_verbosity, .. }
            => (log_and_verbosity.verbosity, &log_and_verbosity.log_file, log_and_verbosity.silent),
        }
    }

    #[rustfmt::skip]
    pub fn output(&self) -> PathBuf {
        match self {
            SubCommand::Mrca { args: StandardArgs { output, .. }, ..}
            | SubCommand::Arms { args: StandardArgs { output, .. }, ..}
            | SubCommand::Freqs { args: StandardArgs { output, .. }, ..}
            => output.clone(),
        }
    }
}

pub fn run_args(args: Arguments) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.cmd.threads())
        .build_global()?;

    let (verbosity, log_file, is_silent) = args.cmd.log_and_verbosity();

    let (level, wrtr, _guard) = init_tracing(verbosity, log_file, is_silent)?;

    let timer = time::format_description::parse("[hour]:[minute]:[second].[subsecond digits:3]")?;
    let time_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = OffsetTime::new(time_offset, timer);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(wrtr)
        .with_timer(timer)
        .init();

    let output = args.cmd.output();
    if let Err(e) = std::fs::create_dir_all(&output) {
        return Err(eyre!("Error creating directory {output:?}: {e}"));
    }

    run_cmd(args.cmd)?;

    Ok(())
}

#[rustfmt::skip]
pub fn run_cmd(cmd: SubCommand) -> Result<()> {
    match cmd {
        SubCommand::Mrca { args, freq, freq_file, n, config, json, .. }
            => mrca::run(args, freq, freq_file, n, config, json)?,

        SubCommand::Arms { args, coords, recombination_rates, samples, .. }
            => roh_arms::run(args, coords, recombination_rates, samples)?,

        SubCommand::Freqs { args, map, exclude_fixed, .. }
            => allele_freqs::run(args, map, exclude_fixed)?,
    };
    Ok(())
}

pub fn init_tracing(
    verbosity: u8,
    log_file: &Option<PathBuf>,
    is_silent: bool,
) -> Result<(Level, NonBlocking, WorkerGuard)> {
    let level = if is_silent {
        Level::ERROR
    } else {
        match verbosity {
            0 | 1 => Level::ERROR,
            2 => Level::WARN,
            3 => Level::INFO,
            4 => Level::DEBUG,
            5..=u8::MAX => Level::TRACE,
        }
    };

    // Write logs to stderr or file
    let (wrtr, _guard) = match log_file {
        Some(path) => {
            let file = std::fs::File::options()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    Ok((level, wrtr, _guard))
}

pub fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .header(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .literal(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .invalid(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .valid(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .placeholder(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing() {
        let (level, _, _) = init_tracing(1, &None, false).unwrap();
        assert_eq!(Level::ERROR, level);
        let (level, _, _) = init_tracing(2, &None, false).unwrap();
        assert_eq!(Level::WARN, level);
        let (level, _, _) = init_tracing(3, &None, false).unwrap();
        assert_eq!(Level::INFO, level);
        let (level, _, _) = init_tracing(4, &None, false).unwrap();
        assert_eq!(Level::DEBUG, level);
        let (level, _, _) = init_tracing(5, &None, false).unwrap();
        assert_eq!(Level::TRACE, level);
        let (level, _, _) = init_tracing(5, &None, true).unwrap();
        assert_eq!(Level::ERROR, level);
    }

    #[test]
    fn test_threads() {
        let args = Arguments::parse_from(["rohage", "freqs", "cohort.raw", "cohort.map", "-t", "4"]);
        assert_eq!(4, args.cmd.threads());

        let args = Arguments::parse_from(["rohage", "mrca", "arms.tsv", "--freq", "0.3"]);
        assert_eq!(1, args.cmd.threads());
    }

    #[test]
    fn test_estimator_flags() {
        let args = Arguments::parse_from(["rohage", "mrca", "arms.tsv", "--freq", "0.3"]);
        match args.cmd {
            SubCommand::Mrca { config, freq, .. } => {
                assert_eq!(EstimatorConfig::default(), config);
                assert_eq!(Some(0.3), freq);
            }
            _ => unreachable!(),
        }

        let args = Arguments::parse_from([
            "rohage", "mrca", "arms.tsv", "--no-correction", "--confidence", "0.9", "--markers", "500",
        ]);
        match args.cmd {
            SubCommand::Mrca { config, .. } => {
                assert!(!config.apply_correction);
                assert_eq!(0.9, config.confidence);
                assert_eq!(500, config.nb_markers);
                assert_eq!(100.0, config.chrom_length_cm);
            }
            _ => unreachable!(),
        }

        let res = Arguments::try_parse_from([
            "rohage", "mrca", "arms.tsv", "--freq", "0.3", "--freq-file", "freqs.tsv",
        ]);
        assert!(res.is_err());
    }
}
