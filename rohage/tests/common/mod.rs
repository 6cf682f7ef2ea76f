#![allow(dead_code)]
use std::path::PathBuf;

use rohage::args::StandardArgs;

pub const TEST_HOM: &str = "tests/data/cohort.hom";
pub const TEST_RAW: &str = "tests/data/cohort.raw";
pub const TEST_MAP: &str = "tests/data/cohort.map";
pub const TEST_ARMS: &str = "tests/data/roh_arms.tsv";
pub const TEST_FREQS: &str = "tests/data/allele_freqs.tsv";
pub const REC_RATES: &str = "tests/data/recombination_rates.tsv";
pub const AFFECTED: &str = "tests/data/affected.ids";
pub const OUTDIR: &str = "tests/results";
pub const COORDS: &str = "chr9:50000";

pub fn standard_args(file: &str, prefix: &str) -> StandardArgs {
    StandardArgs {
        file: PathBuf::from(file),
        output: PathBuf::from(OUTDIR),
        prefix: Some(prefix.to_string()),
    }
}

#[cfg(feature = "clap")]
pub fn silent_verbosity() -> rohage::clap::LogAndVerbosity {
    rohage::clap::LogAndVerbosity {
        verbosity: 1,
        log_file: None,
        silent: false,
    }
}
