use thiserror::Error as ThisError;

use crate::structs::{Genealogy, Side};

#[rustfmt::skip]
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("Failed to parse coords: {coord}")]
    CoordParse { coord: String },

    #[error("Position {value:?} is not an integer in coords {coord}")]
    PosParse { coord: String, value: String },

    #[error("Sample size must be at least one, got {n}")]
    SampleSize { n: usize },

    #[error("Sample size {n} is larger than the number of arm lengths (left {left}, right {right})")]
    ShortInput { n: usize, left: usize, right: usize },

    #[error("Allele frequency {freq} is not strictly between 0 and 1. Disable the chance-sharing correction if the frequency is unreliable.")]
    Frequency { freq: f64 },

    #[error("Confidence level {confidence} is not strictly between 0 and 1")]
    Confidence { confidence: f64 },

    #[error("The {side} arm of individual {idx} has an invalid length: {value}")]
    ArmLength { side: Side, idx: usize, value: f64 },

    #[error("Marker density is undefined for {chrom_length_cm} cM covered by {nb_markers} markers")]
    MarkerDensity { chrom_length_cm: f64, nb_markers: usize },

    #[error("{model} genealogy: the corrected sum of segment lengths is not positive ({sum}). Supply more individuals or disable the chance-sharing correction.")]
    NonPositiveLength { model: Genealogy, sum: f64 },

    #[error("Correlated genealogy requires at least two individuals, got {n}")]
    CorrelatedSampleSize { n: usize },

    #[error("The corrected segment lengths have zero variance, the correlation is undefined")]
    ZeroVariance,

    #[error("The correlation between segment lengths is undefined (mean {mean}, variance {variance})")]
    UndefinedCorrelation { mean: f64, variance: f64 },

    #[error("{model} genealogy: invalid Gamma distribution parameters (shape {shape}, rate {rate})")]
    GammaParameters { model: Genealogy, shape: f64, rate: f64 },

    #[error("{model} genealogy: the Gamma quantile at {p} is not finite")]
    Quantile { model: Genealogy, p: f64 },

    #[error(transparent)]
    Stats(#[from] statrs::StatsError),
}
