use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::Error;

/// Flanking arm lengths of the shared ancestral segment, one pair per individual, in Morgans.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmLengths {
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl ArmLengths {
    /// Take the first `n` arms from both sides and convert centimorgans to Morgans.
    pub fn from_centimorgans(left_cm: &[f64], right_cm: &[f64], n: usize) -> Result<Self, Error> {
        if n < 1 {
            return Err(Error::SampleSize { n });
        }
        if n > left_cm.len() || n > right_cm.len() {
            return Err(Error::ShortInput {
                n,
                left: left_cm.len(),
                right: right_cm.len(),
            });
        }

        let left = to_morgans(&left_cm[..n], Side::Left)?;
        let right = to_morgans(&right_cm[..n], Side::Right)?;

        Ok(Self { left, right })
    }

    pub fn n(&self) -> usize {
        self.left.len().min(self.right.len())
    }

    /// Mean lengths in centimorgans, the totals reduced by twice `cs_corr` (Morgans)
    pub fn summary(&self, cs_corr: f64) -> LengthSummary {
        let totals: Vec<f64> = self
            .left
            .iter()
            .zip(self.right.iter())
            .map(|(l, r)| (l + r - 2.0 * cs_corr) * 100.)
            .collect();

        LengthSummary {
            mean_left_cm: self.left.iter().map(|l| l * 100.).mean(),
            mean_right_cm: self.right.iter().map(|r| r * 100.).mean(),
            mean_total_cm: totals.mean(),
        }
    }
}

fn to_morgans(lengths: &[f64], side: Side) -> Result<Vec<f64>, Error> {
    lengths
        .iter()
        .enumerate()
        .map(|(idx, &value)| {
            if value.is_finite() && value >= 0.0 {
                Ok(value / 100.)
            } else {
                Err(Error::ArmLength { side, idx, value })
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Genealogy {
    Independent,
    Correlated,
}

impl std::fmt::Display for Genealogy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Self::Independent => write!(f, "Independent"),
            Self::Correlated => write!(f, "Correlated"),
        }
    }
}

/// Parameters of a single estimation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct EstimatorConfig {
    /// Two-sided confidence level of the age intervals
    #[cfg_attr(feature = "clap", arg(long, default_value_t = 0.95))]
    pub confidence: f64,

    /// Do not correct for chance sharing of homozygous markers
    #[cfg_attr(feature = "clap", arg(long = "no-correction", action = clap::ArgAction::SetFalse))]
    pub apply_correction: bool,

    /// Length of the region the ROH were called on (cM)
    #[cfg_attr(feature = "clap", arg(long, default_value_t = 100.0))]
    pub chrom_length_cm: f64,

    /// Number of markers the ROH were called with
    #[cfg_attr(feature = "clap", arg(long = "markers", default_value_t = 1000))]
    pub nb_markers: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            confidence: 0.95,
            apply_correction: true,
            chrom_length_cm: 100.0,
            nb_markers: 1000,
        }
    }
}

/// Age in generations with its confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeEstimate {
    pub tau: f64,
    pub ci: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedEstimate {
    pub tau: f64,
    pub ci: (f64, f64),
    pub rho: f64,
    /// Effective sample size used for the interval
    pub n_star: f64,
}

/// Mean arm lengths of the individuals in centimorgans
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthSummary {
    pub mean_left_cm: f64,
    pub mean_right_cm: f64,
    /// Both arms minus twice the chance-sharing correction
    pub mean_total_cm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub n: usize,
    /// Two-sided confidence level of both intervals
    pub confidence: f64,
    /// Chance-sharing correction in Morgans
    pub cs_correction: f64,
    pub lengths: LengthSummary,
    pub independent: AgeEstimate,
    pub correlated: CorrelatedEstimate,
}
