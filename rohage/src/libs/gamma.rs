use statrs::distribution::{ContinuousCDF, Gamma};
use statrs::statistics::Statistics;

use crate::error::Error;
use crate::structs::{
    AgeEstimate, ArmLengths, CorrelatedEstimate, EstimationResult, EstimatorConfig, Genealogy,
};

/// Tolerated probability of a homozygous run arising by chance
const FALSE_SHARING: f64 = 0.01;

/// Smallest sample for which the independent genealogy is corrected for chance sharing
const MIN_CORRECTED_N: usize = 10;

/// Expected length (Morgans) of a homozygous run shared by chance alone.
///
/// `p` is the probability of homozygosity at a biallelic marker under random mating and
/// `ln(e) / ln(p)` the number of consecutive homozygous markers expected by chance. Alleles far
/// from 0.5 push `p` towards one and the correction up.
pub fn chance_sharing_correction(median_freq: f64, chrom_length_cm: f64, nb_markers: usize) -> f64 {
    let p = median_freq.powi(2) + (1.0 - median_freq).powi(2);
    let phi = (chrom_length_cm / 100.) / nb_markers as f64;
    let loci = FALSE_SHARING.ln() / p.ln();
    loci * phi
}

///
/// Date a founder mutation from the lengths (cM) of the shared segments flanking it.
///
/// The first `n` left and right arms are used. Both genealogies are always estimated, the
/// caller decides which one to report.
///
pub fn estimate_mutation_age(
    left_cm: &[f64],
    right_cm: &[f64],
    median_freq: f64,
    n: usize,
    config: &EstimatorConfig,
) -> Result<EstimationResult, Error> {
    validate_config(config, median_freq)?;

    let arms = ArmLengths::from_centimorgans(left_cm, right_cm, n)?;

    let cs_corr = match config.apply_correction {
        true => chance_sharing_correction(median_freq, config.chrom_length_cm, config.nb_markers),
        false => 0.0,
    };
    tracing::debug!("Individuals: {}, chance-sharing correction: {cs_corr:.5} M", arms.n());

    let lengths = arms.summary(cs_corr);
    tracing::debug!(
        "Mean lengths: left {:.2} cM, right {:.2} cM, corrected total {:.2} cM",
        lengths.mean_left_cm,
        lengths.mean_right_cm,
        lengths.mean_total_cm
    );

    let independent = independent(&arms.left, &arms.right, config.confidence, cs_corr)?;
    let correlated = correlated(arms.left, arms.right, config.confidence, cs_corr)?;

    tracing::debug!(
        "Independent genealogy: age {:.3} CI ({:.3}, {:.3})",
        independent.tau,
        independent.ci.0,
        independent.ci.1
    );
    tracing::debug!(
        "Correlated genealogy: age {:.3} CI ({:.3}, {:.3}), rho {:.3}, n* {:.3}",
        correlated.tau,
        correlated.ci.0,
        correlated.ci.1,
        correlated.rho,
        correlated.n_star
    );

    Ok(EstimationResult {
        n,
        confidence: config.confidence,
        cs_correction: cs_corr,
        lengths,
        independent,
        correlated,
    })
}

fn validate_config(config: &EstimatorConfig, median_freq: f64) -> Result<(), Error> {
    let confidence = config.confidence;
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(Error::Confidence { confidence });
    }

    if config.apply_correction {
        if !(median_freq > 0.0 && median_freq < 1.0) {
            return Err(Error::Frequency { freq: median_freq });
        }
        if !(config.chrom_length_cm.is_finite() && config.chrom_length_cm > 0.0)
            || config.nb_markers == 0
        {
            return Err(Error::MarkerDensity {
                chrom_length_cm: config.chrom_length_cm,
                nb_markers: config.nb_markers,
            });
        }
    }

    Ok(())
}

/// Independent genealogy, every arm of every individual is its own observation.
/// Lengths are in Morgans.
pub fn independent(
    l_lengths: &[f64],
    r_lengths: &[f64],
    cc: f64,
    cs_corr: f64,
) -> Result<AgeEstimate, Error> {
    let n_len = l_lengths.len().min(r_lengths.len());
    if n_len < 1 {
        return Err(Error::SampleSize { n: n_len });
    }
    let n = n_len as f64;

    // The correction is noisier than the signal in small samples
    let cs_corr = if n_len < MIN_CORRECTED_N { 0.0 } else { cs_corr };

    let l_sum: f64 = l_lengths[..n_len].iter().sum();
    let r_sum: f64 = r_lengths[..n_len].iter().sum();

    let length_corr = (l_sum + r_sum - 2.0 * (n - 1.0) * cs_corr) / (2.0 * n);

    // Sum of ancestral segment lengths with corrections
    let sum = l_sum + r_sum + 2.0 * length_corr - 2.0 * (n - 1.0) * cs_corr;
    let sum = positive_sum(Genealogy::Independent, sum)?;

    gamma_age(Genealogy::Independent, n, n, n, sum, cc)
}

/// Correlated genealogy, the total shared lengths of the individuals may be correlated.
/// Lengths are in Morgans.
pub fn correlated(
    l_lengths: Vec<f64>,
    r_lengths: Vec<f64>,
    cc: f64,
    cs_corr: f64,
) -> Result<CorrelatedEstimate, Error> {
    let n_len = l_lengths.len().min(r_lengths.len());
    if n_len < 2 {
        return Err(Error::CorrelatedSampleSize { n: n_len });
    }
    let n = n_len as f64;

    let lengths = correlated_lengths(l_lengths, r_lengths, cs_corr);
    let sum = positive_sum(Genealogy::Correlated, lengths.iter().sum())?;

    let rho_hat = correlation(&lengths)?;

    // The point estimate is bias corrected with the clamped size, the interval uses the
    // overridden one
    let n_clamped = clamped_sample_size(n, rho_hat);
    let n_star = effective_sample_size(n, rho_hat);
    tracing::debug!("Correlated genealogy: rho {rho_hat:.3}, n* {n_clamped:.3} -> {n_star:.3}");

    let AgeEstimate { tau, ci } =
        gamma_age(Genealogy::Correlated, n, n_clamped, n_star, sum, cc)?;

    Ok(CorrelatedEstimate {
        tau,
        ci,
        rho: rho_hat,
        n_star,
    })
}

/// Corrected total length per individual. The longest left and the longest right arm absorb
/// the aggregate length correction.
fn correlated_lengths(mut l_lengths: Vec<f64>, mut r_lengths: Vec<f64>, cs_corr: f64) -> Vec<f64> {
    let n_len = l_lengths.len().min(r_lengths.len());
    l_lengths.truncate(n_len);
    r_lengths.truncate(n_len);

    let l_sum: f64 = l_lengths.iter().sum();
    let r_sum: f64 = r_lengths.iter().sum();
    tracing::debug!("Sums: left {l_sum:.3}, right {r_sum:.3}");
    let n = n_len as f64;

    let length_corr = (l_sum + r_sum - 2.0 * (n - 1.0) * cs_corr) / (2.0 * n);

    if let Some(highest_l) = l_lengths.iter_mut().max_by(|a, b| a.total_cmp(b)) {
        *highest_l += length_corr + cs_corr;
    }
    if let Some(highest_r) = r_lengths.iter_mut().max_by(|a, b| a.total_cmp(b)) {
        *highest_r += length_corr + cs_corr;
    }

    l_lengths
        .iter()
        .zip(r_lengths.iter())
        .map(|(a, b)| a + b - 2.0 * cs_corr)
        .collect()
}

/// Method of moments estimate of the correlation between the total lengths of individuals
pub fn correlation(lengths: &[f64]) -> Result<f64, Error> {
    if lengths.len() < 2 {
        return Err(Error::CorrelatedSampleSize { n: lengths.len() });
    }
    let n = lengths.len() as f64;

    let mean = lengths.mean();
    let variance = lengths.variance();

    if !mean.is_finite() || !variance.is_finite() {
        return Err(Error::UndefinedCorrelation { mean, variance });
    }
    if variance == 0.0 {
        return Err(Error::ZeroVariance);
    }

    let term1 = n * mean.powi(2) + variance * (n - 1.0);
    let term2 = n * mean.powi(2) - variance * (1.0 + 2.0 * n);

    Ok(term2 / term1)
}

/// Effective number of independent individuals given the correlation `rho`, limited to
/// `[-n, n]`. Negative for `rho < -1/(n-1)`.
pub fn clamped_sample_size(n: f64, rho: f64) -> f64 {
    (n / (1.0 + (n - 1.0) * rho)).clamp(-n, n)
}

/// Effective sample size of the Gamma interval. Negative correlations are overridden:
/// below `-2/(n-1)` the magnitude of `rho` is used, up to `-1/(n-1)` the individuals count
/// as independent.
///
/// Both thresholds `-2/(n-1)` and `-1/(n-1)` resolve to `n`.
pub fn effective_sample_size(n: f64, rho: f64) -> f64 {
    if rho < -2.0 / (n - 1.0) {
        n / (1.0 + (n - 1.0) * rho.abs())
    } else if rho <= -1.0 / (n - 1.0) {
        n
    } else {
        clamped_sample_size(n, rho)
    }
}

fn positive_sum(model: Genealogy, sum: f64) -> Result<f64, Error> {
    if sum.is_finite() && sum > 0.0 {
        Ok(sum)
    } else {
        Err(Error::NonPositiveLength { model, sum })
    }
}

/// Age from the corrected sum of lengths. `n` is the number of individuals, `n_bias` the
/// (possibly effective) sample size of the bias correction and `n_shape` the one of the
/// interval.
fn gamma_age(
    model: Genealogy,
    n: f64,
    n_bias: f64,
    n_shape: f64,
    sum: f64,
    cc: f64,
) -> Result<AgeEstimate, Error> {
    // Gamma function MLE bias correction factor
    let b_c = (2.0 * n_bias - 1.0) / (2.0 * n_bias);

    let (g_l, g_u) = gamma_quantiles(model, 2.0 * n_shape, 2.0 * n_shape * b_c, cc)?;

    // Minimum variance unbiased estimate of T
    // Compare it with the pure MLE i.e. the mean of the gamma distribution = α / λ
    let tau_hat = (b_c * 2.0 * n) / sum;

    Ok(AgeEstimate {
        tau: tau_hat,
        ci: (tau_hat * g_l, tau_hat * g_u),
    })
}

fn gamma_quantiles(model: Genealogy, shape: f64, rate: f64, cc: f64) -> Result<(f64, f64), Error> {
    if !(shape.is_finite() && shape > 0.0 && rate.is_finite() && rate > 0.0) {
        return Err(Error::GammaParameters { model, shape, rate });
    }

    let gamma = Gamma::new(shape, rate)?;

    let p_l = (1.0 - cc) / 2.0;
    let p_u = cc + (1.0 - cc) / 2.0;

    let g_l = gamma.inverse_cdf(p_l);
    if !g_l.is_finite() {
        return Err(Error::Quantile { model, p: p_l });
    }
    let g_u = gamma.inverse_cdf(p_u);
    if !g_u.is_finite() {
        return Err(Error::Quantile { model, p: p_u });
    }

    Ok((g_l, g_u))
}
