use std::path::PathBuf;

use color_eyre::eyre::{ensure, eyre, OptionExt, WrapErr};
use color_eyre::Result;

use crate::{
    args::StandardArgs,
    gamma::estimate_mutation_age,
    io::{get_output, push_to_output, read_arms_file, read_freq_file},
    structs::{EstimationResult, EstimatorConfig},
    utils::median,
};

#[doc(hidden)]
pub fn run(
    args: StandardArgs,
    freq: Option<f64>,
    freq_file: Option<PathBuf>,
    n: Option<usize>,
    config: EstimatorConfig,
    json: bool,
) -> Result<()> {
    let rows = read_arms_file(args.file.clone())?;
    ensure!(!rows.is_empty(), "File contains zero rows: {:?}", args.file);

    let median_freq = representative_frequency(freq, freq_file, &config)?;
    let n = n.unwrap_or(rows.len());

    let left: Vec<f64> = rows.iter().map(|r| r.left_cm).collect();
    let right: Vec<f64> = rows.iter().map(|r| r.right_cm).collect();

    tracing::info!("Dating the mutation from {n} individuals, allele frequency {median_freq:.3}");
    let result = estimate_mutation_age(&left, &right, median_freq, n, &config)?;

    let mut output = args.output.clone();
    push_to_output(&args, &mut output, "mrca_gamma_method", "txt");

    let data = format_summary(&result);
    tracing::info!("\n{data}");
    std::fs::write(&output, data).wrap_err(eyre!("Unable to write to {output:?}"))?;

    if json {
        let mut output = args.output.clone();
        push_to_output(&args, &mut output, "mrca_gamma_method", "json");
        serde_json::to_writer_pretty(get_output(Some(output))?, &result)?;
    }

    Ok(())
}

fn representative_frequency(
    freq: Option<f64>,
    freq_file: Option<PathBuf>,
    config: &EstimatorConfig,
) -> Result<f64> {
    match (freq, freq_file) {
        (Some(freq), _) => Ok(freq),
        (None, Some(path)) => {
            let freqs: Vec<f64> = read_freq_file(path.clone())?.iter().map(|r| r.freq).collect();
            median(&freqs).ok_or_eyre(format!("No allele frequencies in {path:?}"))
        }
        // Only used by the chance-sharing correction
        (None, None) if !config.apply_correction => Ok(0.5),
        (None, None) => Err(eyre!(
            "An allele frequency (--freq or --freq-file) is required for the chance-sharing correction"
        )),
    }
}

pub fn format_summary(result: &EstimationResult) -> String {
    let i = &result.independent;
    let c = &result.correlated;
    let l = &result.lengths;
    let level = confidence_percent(result.confidence);
    format!(
        "Individuals: {}\nChance-sharing correction: {:.5} M\nMean lengths: left {:.2} cM, right {:.2} cM, corrected total {:.2} cM\nIndependent genealogy:\nage: {:.3} {level} CI ({:.3}, {:.3})\nCorrelated genealogy:\nage: {:.3} {level} CI ({:.3}, {:.3}) rho: {:.3} n*: {:.3}\n",
        result.n, result.cs_correction, l.mean_left_cm, l.mean_right_cm, l.mean_total_cm,
        i.tau, i.ci.0, i.ci.1, c.tau, c.ci.0, c.ci.1, c.rho, c.n_star
    )
}

// 0.95 -> 95%, 0.975 -> 97.5%
fn confidence_percent(confidence: f64) -> String {
    let pct = format!("{:.1}", confidence * 100.);
    format!("{}%", pct.trim_end_matches(".0"))
}
