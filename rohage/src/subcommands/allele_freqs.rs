use std::path::PathBuf;

use color_eyre::eyre::{ensure, OptionExt};
use color_eyre::Result;
use rayon::prelude::*;

use crate::{
    args::StandardArgs,
    io::{
        index_markers, push_to_output, read_plink_map, read_plink_raw, write_tsv, FreqRow,
        MapMarker, RawGenotypes,
    },
    utils::median,
};

#[doc(hidden)]
pub fn run(args: StandardArgs, map: PathBuf, exclude_fixed: bool) -> Result<()> {
    let raw = read_plink_raw(args.file.clone())?;
    let markers = read_plink_map(map)?;
    tracing::info!(
        "{} samples genotyped at {} markers, {} markers in the map",
        raw.samples.len(),
        raw.snps.len(),
        markers.len()
    );

    let freqs = allele_frequencies(&raw, &markers, !exclude_fixed);
    ensure!(!freqs.is_empty(), "No valid markers were found for allele frequencies");

    let median_freq = median(&freqs.iter().map(|f| f.freq).collect::<Vec<_>>())
        .ok_or_eyre("No valid markers were found for allele frequencies")?;
    tracing::info!("{} markers, median allele frequency {median_freq:.4}", freqs.len());

    let mut output = args.output.clone();
    push_to_output(&args, &mut output, "allele_freqs", "tsv");
    write_tsv(output, &freqs)?;

    println!("{median_freq}");

    Ok(())
}

/// Frequency of the counted allele for every marker present in both the genotypes and the map
pub fn allele_frequencies(raw: &RawGenotypes, markers: &[MapMarker], include_fixed: bool) -> Vec<FreqRow> {
    let by_name = index_markers(markers);

    let shared = raw.snps.iter().filter(|snp| by_name.contains_key(snp.as_str())).count();
    if shared == 0 {
        tracing::warn!("None of the markers in the map match the genotype columns. Check that the marker names are identical.");
    } else {
        tracing::info!("{shared} markers shared between the genotypes and the map");
    }

    raw.snps
        .par_iter()
        .zip(raw.dosages.par_iter())
        .filter_map(|(snp, dosages)| {
            let marker = by_name.get(snp.as_str())?;
            let freq = allele_frequency(dosages)?;
            match include_fixed || (freq > 0.0 && freq < 1.0) {
                true => Some(FreqRow {
                    snp: snp.clone(),
                    position_cm: marker.cm,
                    freq,
                }),
                false => None,
            }
        })
        .collect()
}

/// Dosage sum over twice the number of called genotypes
pub fn allele_frequency(dosages: &[Option<u8>]) -> Option<f64> {
    let called: Vec<u8> = dosages.iter().flatten().copied().collect();
    if called.is_empty() {
        return None;
    }
    let sum: u64 = called.iter().map(|&d| u64::from(d)).sum();
    Some(sum as f64 / (2 * called.len()) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(snp: &str, cm: f64) -> MapMarker {
        MapMarker {
            chr: "9".to_string(),
            snp: snp.to_string(),
            cm,
            bp: 1000,
        }
    }

    #[test]
    fn frequency_skips_missing_genotypes() {
        assert_eq!(Some(0.25), allele_frequency(&[Some(0), Some(1), None, Some(0), Some(1)]));
        assert_eq!(None, allele_frequency(&[None, None]));
    }

    #[test]
    fn frequencies_follow_genotype_order() {
        let raw = RawGenotypes {
            samples: vec!["S1".to_string(), "S2".to_string()],
            snps: vec!["rs1".to_string(), "rs2".to_string(), "rs3".to_string(), "rs4".to_string()],
            dosages: vec![
                vec![Some(1), Some(2)],
                vec![Some(0), Some(0)],
                vec![None, None],
                vec![Some(1), Some(1)],
            ],
        };
        let markers = vec![marker("rs1", 0.5), marker("rs2", 0.7), marker("rs3", 0.9)];

        let freqs = allele_frequencies(&raw, &markers, true);
        let snps: Vec<_> = freqs.iter().map(|f| f.snp.as_str()).collect();
        assert_eq!(vec!["rs1", "rs2"], snps);
        assert_eq!(0.75, freqs[0].freq);
        assert_eq!(0.5, freqs[0].position_cm);

        let freqs = allele_frequencies(&raw, &markers, false);
        assert_eq!(1, freqs.len());
    }
}
