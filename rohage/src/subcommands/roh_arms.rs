use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use color_eyre::eyre::{ensure, OptionExt};
use color_eyre::Result;

use crate::{
    args::StandardArgs,
    io::{
        push_to_output, read_hom_file, read_multiple_sample_ids, read_recombination_file,
        write_tsv, ArmRow, RohSegment, SharedRegion,
    },
    utils::parse_snp_coord,
};

#[doc(hidden)]
pub fn run(args: StandardArgs, coords: String, rec_rates: PathBuf, samples: Option<Vec<PathBuf>>) -> Result<()> {
    let (contig, variant_pos) = parse_snp_coord(&coords)?;

    let segments = read_hom_file(args.file.clone())?;
    let rates = read_recombination_file(rec_rates, contig)?;
    let samples = read_multiple_sample_ids(&samples)?;

    let covering = covering_segments(&segments, contig, variant_pos, samples.as_deref());
    let arms = flanking_arms(&covering, contig, variant_pos, &rates)?;
    tracing::info!("{} individuals share a ROH at {coords}", arms.len());

    let mut output = args.output.clone();
    push_to_output(&args, &mut output, "roh_arms", "tsv");
    write_tsv(output, &arms)?;

    match shared_region(&covering) {
        Some(region) => {
            tracing::info!(
                "All carriers share {}:{}-{}",
                region.chr,
                region.start,
                region.end
            );
            let mut output = args.output.clone();
            push_to_output(&args, &mut output, "roh_overlap", "tsv");
            write_tsv(output, &[region])?;
        }
        None => tracing::warn!("The carriers do not share a common ROH region"),
    }

    Ok(())
}

/// Left and right arm lengths (cM) of the segments covering the variant, one per individual
pub fn flanking_arms(
    covering: &[&RohSegment],
    contig: &str,
    variant_pos: u64,
    rec_rates: &BTreeMap<u64, f64>,
) -> Result<Vec<ArmRow>> {
    ensure!(
        !covering.is_empty(),
        "No ROH segment covers {contig}:{variant_pos}"
    );

    let variant_cm = match rec_rates.range(variant_pos..).next() {
        None => {
            let last_rate = rec_rates
                .range(..variant_pos)
                .next_back()
                .ok_or_eyre("Recombination rates are empty")?;
            tracing::warn!("Recombination rate data ends at {}, but the variant has position {}. No centimorgans are added after the end of recombination rate data.", last_rate.0, variant_pos);
            *last_rate.1
        }
        Some((_, cm)) => *cm,
    };

    covering
        .iter()
        .map(|segment| {
            // Nearest map position to the left of the start and to the right of the stop
            let start_cm = rec_rates
                .range(..=segment.pos1)
                .next_back()
                .or_else(|| rec_rates.range(segment.pos1..).next())
                .map(|(_, cm)| *cm)
                .ok_or_eyre("Recombination rates are empty")?;

            let stop_cm = rec_rates
                .range(segment.pos2..)
                .next()
                .or_else(|| rec_rates.range(..segment.pos2).next_back())
                .map(|(_, cm)| *cm)
                .ok_or_eyre("Recombination rates are empty")?;

            Ok(ArmRow {
                sample: segment.iid.clone(),
                left_cm: (variant_cm - start_cm).max(0.0),
                right_cm: (stop_cm - variant_cm).max(0.0),
            })
        })
        .collect()
}

/// Region shared by all segments, `None` if they do not overlap
pub fn shared_region(segments: &[&RohSegment]) -> Option<SharedRegion> {
    let first = segments.first()?;
    let start = segments.iter().map(|s| s.pos1).max()?;
    let end = segments.iter().map(|s| s.pos2).min()?;

    match start < end {
        true => Some(SharedRegion {
            chr: first.chr.clone(),
            start,
            end,
            carriers: segments.len(),
        }),
        false => None,
    }
}

/// The longest covering segment of every (selected) individual in file order
pub fn covering_segments<'a>(
    segments: &'a [RohSegment],
    contig: &str,
    variant_pos: u64,
    samples: Option<&[String]>,
) -> Vec<&'a RohSegment> {
    let mut covering: Vec<&RohSegment> = vec![];
    let mut seen: HashMap<&str, usize> = HashMap::new();

    let selected = segments
        .iter()
        .filter(|s| samples.map_or(true, |ids| ids.contains(&s.iid)))
        .filter(|s| s.covers(contig, variant_pos));

    for segment in selected {
        match seen.get(segment.iid.as_str()) {
            Some(&idx) => {
                tracing::warn!(
                    "Sample {} has overlapping segments at {contig}:{variant_pos}, keeping the longest",
                    segment.iid
                );
                if segment.len_bp() > covering[idx].len_bp() {
                    covering[idx] = segment;
                }
            }
            None => {
                seen.insert(segment.iid.as_str(), covering.len());
                covering.push(segment);
            }
        }
    }

    if let Some(ids) = samples {
        for id in ids.iter().filter(|id| !seen.contains_key(id.as_str())) {
            tracing::info!("Sample {id} has no ROH at {contig}:{variant_pos}");
        }
    }

    for s in &covering {
        tracing::debug!(
            "{} {}: ROH {}-{} over {} markers",
            s.fid,
            s.iid,
            s.pos1,
            s.pos2,
            s.nsnp
        );
    }

    covering
}
