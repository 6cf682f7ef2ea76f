use std::cmp::Ordering;

use crate::error::Error;

//NOTE: This should be parsed by clap automatically, but Option<String> parsing is not supported out of the box as of now
pub fn strip_prefix(prefix: Option<String>) -> Option<String> {
    if let Some(prefix) = prefix {
        match prefix.as_ref() {
            "" => None,
            "\\0" => None,
            v => Some(v.to_string()),
        }
    } else {
        None
    }
}

// Coords are in the format [contig]:[position]
pub fn parse_snp_coord(coords: &str) -> Result<(&str, u64), Error> {
    let mut coord_split = coords.split(':');

    match (coord_split.next(), coord_split.next(), coord_split.next()) {
        (Some(contig), Some(value), None) if !contig.is_empty() => {
            let value = value.parse::<u64>().map_err(|_e| Error::PosParse {
                coord: coords.to_string(),
                value: value.to_string(),
            })?;
            Ok((contig, value))
        }
        _ => Err(Error::CoordParse {
            coord: coords.to_string(),
        }),
    }
}

// PLINK writes contigs without the chr prefix
pub fn normalize_contig(contig: &str) -> &str {
    contig
        .strip_prefix("chr")
        .or_else(|| contig.strip_prefix("CHR"))
        .unwrap_or(contig)
}

/// Median of the finite values, the mean of the two middle values for even counts
pub fn median(values: &[f64]) -> Option<f64> {
    let mut values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = values.len() / 2;
    match values.len() % 2 {
        0 => Some((values[mid - 1] + values[mid]) / 2.0),
        _ => Some(values[mid]),
    }
}
