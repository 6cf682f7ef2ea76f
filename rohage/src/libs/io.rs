use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use color_eyre::eyre::{ensure, eyre, OptionExt, WrapErr};
use color_eyre::Result;
use csv::{Reader, ReaderBuilder, Writer, WriterBuilder};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::args::StandardArgs;
use crate::utils::{normalize_contig, strip_prefix};

/// Flanking arm lengths of one individual in centimorgans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmRow {
    pub sample: String,
    pub left_cm: f64,
    pub right_cm: f64,
}

/// Allele frequency of one marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreqRow {
    #[serde(rename = "SNP")]
    pub snp: String,
    #[serde(rename = "Position_cM")]
    pub position_cm: f64,
    #[serde(rename = "Freq")]
    pub freq: f64,
}

/// Region covered by the runs of homozygosity of every carrier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedRegion {
    pub chr: String,
    pub start: u64,
    pub end: u64,
    pub carriers: usize,
}

/// A run of homozygosity from a PLINK .hom file
#[derive(Debug, Clone, PartialEq)]
pub struct RohSegment {
    pub fid: String,
    pub iid: String,
    pub chr: String,
    pub pos1: u64,
    pub pos2: u64,
    pub nsnp: usize,
}

impl RohSegment {
    pub fn covers(&self, contig: &str, pos: u64) -> bool {
        normalize_contig(&self.chr) == normalize_contig(contig) && self.pos1 <= pos && pos <= self.pos2
    }

    pub fn len_bp(&self) -> u64 {
        self.pos2.saturating_sub(self.pos1)
    }
}

/// A marker from a PLINK .map file
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub chr: String,
    pub snp: String,
    pub cm: f64,
    pub bp: u64,
}

/// Allele dosages from a PLINK --recodeA .raw file, one column per marker
#[derive(Debug, Clone, PartialEq)]
pub struct RawGenotypes {
    pub samples: Vec<String>,
    pub snps: Vec<String>,
    pub dosages: Vec<Vec<Option<u8>>>,
}

#[derive(Debug, Deserialize)]
struct RecombinationRow<'a> {
    chr: &'a str,
    pos: u64,
    _rate: f64,
    cm: f64,
}

const RAW_FIXED_COLUMNS: usize = 6;

/// Read the cumulative genetic map of `contig` from a `chr pos rate cm` file without headers
pub fn read_recombination_file(path: PathBuf, contig: &str) -> Result<BTreeMap<u64, f64>> {
    let mut rdr = get_tsv_reader(get_input(Some(path.clone()))?, false);
    let mut rates = BTreeMap::new();

    let mut last_cm = 0.0;
    let mut last_pos = 0;
    for line in rdr.records() {
        let record = line?;
        let row: RecombinationRow = record.deserialize(None).
            wrap_err(eyre!("Make sure no headers are present and that the recombination file is in order chr,pos,rate,cm. If the issue is not fixed, you have an invalid field in the file."))?;

        if normalize_contig(row.chr) != normalize_contig(contig) {
            continue;
        }
        if last_cm > row.cm {
            return Err(eyre!(
                "Recombination rates file is not sorted for centimorgans"
            ));
        }
        if last_pos > row.pos {
            return Err(eyre!(
                "Recombination rates file is not sorted for positions"
            ));
        }
        last_cm = row.cm;
        last_pos = row.pos;
        rates.insert(row.pos, row.cm);
    }

    ensure!(
        !rates.is_empty(),
        "Recombination rates file {path:?} has no rows for contig {contig}"
    );

    Ok(rates)
}

pub fn read_arms_file(path: PathBuf) -> Result<Vec<ArmRow>> {
    let mut rdr = get_tsv_reader(get_input(Some(path.clone()))?, true);

    let rows = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<ArmRow>, _>>()
        .wrap_err(eyre!("Failed to read arm lengths from {path:?}. Expected the columns sample, left_cm and right_cm."))?;

    Ok(rows)
}

pub fn read_freq_file(path: PathBuf) -> Result<Vec<FreqRow>> {
    let mut rdr = get_tsv_reader(get_input(Some(path.clone()))?, true);

    let rows = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<FreqRow>, _>>()
        .wrap_err(eyre!("Failed to read allele frequencies from {path:?}. Expected the columns SNP, Position_cM and Freq."))?;

    Ok(rows)
}

pub fn write_tsv<T: Serialize>(path: PathBuf, rows: &[T]) -> Result<()> {
    let mut wrtr = get_tsv_writer(get_output(Some(path))?);
    for row in rows {
        wrtr.serialize(row)?;
    }
    wrtr.flush()?;
    Ok(())
}

/// Lines split on whitespace together with their line numbers, empty lines skipped
fn read_whitespace_rows(path: &Path) -> Result<Vec<(usize, Vec<String>)>> {
    let input = get_input(Some(path.to_path_buf()))?;
    let mut rows = vec![];

    for (idx, line) in io::BufReader::new(input).lines().enumerate() {
        let line = line.wrap_err(eyre!("Failed to read line {} of {path:?}", idx + 1))?;
        let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if !fields.is_empty() {
            rows.push((idx + 1, fields));
        }
    }

    Ok(rows)
}

fn column_idx(header: &[String], name: &str, path: &Path) -> Result<usize> {
    header
        .iter()
        .position(|h| h == name)
        .ok_or_eyre(format!("Column {name} is missing from {path:?}"))
}

fn parse_field<T: std::str::FromStr>(fields: &[String], idx: usize, line: usize, path: &Path) -> Result<T> {
    fields[idx]
        .parse::<T>()
        .map_err(|_| eyre!("Invalid value {:?} on line {line} of {path:?}", fields[idx]))
}

/// Read the segments of a PLINK --homozyg .hom file
pub fn read_hom_file(path: PathBuf) -> Result<Vec<RohSegment>> {
    let mut rows = read_whitespace_rows(&path)?.into_iter();
    let (_, header) = rows
        .next()
        .ok_or_eyre(format!("File contains zero rows: {path:?}"))?;

    let fid = column_idx(&header, "FID", &path)?;
    let iid = column_idx(&header, "IID", &path)?;
    let chr = column_idx(&header, "CHR", &path)?;
    let pos1 = column_idx(&header, "POS1", &path)?;
    let pos2 = column_idx(&header, "POS2", &path)?;
    let nsnp = column_idx(&header, "NSNP", &path)?;

    let mut segments = vec![];
    for (line, fields) in rows {
        ensure!(
            fields.len() == header.len(),
            "Line {line} of {path:?} has {} fields, the header has {}",
            fields.len(),
            header.len()
        );

        let segment = RohSegment {
            fid: fields[fid].clone(),
            iid: fields[iid].clone(),
            chr: fields[chr].clone(),
            pos1: parse_field(&fields, pos1, line, &path)?,
            pos2: parse_field(&fields, pos2, line, &path)?,
            nsnp: parse_field(&fields, nsnp, line, &path)?,
        };
        ensure!(
            segment.pos1 <= segment.pos2,
            "Segment on line {line} of {path:?} ends before it starts"
        );
        segments.push(segment);
    }

    Ok(segments)
}

/// Read a PLINK .map file. Maps without genetic positions get 1 cM per Mb.
pub fn read_plink_map(path: PathBuf) -> Result<Vec<MapMarker>> {
    let mut markers = vec![];

    for (line, fields) in read_whitespace_rows(&path)? {
        ensure!(
            fields.len() == 4,
            "Line {line} of {path:?} does not have the four columns CHR, SNP, CM and BP"
        );
        markers.push(MapMarker {
            chr: fields[0].clone(),
            snp: fields[1].clone(),
            cm: parse_field(&fields, 2, line, &path)?,
            bp: parse_field(&fields, 3, line, &path)?,
        });
    }

    ensure!(!markers.is_empty(), "File contains zero rows: {path:?}");

    if markers.iter().map(|m| m.cm.to_bits()).unique().count() <= 1 {
        tracing::warn!("The map {path:?} has no genetic positions, assuming 1 cM per Mb");
        for marker in &mut markers {
            marker.cm = marker.bp as f64 / 1_000_000.;
        }
    }

    Ok(markers)
}

/// Read a PLINK --recodeA .raw file. Marker names lose the `_<allele>` suffix PLINK appends.
pub fn read_plink_raw(path: PathBuf) -> Result<RawGenotypes> {
    let mut rows = read_whitespace_rows(&path)?.into_iter();
    let (_, header) = rows
        .next()
        .ok_or_eyre(format!("File contains zero rows: {path:?}"))?;

    ensure!(
        header.len() > RAW_FIXED_COLUMNS && header[1] == "IID",
        "{path:?} is not a PLINK .raw file, expected FID IID PAT MAT SEX PHENOTYPE followed by markers"
    );

    let snps: Vec<String> = header[RAW_FIXED_COLUMNS..]
        .iter()
        .map(|col| match col.rsplit_once('_') {
            Some((snp, _allele)) => snp.to_string(),
            None => col.clone(),
        })
        .collect();

    let mut samples = vec![];
    let mut dosages = vec![Vec::new(); snps.len()];

    for (line, fields) in rows {
        ensure!(
            fields.len() == header.len(),
            "Line {line} of {path:?} has {} fields, the header has {}",
            fields.len(),
            header.len()
        );
        samples.push(fields[1].clone());

        for (column, value) in dosages.iter_mut().zip(&fields[RAW_FIXED_COLUMNS..]) {
            let dosage = value.parse::<u8>().ok().filter(|d| *d <= 2);
            column.push(dosage);
        }
    }

    Ok(RawGenotypes {
        samples,
        snps,
        dosages,
    })
}

pub fn read_lines<P>(filename: P) -> Result<io::Lines<io::BufReader<File>>>
where
    P: AsRef<Path>,
{
    let name = filename.as_ref().display();
    let file = match File::open(&filename) {
        Ok(x) => x,
        Err(err) => {
            let msg = format!("failed to open {name}: {err}");
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, msg))?;
        }
    };
    Ok(io::BufReader::new(file).lines())
}

pub fn read_multiple_sample_ids(path: &Option<Vec<PathBuf>>) -> Result<Option<Vec<String>>> {
    match path {
        Some(paths) => {
            let mut samples = vec![];
            for path in paths {
                for line in read_lines(path)?.map_while(std::result::Result::ok) {
                    let line = line.trim();
                    if !line.is_empty() {
                        samples.push(line.to_string());
                    }
                }
            }
            Ok(Some(samples))
        }
        None => Ok(None),
    }
}

/// Markers by name
pub fn index_markers(markers: &[MapMarker]) -> HashMap<&str, &MapMarker> {
    markers.iter().map(|m| (m.snp.as_str(), m)).collect()
}

pub fn push_to_output(args: &StandardArgs, output: &mut PathBuf, name: &str, suffix: &str) {
    if let Some(prefix) = &strip_prefix(args.prefix.clone()) {
        output.push(format!("{prefix}_{name}.{suffix}"));
    } else {
        output.push(format!("{name}.{suffix}"));
    }
}

pub fn get_tsv_reader<R: io::Read>(input: R, has_headers: bool) -> Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .flexible(false)
        .from_reader(input)
}

pub fn get_tsv_writer<W: io::Write>(output: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(false)
        .from_writer(output)
}

pub fn get_input(filename: Option<PathBuf>) -> Result<Box<dyn io::Read>> {
    let input: Box<dyn io::Read> = match filename {
        Some(name) => match name.to_str() {
            Some("-") => Box::new(io::stdin()),
            Some(name) => {
                let r = match niffler::from_path(name) {
                    Ok(x) => x.0,
                    Err(err) => {
                        let msg = format!("failed to open \"{name}\": {err}");
                        return Err(eyre!(msg))?;
                    }
                };
                Box::new(r)
            }
            None => return Err(eyre!("Unknown I/O error")),
        },
        None => Box::new(io::stdin()),
    };
    Ok(input)
}

pub fn get_output(filename: Option<PathBuf>) -> Result<Box<dyn io::Write>> {
    let output: Box<dyn io::Write> = match filename {
        Some(name) => match name.to_str() {
            Some("-") => Box::new(io::stdout()),
            Some(name) => Box::new(
                match std::fs::File::options()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(name)
                {
                    Ok(x) => x,
                    Err(err) => return Err(eyre!("failed to open \"{name}\": {err}"))?,
                },
            ),
            None => return Err(eyre!("Unknown I/O error")),
        },
        None => Box::new(io::stdout()),
    };
    Ok(output)
}
