use crate::core::model::{Feature, LENGTHS, ReadTable, TableError};
use anyhow::{Context, Result, anyhow};
use flate2::read::MultiGzDecoder;
use gzp::deflate::{Bgzf, Mgzip};
use gzp::par::decompress::ParDecompressBuilder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const STDOUT_SENTINEL: &str = "stdout";

pub struct MmapSource {
    mmap: Option<Mmap>,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("failed to stat {}", path.display()))?
            .len();
        if len == 0 {
            return Ok(Self { mmap: None });
        }
        // SAFETY: read-only file mapping.
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| "mmap failed")?;
        Ok(Self { mmap: Some(mmap) })
    }

    pub fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
}

pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    if has_extension(path, "gz") {
        return Ok(InputKind::Gzip);
    }
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut magic = [0u8; 2];
    let n = file
        .read(&mut magic)
        .with_context(|| "failed to read magic bytes")?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(InputKind::Gzip)
    } else {
        Ok(InputKind::Plain)
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

pub fn delimiter_for(path: &Path) -> u8 {
    let inner = if has_extension(path, "gz") {
        path.file_stem().map(Path::new).unwrap_or(path)
    } else {
        path
    };
    if has_extension(inner, "csv") { b',' } else { b'\t' }
}

#[derive(Clone, Copy, Debug)]
enum GzipVariant {
    Standard,
    Mgzip,
    Bgzf,
}

fn detect_gzip_variant(path: &Path) -> Result<GzipVariant> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut header = [0u8; 20];
    let n = file
        .read(&mut header)
        .with_context(|| "failed to read gzip header")?;
    // FEXTRA subfield id sits at bytes 12..14
    let has_extra = n >= 14 && header[..2] == [0x1f, 0x8b] && header[3] & 4 != 0;
    if !has_extra {
        return Ok(GzipVariant::Standard);
    }
    Ok(match &header[12..14] {
        b"BC" => GzipVariant::Bgzf,
        b"IG" => GzipVariant::Mgzip,
        _ => GzipVariant::Standard,
    })
}

pub fn open_gzip_reader(path: &Path, threads: usize) -> Result<Box<dyn Read + Send>> {
    let variant = detect_gzip_variant(path)?;
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let reader: Box<dyn Read + Send> = match variant {
        GzipVariant::Bgzf if threads > 1 => Box::new(
            ParDecompressBuilder::<Bgzf>::new()
                .num_threads(threads)
                .map_err(|e| anyhow!("failed to set up BGZF decompression: {e}"))?
                .from_reader(reader),
        ),
        GzipVariant::Mgzip if threads > 1 => Box::new(
            ParDecompressBuilder::<Mgzip>::new()
                .num_threads(threads)
                .map_err(|e| anyhow!("failed to set up MGZIP decompression: {e}"))?
                .from_reader(reader),
        ),
        _ => Box::new(MultiGzDecoder::new(reader)),
    };
    Ok(reader)
}

pub fn load_table(path: &Path, threads: usize) -> Result<ReadTable> {
    let delimiter = delimiter_for(path);
    let table = match detect_input_kind(path)? {
        InputKind::Plain => {
            let source = MmapSource::open(path)?;
            parse_table(source.bytes(), delimiter)
        }
        InputKind::Gzip => {
            let reader = open_gzip_reader(path, threads)?;
            parse_table(reader, delimiter)
        }
    };
    table.with_context(|| format!("failed to load read table {}", path.display()))
}

pub fn parse_table<R: Read>(reader: R, delimiter: u8) -> Result<ReadTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("failed to read header row")?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let length_idx = position(LENGTHS).ok_or_else(|| TableError::MissingColumn(LENGTHS.into()))?;
    let optional: Vec<(Feature, usize)> = Feature::ALL
        .into_iter()
        .filter_map(|f| position(f.column_name()).map(|i| (f, i)))
        .collect();

    let mut lengths = Vec::new();
    let mut numeric: Vec<Vec<f64>> = vec![Vec::new(); optional.len()];
    let mut text: Vec<Vec<String>> = vec![Vec::new(); optional.len()];

    for (row, record) in rdr.records().enumerate() {
        // header is line 1
        let line = row + 2;
        let record = record.with_context(|| format!("malformed row at line {}", line))?;

        lengths.push(parse_length(cell(&record, length_idx, LENGTHS, line)?, line)?);
        for (slot, &(feature, idx)) in optional.iter().enumerate() {
            let value = cell(&record, idx, feature.column_name(), line)?;
            if feature.is_numeric() {
                let v = value.parse::<f64>().map_err(|_| {
                    anyhow!(
                        "line {}: column '{}' has non-numeric value '{}'",
                        line,
                        feature.column_name(),
                        value
                    )
                })?;
                numeric[slot].push(v);
            } else {
                text[slot].push(value.to_string());
            }
        }
    }

    let mut table = ReadTable::new(lengths);
    for (slot, (feature, _)) in optional.into_iter().enumerate() {
        let nums = std::mem::take(&mut numeric[slot]);
        let strs = std::mem::take(&mut text[slot]);
        table = match feature {
            Feature::Quals => table.with_quals(nums)?,
            Feature::AlignedLengths => table.with_aligned_lengths(nums)?,
            Feature::PercentIdentity => table.with_percent_identity(nums)?,
            Feature::ChannelIds => table.with_channel_ids(strs)?,
            Feature::RunIds => table.with_run_ids(strs)?,
            Feature::ReadIds => table.with_read_ids(strs)?,
        };
    }
    Ok(table)
}

fn cell<'r>(record: &'r csv::StringRecord, idx: usize, name: &str, line: usize) -> Result<&'r str> {
    record
        .get(idx)
        .ok_or_else(|| anyhow!("line {}: missing value for column '{}'", line, name))
}

// also accepts whole-number floats such as 1234.0
fn parse_length(value: &str, line: usize) -> Result<u64> {
    if let Ok(v) = value.parse::<u64>() {
        return Ok(v);
    }
    match value.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
        _ => Err(anyhow!(
            "line {}: '{}' is not a valid read length",
            line,
            value
        )),
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OutputSink {
    Stdout,
    File(PathBuf),
}

impl OutputSink {
    pub fn from_arg(arg: &str) -> Self {
        if arg == STDOUT_SENTINEL || arg == "-" {
            OutputSink::Stdout
        } else {
            OutputSink::File(PathBuf::from(arg))
        }
    }

    pub fn open(&self) -> Result<Box<dyn Write>> {
        match self {
            OutputSink::Stdout => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
            OutputSink::File(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            OutputSink::Stdout => STDOUT_SENTINEL.to_string(),
            OutputSink::File(path) => path.display().to_string(),
        }
    }
}
