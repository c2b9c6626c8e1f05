//! Record-level reading of input files
//!
//! Records keep the exact bytes they have in their file, line terminator
//! excluded. A quoted field may span several physical lines.

use crate::domain::context::ResultExt;
use crate::domain::Result;
use regex::bytes::Regex;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// One CSV record as it appears in its file, without the line terminator
pub type RawRecord = Vec<u8>;

/// Lines dropped from every input file before its header is taken
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    ignore_first_lines: usize,
    ignore_matching: Option<Regex>,
}

impl LineFilter {
    /// # Errors
    ///
    /// Returns a configuration error if `ignore_matching` is not a valid regex.
    pub fn new(ignore_first_lines: usize, ignore_matching: Option<&str>) -> Result<Self> {
        Ok(Self {
            ignore_first_lines,
            ignore_matching: ignore_matching.map(Regex::new).transpose()?,
        })
    }

    /// Whether the filter would change any file
    pub fn is_active(&self) -> bool {
        self.ignore_first_lines > 0 || self.ignore_matching.is_some()
    }

    /// Read `path`, apply the filter and split off the header record
    pub fn read(&self, path: &Path) -> Result<FilteredFile> {
        let bytes = fs::read(path).with_context(|| format!("Reading {}", path.display()))?;
        self.apply(&bytes)
            .with_context(|| format!("Parsing {}", path.display()))
    }

    fn apply(&self, bytes: &[u8]) -> Result<FilteredFile> {
        let kept = self.drop_lines(bytes);
        let mut records = split_records(&kept)?.into_iter();
        Ok(FilteredFile {
            header: records.next(),
            rows: records.collect(),
        })
    }

    /// Physical lines are dropped before any record is parsed
    fn drop_lines<'a>(&self, bytes: &'a [u8]) -> Cow<'a, [u8]> {
        if !self.is_active() {
            return Cow::Borrowed(bytes);
        }
        let kept = bytes
            .split_inclusive(|&b| b == b'\n')
            .skip(self.ignore_first_lines)
            .filter(|line| match &self.ignore_matching {
                Some(regex) => !regex.is_match(trim_terminators(line)),
                None => true,
            })
            .flatten()
            .copied()
            .collect();
        Cow::Owned(kept)
    }
}

/// Raw bytes of every non-blank record in `bytes`
fn split_records(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut record = csv::ByteRecord::new();
    let mut records = Vec::new();
    loop {
        let start = reader.position().byte() as usize;
        if !reader.read_byte_record(&mut record)? {
            break;
        }
        let end = reader.position().byte() as usize;
        if is_blank(&record) {
            continue;
        }
        let raw = bytes.get(start..end).unwrap_or_default();
        records.push(trim_terminators(raw).to_vec());
    }
    Ok(records)
}

// A whitespace-only line parses as a single blank field
fn is_blank(record: &csv::ByteRecord) -> bool {
    record.len() <= 1 && record.iter().all(|field| field.iter().all(u8::is_ascii_whitespace))
}

fn trim_terminators(raw: &[u8]) -> &[u8] {
    let is_terminator = |b: &u8| *b == b'\n' || *b == b'\r';
    let start = raw.iter().position(|b| !is_terminator(b)).unwrap_or(raw.len());
    let end = raw.iter().rposition(|b| !is_terminator(b)).map_or(start, |i| i + 1);
    &raw[start..end]
}

/// An input file after line filtering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredFile {
    /// First remaining record, if any
    pub header: Option<RawRecord>,
    pub rows: Vec<RawRecord>,
}
