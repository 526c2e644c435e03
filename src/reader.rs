use crate::models::RawRow;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufReader, Read};
use tracing::{debug, warn};

/// Accepted header names per source column, compared after
/// [`normalize_header`].
const MAL_HEADERS: &[&str] = &["mal", "malid", "malurl", "url", "id", "sourceid"];
const TITLE_HEADERS: &[&str] = &["title"];
const TYPE_HEADERS: &[&str] = &["type", "status"];
const READ_HEADERS: &[&str] = &["read", "chapters", "readchapters", "chaptersread"];
const RATING_HEADERS: &[&str] = &["rating", "score"];
const LAST_READ_HEADERS: &[&str] = &["lastread", "date", "lastreaddate"];

const COLUMN_COUNT: usize = 6;

/// Lower-cased header name with whitespace, `_` and `-` removed, so that
/// `Last Read`, `last_read` and `LAST-READ` compare equal.
pub fn normalize_header(header: &str) -> String {
    strip_quotes(header.trim_start_matches('\u{feff}'))
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Where each of the six source columns lives in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    mal: Option<usize>,
    title: Option<usize>,
    kind: Option<usize>,
    read: Option<usize>,
    rating: Option<usize>,
    last_read: Option<usize>,
}

impl ColumnMap {
    /// Fixed column order of the plain export: mal, title, type, read, rating, last_read.
    pub fn positional() -> Self {
        Self {
            mal: Some(0),
            title: Some(1),
            kind: Some(2),
            read: Some(3),
            rating: Some(4),
            last_read: Some(5),
        }
    }

    /// Resolves columns by header name, falling back to [`ColumnMap::positional`]
    /// when no header is recognized at all.
    ///
    /// With a partially recognized header of at least six columns, each
    /// unresolved column takes its positional index unless a named column
    /// already claimed it.
    pub fn from_headers(headers: &StringRecord) -> Self {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |aliases: &[&str]| names.iter().position(|n| aliases.contains(&n.as_str()));

        let mut slots = [
            find(MAL_HEADERS),
            find(TITLE_HEADERS),
            find(TYPE_HEADERS),
            find(READ_HEADERS),
            find(RATING_HEADERS),
            find(LAST_READ_HEADERS),
        ];

        if slots.iter().all(Option::is_none) {
            debug!("No known header names, using positional columns");
            return Self::positional();
        }

        if names.len() >= COLUMN_COUNT {
            let claimed: Vec<usize> = slots.iter().flatten().copied().collect();
            for (pos, slot) in slots.iter_mut().enumerate() {
                if slot.is_none() && !claimed.contains(&pos) {
                    warn!(
                        column = pos,
                        header = %headers.get(pos).unwrap_or_default(),
                        "Unrecognized header, using column position"
                    );
                    *slot = Some(pos);
                }
            }
        }

        let [mal, title, kind, read, rating, last_read] = slots;
        Self {
            mal,
            title,
            kind,
            read,
            rating,
            last_read,
        }
    }

    /// Picks the six fields out of a record. Absent columns come back empty.
    pub fn row(&self, record: &StringRecord) -> RawRow {
        let get = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::to_string)
                .unwrap_or_default()
        };
        RawRow {
            mal: get(self.mal),
            title: strip_quotes(&get(self.title)).to_string(),
            kind: get(self.kind),
            read: get(self.read),
            rating: get(self.rating),
            last_read: get(self.last_read),
        }
    }
}

/// Removes one pair of literal double quotes surrounding a value. Quotes
/// that are not matched on both ends belong to the text and stay.
pub fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .map(str::trim)
        .unwrap_or(value)
}

/// Streaming reader yielding `(line, row)` pairs for every non-blank data row.
pub struct MangaCsvReader<R: Read> {
    reader: csv::Reader<R>,
    columns: ColumnMap,
    record: StringRecord,
}

impl MangaCsvReader<BufReader<File>> {
    pub fn open(path: &str) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open input: {}", path))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read CSV header from: {}", path))
    }
}

impl<R: Read> MangaCsvReader<R> {
    pub fn from_reader(source: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(source);

        let columns = ColumnMap::from_headers(reader.headers()?);
        debug!(?columns, "Resolved CSV columns");

        Ok(Self {
            reader,
            columns,
            record: StringRecord::new(),
        })
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }
}

impl<R: Read> Iterator for MangaCsvReader<R> {
    type Item = Result<(u64, RawRow)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(false) => return None,
                Ok(true) => {
                    if self.record.iter().all(str::is_empty) {
                        continue;
                    }
                    let line = self.record.position().map(|p| p.line()).unwrap_or(0);
                    return Some(Ok((line, self.columns.row(&self.record))));
                }
                Err(e) => return Some(Err(anyhow::Error::new(e).context("Malformed CSV input"))),
            }
        }
    }
}
