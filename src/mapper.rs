use crate::config::DATE_SENTINEL;
use crate::models::{MangaRecord, RawRow, Status};
use anyhow::{bail, Result};
use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;

static MAL_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/manga/([0-9]+)").unwrap());

static BARE_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

static ISO_DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap());

static DMY_DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2})-([0-9]{2})-([0-9]{4})$").unwrap());

/// What to do with rows whose fields don't validate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ValidationPolicy {
    /// Substitute defaults and keep every row
    #[default]
    Lenient,
    /// Reject rows missing an id or title, or carrying an unknown status
    Strict,
}

/// Reformats `YYYY-MM-DD` or `DD-MM-YYYY` into `YYYY-MM-DD`.
///
/// Only the shape of the input decides; components are not range-checked.
/// Anything else yields [`DATE_SENTINEL`].
pub fn parse_date(input: &str) -> String {
    if let Some(c) = ISO_DATE_REGEX.captures(input) {
        return format!("{}-{}-{}", &c[1], &c[2], &c[3]);
    }
    if let Some(c) = DMY_DATE_REGEX.captures(input) {
        return format!("{}-{}-{}", &c[3], &c[2], &c[1]);
    }
    DATE_SENTINEL.to_string()
}

/// Canonical status for a type label; unknown labels become "Plan to Read".
pub fn validate_status(input: &str) -> Status {
    Status::from_label(input).unwrap_or(Status::PlanToRead)
}

/// Numeric id from a `/manga/<digits>` URL segment, or a bare number.
/// Returns "0" when neither is present.
pub fn extract_mal_id(input: &str) -> String {
    if let Some(c) = MAL_ID_REGEX.captures(input) {
        return c[1].to_string();
    }
    if BARE_ID_REGEX.is_match(input) {
        return input.to_string();
    }
    "0".to_string()
}

fn or_zero(value: &str) -> String {
    if value.is_empty() {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Builds a record from one source row.
///
/// The export has a single "last read" date, so it is written to both the
/// start and finish date.
pub fn map_row(row: &RawRow, policy: ValidationPolicy) -> Result<MangaRecord> {
    let status = match policy {
        ValidationPolicy::Lenient => validate_status(&row.kind),
        ValidationPolicy::Strict => {
            if row.mal.is_empty() {
                bail!("missing source id");
            }
            if row.title.is_empty() {
                bail!("missing title");
            }
            if row.kind.is_empty() {
                bail!("missing type");
            }
            match Status::from_label(&row.kind) {
                Some(status) => status,
                None => bail!("unrecognized type {:?}", row.kind),
            }
        }
    };

    let date = parse_date(&row.last_read);

    Ok(MangaRecord {
        manga_mangadb_id: extract_mal_id(&row.mal),
        manga_title: row.title.clone(),
        my_read_chapters: or_zero(&row.read),
        my_start_date: date.clone(),
        my_finish_date: date,
        my_score: or_zero(&row.rating),
        my_status: status.label().to_string(),
        ..MangaRecord::template()
    })
}
