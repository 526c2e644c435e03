use crate::config::{OUTPUT_SUFFIX, PROGRESS_INTERVAL};
use crate::mapper::{map_row, ValidationPolicy};
use crate::models::{MangaRecord, RawRow};
use crate::reader::MangaCsvReader;
use crate::stats::{aggregate, StatusCounts};
use crate::writer::{write_document, UserInfo};
use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub policy: ValidationPolicy,
    pub user: UserInfo,
    /// Run the whole pipeline but skip writing the output file
    pub dry_run: bool,
}

/// Outcome of one conversion run.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub rows_read: u64,
    pub rows_skipped: u64,
    pub counts: StatusCounts,
    /// Where the document was written; `None` for dry runs and for strict
    /// runs that produced no records.
    pub output: Option<PathBuf>,
}

impl ConversionReport {
    pub fn records(&self) -> u64 {
        self.counts.total()
    }
}

/// `list.csv` becomes `list_mal.xml` in the same directory. Inputs without a
/// `.csv` extension get the suffix appended to the full name.
pub fn output_path_for(input: &str) -> PathBuf {
    let path = Path::new(input);
    let is_csv = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    let base = if is_csv {
        path.file_stem()
    } else {
        path.file_name()
    };
    let name = format!(
        "{}{}",
        base.map(|s| s.to_string_lossy()).unwrap_or_default(),
        OUTPUT_SUFFIX
    );
    path.with_file_name(name)
}

/// Maps every row under `policy`. Strict rejections are logged with their
/// 1-based data-row number and source line, and counted; read errors abort.
pub fn map_rows<I>(rows: I, policy: ValidationPolicy) -> Result<(Vec<MangaRecord>, u64)>
where
    I: IntoIterator<Item = Result<(u64, RawRow)>>,
{
    let mut records = Vec::new();
    let mut skipped = 0u64;
    let pb = ProgressBar::new_spinner();

    for (n, item) in rows.into_iter().enumerate() {
        let (line, row) = item?;
        match map_row(&row, policy) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    row = n as u64 + 1,
                    line,
                    title = %row.title,
                    reason = %e,
                    "Skipping invalid row"
                );
                skipped += 1;
            }
        }
        if (n as u64 + 1) % PROGRESS_INTERVAL == 0 {
            pb.tick();
        }
    }

    pb.finish_and_clear();
    Ok((records, skipped))
}

/// Reads `input`, maps and aggregates its rows, and writes the document to
/// `output`.
pub fn run_conversion(input: &str, output: &Path, options: &ConvertOptions) -> Result<ConversionReport> {
    if !Path::new(input).exists() {
        bail!("Input file not found: {}", input);
    }

    info!(input, policy = ?options.policy, "Reading manga list");
    let reader = MangaCsvReader::open(input)?;
    let (records, rows_skipped) =
        map_rows(reader, options.policy).with_context(|| format!("Failed to read: {}", input))?;
    let rows_read = records.len() as u64 + rows_skipped;

    let counts = aggregate(&records);
    info!(
        rows = rows_read,
        records = records.len(),
        skipped = rows_skipped,
        "Rows mapped"
    );

    let mut report = ConversionReport {
        rows_read,
        rows_skipped,
        counts,
        output: None,
    };

    if records.is_empty() && options.policy == ValidationPolicy::Strict {
        warn!("No valid rows, not writing output");
        return Ok(report);
    }

    if options.dry_run {
        debug!("Dry run, skipping output");
        return Ok(report);
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to create output: {}", output.display()))?;
    let writer = BufWriter::with_capacity(128 * 1024, file);
    write_document(writer, &options.user, &records, &report.counts)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    info!(output = %output.display(), "Output written");
    report.output = Some(output.to_path_buf());
    Ok(report)
}
