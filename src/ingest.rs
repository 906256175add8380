//! CSV ingestion
//!
//! Two tab-separated dialects feed the pipeline:
//!
//! - **Exported**: the text table produced from extracted game text.
//!   Header `tag bundle en ru uk`, one entry per row, the bundle named
//!   in the row itself.
//! - **Spreadsheet**: the human translators' sheet. Two statistics lines,
//!   then an 11-column header, then rows of
//!   `order scene tag combined en translation uk machine de ru check`.
//!   The sheet does not name its bundle, so the caller states which
//!   source it is.
//!
//! Both dialects are all-or-nothing: a bad header or a row with the wrong
//! number of columns aborts ingestion.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{BundledTranslationEntry, EntrySet, TranslationEntry};

/// Bundle holding UI and menu text
pub const LOC_BUNDLE: &str = "loc_packages_assets_";

/// Bundle holding scene dialogue
pub const DIALOGUE_BUNDLE: &str = "dialogue_packages_assets_all";

/// Header of the exported dialect
pub const EXPORTED_HEADER: [&str; 5] = ["tag", "bundle", "en", "ru", "uk"];

/// Header of the spreadsheet dialect; blank cells accept anything
pub const SPREADSHEET_HEADER: [&str; 11] = [
    "", "code", "entry", "", "en", "translation", "uk", "", "", "ru", "",
];

/// Statistics lines preceding the spreadsheet header
const SPREADSHEET_PREAMBLE: usize = 2;

/// Which asset group a spreadsheet was made from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Localization,
    Dialogue,
}

impl SourceKind {
    pub fn bundle(self) -> &'static str {
        match self {
            SourceKind::Localization => LOC_BUNDLE,
            SourceKind::Dialogue => DIALOGUE_BUNDLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvDialect {
    Exported,
    Spreadsheet(SourceKind),
}

/// Check a header row against a template
///
/// Column count must match exactly. Non-blank template cells must match
/// case-insensitively; blank ones accept any value.
pub fn check_header(source_name: &str, header: &StringRecord, template: &[&str]) -> Result<()> {
    if header.len() != template.len() {
        return Err(Error::format(
            source_name,
            format!(
                "header has {} columns, expected {}",
                header.len(),
                template.len()
            ),
        ));
    }

    for (i, (actual, expected)) in header.iter().zip(template.iter()).enumerate() {
        if expected.is_empty() {
            continue;
        }
        if !actual.trim().eq_ignore_ascii_case(expected) {
            return Err(Error::format(
                source_name,
                format!(
                    "header column {} is {:?}, expected {:?}",
                    i + 1,
                    actual,
                    expected
                ),
            ));
        }
    }
    Ok(())
}

/// Line of `record` in the whole file, counting the skipped preamble
fn file_line(record: &StringRecord, preamble: usize) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default() + preamble as u64
}

fn check_width(source_name: &str, record: &StringRecord, width: usize, preamble: usize) -> Result<()> {
    if record.len() == width {
        return Ok(());
    }
    let line = file_line(record, preamble);
    Err(Error::format(
        source_name,
        format!(
            "line {} has {} columns, expected {}",
            line,
            record.len(),
            width
        ),
    ))
}

fn exported_row(record: &StringRecord) -> BundledTranslationEntry {
    let mut entry = TranslationEntry::new(&record[0], &record[2]);
    entry.ru_native = record[3].to_string();
    entry.uk = record[4].to_string();
    entry.apply_stub_rule();
    BundledTranslationEntry::new(&record[1], entry)
}

fn spreadsheet_row(record: &StringRecord, source: SourceKind) -> BundledTranslationEntry {
    // order, scene, tag, combined, en, translation, uk, machine, de, ru, check
    let mut entry = TranslationEntry::new(&record[2], &record[4]);
    entry.ru_final = record[5].to_string();
    entry.uk = record[6].to_string();
    entry.ru_machine = record[7].to_string();
    entry.ru_native = record[9].to_string();
    entry.apply_stub_rule();
    BundledTranslationEntry::new(source.bundle(), entry)
}

/// Parse one CSV stream in the given dialect
///
/// `source_name` only labels errors and log lines.
pub fn read_entries<R: Read>(reader: R, dialect: CsvDialect, source_name: &str) -> Result<EntrySet> {
    let (template, preamble): (&[&str], usize) = match dialect {
        CsvDialect::Exported => (&EXPORTED_HEADER[..], 0),
        CsvDialect::Spreadsheet(_) => (&SPREADSHEET_HEADER[..], SPREADSHEET_PREAMBLE),
    };

    // preamble counts raw lines, blank ones included
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    for _ in 0..preamble {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| Error::format(source_name, format!("cannot read preamble: {}", e)))?;
        if read == 0 {
            return Err(Error::format(source_name, "file ends before the header row"));
        }
    }

    let mut csv = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = csv.records();
    let header = records
        .next()
        .transpose()?
        .ok_or_else(|| Error::format(source_name, "missing header row"))?;
    check_header(source_name, &header, template)?;

    let mut set = EntrySet::new();
    for record in records {
        let record = record?;
        check_width(source_name, &record, template.len(), preamble)?;

        let bundled = match dialect {
            CsvDialect::Exported => exported_row(&record),
            CsvDialect::Spreadsheet(source) => spreadsheet_row(&record, source),
        };
        if bundled.tag().is_empty() {
            warn!(source = source_name, line = file_line(&record, preamble), "row without tag; skipped");
            continue;
        }
        debug!(tag = %bundled.tag(), "ingest");
        set.insert(bundled);
    }
    Ok(set)
}

/// Parse a single CSV file
pub fn read_file(path: &Path, dialect: CsvDialect) -> Result<EntrySet> {
    info!(file = %path.display(), ?dialect, "opening csv");
    if !path.is_file() {
        return Err(Error::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a file"),
        ));
    }
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let set = read_entries(file, dialect, &path.display().to_string())?;
    info!(file = %path.display(), entries = set.len(), "csv loaded");
    Ok(set)
}

/// Parse several CSV files of one dialect into a single set
///
/// Later files win on duplicate tags. The first malformed file aborts the
/// whole batch.
pub fn read_files(paths: &[PathBuf], dialect: CsvDialect) -> Result<EntrySet> {
    let mut set = EntrySet::new();
    for path in paths {
        set.extend(read_file(path, dialect)?);
    }
    Ok(set)
}
