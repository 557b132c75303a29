use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};

use crate::error::EntryError;

/// Configuration required to run the conversion.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Clone)]
pub struct ExportConfig {
    pub archive_path: PathBuf,
    pub output_dir: PathBuf,
    pub verbose: bool,
    pub quiet: bool,
}

/// Layouts tried in order against the part after the weekday prefix.
const DATE_LAYOUTS: &[&str] = &["%B %d, %Y", "%b %d, %Y"];

/// Parse a journal page header like "Tuesday, December 12, 2023".
///
/// Everything up to and including the first comma (the weekday) is
/// discarded when present. The source carries no time component, so the
/// result is pinned to noon UTC to keep the calendar date stable across
/// timezones.
pub fn parse_header_date(header: &str) -> Result<DateTime<Utc>, EntryError> {
    let date_part = match header.split_once(',') {
        Some((_, rest)) => rest.trim(),
        None => header.trim(),
    };

    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, layout) {
            let noon = date.and_hms_opt(12, 0, 0).expect("noon is a valid time");
            return Ok(noon.and_utc());
        }
    }

    Err(EntryError::DateParse {
        header: header.to_string(),
    })
}

/// Best-effort title from an entry file name following the export's
/// `<id>_<Title_Words>` convention, where `<id>` is a hyphenated
/// identifier. Underscores in the remainder become spaces.
///
/// This is a heuristic, not a contract: anything that doesn't match the
/// shape yields `None` and the entry simply goes untitled.
pub fn title_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (prefix, rest) = stem.split_once('_')?;
    if !prefix.contains('-') || rest.is_empty() {
        return None;
    }
    Some(rest.replace('_', " "))
}

/// Make a title safe for use inside a file name: path separators become
/// hyphens, double quotes become single quotes.
pub fn sanitize_title(title: &str) -> String {
    title.replace(['/', '\\'], "-").replace('"', "'")
}
