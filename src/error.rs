use std::path::PathBuf;
use thiserror::Error;

/// Failures that void a single entry. Anything here aborts that entry's
/// processing only; the surrounding run keeps going.
///
/// Non-fatal problems (a missing image file, a fragment the converter
/// chokes on, a media copy failure) are not errors at all: they are
/// reported as diagnostics at the point of occurrence and the entry
/// proceeds without the offending item.
#[derive(Debug, Error)]
pub enum EntryError {
    /// The document has no `div.pageHeader`, or its text is empty.
    /// Without a header there is no date, and without a date there is
    /// no entry.
    #[error("no date header found in {}", .0.display())]
    MissingDate(PathBuf),

    /// The header text was present but matched none of the known date
    /// layouts. Carries the original header for the diagnostic.
    #[error("could not parse date header {header:?}")]
    DateParse { header: String },

    /// Nothing came out of the document: no Markdown body and no media.
    /// A legitimately written entry always has at least one of the two,
    /// so this signals an extraction failure.
    #[error("entry produced no content and no media")]
    EmptyEntry,

    #[error("reading entry document: {0}")]
    Read(#[from] std::io::Error),
}
