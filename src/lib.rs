//! # apple-journal-export
//!
//! A CLI tool that converts an Apple Journal HTML export into local Markdown files.
//!
//! ## What it does
//!
//! The Journal app exports entries as a ZIP bundle: one HTML document per
//! entry plus the image assets those documents reference. This tool extracts
//! the bundle into a scratch directory, parses each entry's HTML into a
//! structured record (date, title, ordered body content, media references),
//! and writes one Markdown file per entry. Referenced images are copied into
//! a shared `media/` folder under collision-free names and linked by relative
//! path, so the output directory is self-contained.
//!
//! Text and photo blocks keep their original top-to-bottom order. Entries
//! that cannot be parsed (no date header, nothing extractable) are skipped
//! with a diagnostic; one broken entry never aborts the run.
//!
//! ## Usage
//!
//! ```sh
//! # Convert an export into a directory of Markdown files
//! apple-journal-export journal-export.zip ~/notes/journal
//! ```
//!
//! A default output directory can be persisted in
//! `~/.config/apple-journal-export/config.toml`.
//!
//! ## Compatibility
//!
//! Tracks the (undocumented) structure of the Journal HTML export:
//! `div.pageHeader` for the date, `div.title span.s2` for the title, and
//! `div.assetGrid` blocks for embedded photos. If an OS update changes the
//! export format, please open an issue.
