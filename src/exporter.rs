use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use indicatif::ProgressBar;

use crate::importer::JournalEntry;
use crate::utils::sanitize_title;

/// Write one entry to `output_dir`: copy its media into `media/` under
/// the pre-assigned unique names, then write the Markdown document.
///
/// A failed media copy is a diagnostic, not an error; the remaining
/// media and the Markdown write still happen. Only a failed Markdown
/// write fails the entry. Returns the path written.
pub fn write_entry(
    entry: &JournalEntry,
    output_dir: &Path,
    used_names: &mut HashSet<String>,
    pb: &ProgressBar,
) -> Result<PathBuf> {
    let media_dir = output_dir.join("media");
    fs::create_dir_all(&media_dir)
        .wrap_err_with(|| format!("Failed to create media directory: {}", media_dir.display()))?;

    for (src, new_name) in &entry.media {
        let dst = media_dir.join(new_name);
        if let Err(e) = fs::copy(src, &dst) {
            pb.println(format!(
                "Warning: could not copy {} → {}: {}",
                src.display(),
                dst.display(),
                e
            ));
        }
    }

    let date = entry.created_at.format("%Y-%m-%d").to_string();
    let file_name = allocate_filename(&date, &entry.title, used_names);
    let path = output_dir.join(file_name);
    fs::write(&path, &entry.markdown)
        .wrap_err_with(|| format!("Failed to write: {}", path.display()))?;
    Ok(path)
}

/// `<date>-<sanitized title>.md`, date alone when the title is empty.
///
/// `used` is the per-run registry of claimed names: when a later entry
/// lands on a name an earlier one already took, it gets a numeric
/// suffix instead of silently overwriting.
fn allocate_filename(date: &str, title: &str, used: &mut HashSet<String>) -> String {
    let safe = sanitize_title(title);
    let stem = if safe.is_empty() {
        date.to_string()
    } else {
        format!("{date}-{safe}")
    };

    let mut candidate = format!("{stem}.md");
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{stem}-{n}.md");
        n += 1;
    }
    candidate
}
