use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use eyre::{Context, Result, eyre};

/// Extract the journal archive into `dest` and return the entries root.
///
/// The scratch directory is owned by the caller (a tempdir guard), so
/// cleanup happens on every exit path regardless of what fails here.
pub fn stage_archive(archive_path: &Path, dest: &Path) -> Result<PathBuf> {
    unzip(archive_path, dest)
        .wrap_err_with(|| format!("Failed to extract: {}", archive_path.display()))?;
    locate_entries_root(dest)
}

/// Plain ZIP extraction. Any archive entry whose name would resolve
/// outside `dest` fails the whole extraction.
fn unzip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .wrap_err_with(|| format!("Failed to open archive: {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file).wrap_err("Failed to read ZIP archive")?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // enclosed_name rejects traversal-unsafe paths (zip-slip)
        let Some(rel) = entry.enclosed_name() else {
            return Err(eyre!("illegal file path in archive: {}", entry.name()));
        };
        let out_path = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out_file = File::create(&out_path)
            .wrap_err_with(|| format!("Failed to create: {}", out_path.display()))?;
        io::copy(&mut entry, &mut out_file)
            .wrap_err_with(|| format!("Failed to extract: {}", out_path.display()))?;
    }
    Ok(())
}

/// Find the `Entries` directory inside the extracted tree. Some exports
/// wrap everything in a single top-level directory; look one level down
/// in that case.
fn locate_entries_root(extract_dir: &Path) -> Result<PathBuf> {
    let direct = extract_dir.join("Entries");
    if direct.is_dir() {
        return Ok(direct);
    }

    let top: Vec<_> = fs::read_dir(extract_dir)
        .wrap_err_with(|| format!("Failed to read: {}", extract_dir.display()))?
        .filter_map(|e| e.ok())
        .collect();
    if top.len() == 1 && top[0].path().is_dir() {
        let nested = top[0].path().join("Entries");
        if nested.is_dir() {
            return Ok(nested);
        }
    }

    Err(eyre!(
        "Entries directory not found in the archive. Is this a journal export ZIP?"
    ))
}
