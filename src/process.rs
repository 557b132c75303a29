use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};

use crate::convert::MarkdownConverter;
use crate::exporter;
use crate::importer;
use crate::utils::ExportConfig;

pub struct RunSummary {
    pub converted: usize,
    pub failed: usize,
}

/// The conversion loop: enumerate entry documents under `entries_root`,
/// extract and write each one, and keep going past per-entry failures.
///
/// Only two things are fatal here: failing to enumerate the entries
/// root itself, and a run where every attempted entry failed.
pub fn execute(config: &ExportConfig, entries_root: &Path) -> Result<RunSummary> {
    fs::create_dir_all(&config.output_dir).wrap_err_with(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;

    let documents = collect_entry_documents(entries_root)?;

    let pb = if config.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(documents.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)",
            )
            .unwrap()
            .progress_chars("=>-"),
        );
        bar.println(format!("Found {} entries.", documents.len()));
        bar
    };

    let converter = MarkdownConverter::new();
    let mut used_names: HashSet<String> = HashSet::new();
    let mut converted = 0usize;
    let mut failed = 0usize;

    for doc in &documents {
        match importer::extract_entry(doc, &converter, &pb) {
            Ok(entry) => {
                match exporter::write_entry(&entry, &config.output_dir, &mut used_names, &pb) {
                    Ok(path) => {
                        converted += 1;
                        if config.verbose {
                            pb.println(format!("Converted: {}", path.display()));
                        }
                    }
                    Err(e) => {
                        failed += 1;
                        pb.println(format!("Error [{}]: {:#}", doc.display(), e));
                    }
                }
            }
            Err(e) => {
                failed += 1;
                pb.println(format!("Error [{}]: {}", doc.display(), e));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    if converted == 0 && !documents.is_empty() {
        return Err(eyre!(
            "no entries could be converted ({} attempted, all failed)",
            documents.len()
        ));
    }

    Ok(RunSummary { converted, failed })
}

/// All `.html` documents under `root`, recursively, sorted for a
/// deterministic processing order. Failing to read `root` is fatal;
/// unreadable subdirectories are skipped.
fn collect_entry_documents(root: &Path) -> Result<Vec<PathBuf>> {
    let top = fs::read_dir(root)
        .wrap_err_with(|| format!("Failed to enumerate entries root: {}", root.display()))?;

    let mut docs = Vec::new();
    for entry in top.filter_map(|e| e.ok()) {
        visit(&entry.path(), &mut docs);
    }
    docs.sort();
    Ok(docs)
}

fn visit(path: &Path, docs: &mut Vec<PathBuf>) {
    if path.is_dir() {
        let Ok(read) = fs::read_dir(path) else {
            return;
        };
        for entry in read.filter_map(|e| e.ok()) {
            visit(&entry.path(), docs);
        }
    } else if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
    {
        docs.push(path.to_path_buf());
    }
}
