mod archive;
mod convert;
mod error;
mod exporter;
mod importer;
mod process;
mod utils;

use clap::Parser;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Convert an Apple Journal HTML export ZIP into standalone Markdown files.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the exported journal ZIP archive.
    #[arg(value_name = "ARCHIVE")]
    archive: PathBuf,

    /// Directory to write Markdown files and copied media.
    /// Falls back to output_dir in config.toml if omitted.
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/apple-journal-export/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print each file written.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress standard output (progress bar and summary).
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    output_dir: Option<PathBuf>,
}

fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        // Search: XDG/OS config dir, then nothing
        dirs::config_dir()
            .map(|d| d.join("apple-journal-export/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load config file (CLI path > default path)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    // 2. Resolve output_dir (CLI > Config)
    let output_dir = cli.output_dir.or(file_cfg.output_dir).ok_or_else(|| {
        eyre!("No output directory given.\nPass OUTPUT_DIR or set output_dir in config.toml.")
    })?;

    if !cli.archive.exists() {
        return Err(eyre!("Archive not found at: {}", cli.archive.display()));
    }

    let config = utils::ExportConfig {
        archive_path: cli.archive,
        output_dir,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    // 3. Extract into a scratch directory; the guard removes it on every
    //    exit path, success or failure.
    let scratch = tempfile::tempdir().wrap_err("Failed to create scratch directory")?;
    let entries_root = archive::stage_archive(&config.archive_path, scratch.path())?;

    // 4. Run the conversion
    let summary = process::execute(&config, &entries_root)?;

    if !config.quiet {
        let mut line = format!("Done. {} converted.", summary.converted);
        if summary.failed > 0 {
            line.push_str(&format!(" Completed with {} error(s).", summary.failed));
        }
        eprintln!("{}", line);
    }

    Ok(())
}
