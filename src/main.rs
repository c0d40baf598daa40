//! btfx CLI - extract embedded XML metadata from BTF container files.
//!
//! Takes a single BTF file or a directory of them, locates the embedded XML
//! block in each, and writes a `.xml`/`.txt` output pair per file.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use btfx_meta::{extract_metadata, report};

/// Extract XML metadata from BTF container files
#[derive(Parser)]
#[command(name = "btfx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input BTF file or directory containing BTF files
    input: PathBuf,

    /// Output directory (defaults to the input's containing directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let output_dir = match cli.output {
        Some(dir) => dir,
        None => cli
            .input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    fs::create_dir_all(&output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;

    if cli.input.is_file() {
        process_file(&cli.input, &output_dir)?;
    } else if cli.input.is_dir() {
        process_directory(&cli.input, &output_dir)?;
    } else {
        bail!("Input path does not exist: {}", cli.input.display());
    }

    Ok(())
}

/// Process every `.btf` file directly inside `dir` (non-recursive).
fn process_directory(dir: &Path, output_dir: &Path) -> Result<()> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(OsStr::to_str) == Some("btf")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        println!("No BTF files found in {}", dir.display());
        return Ok(());
    }

    println!("Found {} BTF files to process", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    for file in &files {
        // Read/locate failures are per-file; output write failures propagate.
        process_file(file, output_dir)?;
        pb.inc(1);
    }

    pb.finish_with_message("Done");

    Ok(())
}

/// Process one container: read, locate, convert, emit.
fn process_file(path: &Path, output_dir: &Path) -> Result<()> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            return Ok(());
        }
    };

    let Some(extraction) = extract_metadata(&data) else {
        println!("No XML metadata found in {}", path.display());
        return Ok(());
    };

    println!(
        "Found XML metadata in {} ({})",
        path.display(),
        extraction.strategy
    );

    let stem = path.file_stem().unwrap_or_else(|| path.as_os_str());
    let base = output_dir.join(stem);

    let pair = report::emit(&extraction.xml, &extraction.metadata, &base)
        .with_context(|| format!("Failed to write output for {}", path.display()))?;

    println!("Raw XML metadata saved to {}", pair.xml_path.display());
    println!("Formatted metadata saved to {}", pair.txt_path.display());

    Ok(())
}
