// Debug script to show what extracting an archive would produce

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use project_sync::utilities::PatternMatcher;
use project_sync::AppConfig;

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: archive-ls <archive.zip>")?;

    let config = AppConfig::default();
    let excludes = PatternMatcher::new(config.extract_excludes.clone());

    let file = File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Not a readable archive: {}", path.display()))?;

    println!("=== ARCHIVE INFO ===");
    println!("File: {}", path.display());
    println!("Entries: {}", archive.len());
    println!();

    println!("=== ENTRIES ===");
    let mut roots = std::collections::BTreeSet::new();
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let marker = match entry.enclosed_name() {
            None => "UNSAFE",
            Some(name) if excludes.should_exclude(&name) => "skip",
            Some(name) => {
                if let Some(first) = name.components().next() {
                    roots.insert(first.as_os_str().to_string_lossy().to_string());
                }
                if entry.is_dir() { "dir" } else { "file" }
            }
        };
        println!("  [{:>6}] {} ({} bytes)", marker, entry.name(), entry.size());
    }
    println!();

    println!("=== TOP LEVEL ===");
    for root in &roots {
        println!("  {}", root);
    }
    if roots.len() == 1 && config.archive.flatten_single_root {
        println!("  single top-level entry; hoisted into the workspace if it is a directory");
    }

    Ok(())
}
