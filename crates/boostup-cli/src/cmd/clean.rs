//! Clean command (source cache cleanup)

use std::fs;

use anyhow::{Context, Result};
use boostup_schema::{ARCHIVE_EXTENSION, LIB_NAME};

use crate::GlobalArgs;

/// Suffix of interrupted downloads.
const PARTIAL_SUFFIX: &str = ".part";

/// Remove extracted source trees, and archives when `archives` is set
pub fn clean(global: &GlobalArgs, archives: bool) -> Result<()> {
    let cache = global.layout()?.cache_root();
    if !cache.is_dir() {
        println!("Nothing to clean.");
        return Ok(());
    }

    let prefix = format!("{LIB_NAME}_");
    let mut removed = 0usize;

    for entry in fs::read_dir(&cache).with_context(|| format!("Failed to read {}", cache.display()))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(&prefix) {
            continue;
        }

        if path.is_dir() {
            tracing::debug!(path = %path.display(), "removing source tree");
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            removed += 1;
        } else if name.ends_with(PARTIAL_SUFFIX) || (archives && name.ends_with(ARCHIVE_EXTENSION)) {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            removed += 1;
        }
    }

    println!("Removed {removed} item(s) from {}", cache.display());
    Ok(())
}
