//! Lookup of installed library files by short name.
//!
//! Boost names its binaries differently per platform and build variant
//! (`libboost_system.so.1.60.0`, `libboost_system-mt-x64.a`,
//! `boost_system-vc141-mt-x64-1_67.lib`). A short name such as `system` is
//! resolved to the full link name by matching file stems.

use std::path::{Path, PathBuf};

use boostup_schema::LIB_NAME;
use regex::Regex;
use tracing::debug;

use crate::error::{ProvisionError, Result};

/// Ordered library search directories.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LibraryIndex {
    dirs: Vec<PathBuf>,
}

impl LibraryIndex {
    /// Index over `dirs`, searched in order.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// The search directories.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Number of search directories.
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// Whether there are no search directories.
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Search directory at `index`.
    pub fn get(&self, index: usize) -> Result<&Path> {
        self.dirs
            .get(index)
            .map(PathBuf::as_path)
            .ok_or(ProvisionError::IndexOutOfRange {
                index,
                len: self.dirs.len(),
            })
    }

    /// Full library name for `name`, e.g. `system` → `boost_system-mt-x64`.
    ///
    /// Directories are scanned in order and their entries by file name; the
    /// first regular file whose stem matches wins.
    pub fn lookup(&self, name: &str) -> Result<String> {
        // A name the pattern cannot hold names no installed library either
        let pattern = library_pattern(name).map_err(|_| self.not_found(name))?;

        for dir in &self.dirs {
            let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file())
                .collect();
            files.sort();

            for file in files {
                let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if let Some(full) = pattern.captures(stem).and_then(|c| c.name("fullname")) {
                    debug!(name, file = %file.display(), "library match");
                    return Ok(full.as_str().to_string());
                }
            }
        }

        Err(self.not_found(name))
    }

    fn not_found(&self, name: &str) -> ProvisionError {
        ProvisionError::LibraryNotFound {
            name: name.to_string(),
            dirs: self.dirs.clone(),
        }
    }
}

/// `(lib)?boost_<name>` followed by end of stem or a character that cannot
/// continue a library name, so `system` never matches `boost_system_extra`.
fn library_pattern(name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"^(?:lib)?(?P<fullname>{LIB_NAME}_{}(?:[^_a-z].*)?)$",
        regex::escape(name)
    ))
}
