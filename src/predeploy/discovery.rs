//! Project descriptor discovery
//!
//! Looks for `*.csproj` files in the workspace root and, when the root has
//! none, in each immediate subdirectory. Only a single unambiguous match is
//! considered usable.

use crate::fs::FileSystem;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

fn descriptor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\.csproj$").expect("descriptor pattern is valid"))
}

/// Candidates found by a single discovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub candidates: Vec<PathBuf>,
}

impl Discovery {
    pub fn count(&self) -> usize {
        self.candidates.len()
    }

    /// The descriptor, if exactly one was found
    pub fn descriptor(&self) -> Option<&Path> {
        match self.candidates.as_slice() {
            [only] => Some(only.as_path()),
            _ => None,
        }
    }

    /// Directory containing the descriptor, or `root` when ambiguous
    pub fn project_dir(&self, root: &Path) -> PathBuf {
        self.descriptor()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf())
    }
}

/// Directory-listing errors propagate unchanged
pub fn discover_descriptor(fs: &dyn FileSystem, root: &Path) -> anyhow::Result<Discovery> {
    let mut candidates = descriptors_in(fs, root)?;

    if candidates.is_empty() {
        for entry in fs.read_dir(root)? {
            if fs.is_dir(entry.path()) {
                candidates.extend(descriptors_in(fs, entry.path())?);
            }
        }
    }

    debug!(
        root = %root.display(),
        csproj_count = candidates.len(),
        "Project descriptor discovery finished"
    );

    Ok(Discovery { candidates })
}

fn descriptors_in(fs: &dyn FileSystem, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    Ok(fs
        .read_dir(dir)?
        .into_iter()
        .filter(|entry| !entry.is_dir())
        .filter(|entry| descriptor_pattern().is_match(&entry.path().to_string_lossy()))
        .map(|entry| entry.path)
        .collect())
}
