use super::r#trait::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// In-memory file tree for exercising discovery without touching disk
///
/// Parent directories are created implicitly when a file or directory is
/// added. Individual directories can be marked unreadable to simulate
/// listing failures.
#[derive(Debug, Default, Clone)]
pub struct MockFileSystem {
    entries: BTreeMap<PathBuf, FileType>,
    unreadable: HashSet<PathBuf>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        let path = path.into();
        self.add_parents(&path);
        self.entries.insert(path, FileType::File);
        self
    }

    pub fn add_dir(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        let path = path.into();
        self.add_parents(&path);
        self.entries.insert(path, FileType::Directory);
        self
    }

    pub fn deny_read(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.unreadable.insert(path.into());
        self
    }

    fn add_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.entries
                .entry(ancestor.to_path_buf())
                .or_insert(FileType::Directory);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        self.entries.get(path) == Some(&FileType::Directory)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        if self.unreadable.contains(path) {
            return Err(anyhow!("Permission denied: {}", path.display()));
        }
        if !self.is_dir(path) {
            return Err(anyhow!("Not a directory: {}", path.display()));
        }

        Ok(self
            .entries
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .map(|(p, file_type)| DirEntry {
                path: p.clone(),
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                file_type: *file_type,
            })
            .collect())
    }
}
