//! Undo log for a group of file writes that must land together.
//!
//! Each file is [`tracked`](StagedWrites::track) right before it is written.
//! If a later step fails, [`restore`](StagedWrites::restore) puts the
//! previous bytes back, removes files that did not exist, and removes any
//! directories the writes had to create.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct StagedWrites {
    /// Tracked files with their contents before the write (`None` if absent).
    files: Vec<(PathBuf, Option<Vec<u8>>)>,
    created_dirs: Vec<PathBuf>,
}

impl StagedWrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots `path`. Call before writing it.
    pub fn track(&mut self, path: &Path) -> io::Result<()> {
        let prior = match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };
        if let Some(dir) = topmost_missing_dir(path) {
            self.created_dirs.push(dir);
        }
        self.files.push((path.to_path_buf(), prior));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Reverts every tracked file, newest first. A failed revert is logged
    /// and the remaining ones still run.
    pub fn restore(self) {
        for (path, prior) in self.files.into_iter().rev() {
            let result = match prior {
                Some(bytes) => fs::write(&path, bytes),
                None => ignore_missing(fs::remove_file(&path)),
            };
            if let Err(e) = result {
                tracing::error!(path = %path.display(), error = %e, "could not revert file");
            }
        }
        for dir in self.created_dirs.into_iter().rev() {
            if let Err(e) = ignore_missing(fs::remove_dir_all(&dir)) {
                tracing::error!(path = %dir.display(), error = %e, "could not remove directory");
            }
        }
    }
}

fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Outermost ancestor of `path` that does not exist yet.
fn topmost_missing_dir(path: &Path) -> Option<PathBuf> {
    let mut missing = None;
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir.as_os_str().is_empty() || dir.exists() {
            break;
        }
        missing = Some(dir.to_path_buf());
        current = dir.parent();
    }
    missing
}
