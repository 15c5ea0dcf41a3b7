//! Reading uploaded submission archives.
//!
//! Uploads are `.zip` files named `<prefix><n>-<handle>.zip`. The archive must
//! carry at least one `.ipynb` notebook outside the `__MACOSX/` metadata tree;
//! the first such entry in archive order is the submission.

use regex::Regex;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::read::ZipArchive;

use crate::config::ArchiveLimits;
use crate::paths::ensure_parent_dir;

const NOTEBOOK_EXTENSION: &str = ".ipynb";
const PLATFORM_METADATA_PREFIX: &str = "__MACOSX";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("invalid filename '{0}': expected <prefix><number>-<name>.zip")]
    InvalidFilename(String),

    #[error("archive could not be read: {0}")]
    Unreadable(String),

    #[error("archive does not contain a .ipynb notebook")]
    MissingNotebook,

    #[error("archive entry '{0}' escapes the archive root")]
    UnsafePath(String),

    #[error("uncompressed archive size exceeds {0} bytes")]
    TooLarge(u64),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parts of a valid submission filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFilename {
    /// Assignment token as written by the student, e.g. `cap2`.
    pub assignment: String,
    /// Assignment number parsed from the token.
    pub number: u32,
    /// Lower-cased submitter handle.
    pub handle: String,
}

/// Validates `name` against `^(<prefix>\d{1,2})-([a-zA-Z0-9_]+)\.zip$`.
pub fn parse_submission_filename(
    name: &str,
    prefix: &str,
) -> Result<SubmissionFilename, ArchiveError> {
    let pattern = format!(r"^({}(\d{{1,2}}))-([a-zA-Z0-9_]+)\.zip$", regex::escape(prefix));
    let re = Regex::new(&pattern).map_err(|_| ArchiveError::InvalidFilename(name.to_string()))?;

    let caps = re
        .captures(name)
        .ok_or_else(|| ArchiveError::InvalidFilename(name.to_string()))?;

    let number = caps[2]
        .parse::<u32>()
        .map_err(|_| ArchiveError::InvalidFilename(name.to_string()))?;

    Ok(SubmissionFilename {
        assignment: caps[1].to_string(),
        number,
        handle: caps[3].to_lowercase(),
    })
}

/// A file pulled out of an archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Path of the entry inside the archive.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    /// Final path component of the entry name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Locates the submitted notebook inside a zip archive held in memory.
pub fn find_notebook(archive_bytes: &[u8], limits: ArchiveLimits) -> Result<ArchiveEntry, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes))
        .map_err(|e| ArchiveError::Unreadable(e.to_string()))?;

    let mut total_uncompressed_size: u64 = 0;
    let mut candidate: Option<usize> = None;

    for i in 0..archive.len() {
        let file = archive
            .by_index(i)
            .map_err(|e| ArchiveError::Unreadable(e.to_string()))?;

        if file.enclosed_name().is_none() {
            return Err(ArchiveError::UnsafePath(file.name().to_string()));
        }

        total_uncompressed_size += file.size();
        if total_uncompressed_size > limits.max_uncompressed_size {
            return Err(ArchiveError::TooLarge(limits.max_uncompressed_size));
        }

        if candidate.is_none() && is_notebook_entry(file.name()) {
            candidate = Some(i);
        }
    }

    let index = candidate.ok_or(ArchiveError::MissingNotebook)?;
    let mut file = archive
        .by_index(index)
        .map_err(|e| ArchiveError::Unreadable(e.to_string()))?;

    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes)?;

    Ok(ArchiveEntry {
        name: file.name().to_string(),
        bytes,
    })
}

fn is_notebook_entry(name: &str) -> bool {
    !name.ends_with('/')
        && name.to_lowercase().ends_with(NOTEBOOK_EXTENSION)
        && !name.starts_with(PLATFORM_METADATA_PREFIX)
}

/// Stores the uploaded archive as received.
pub fn save_upload(path: &Path, bytes: &[u8]) -> Result<(), ArchiveError> {
    ensure_parent_dir(path)?;
    fs::write(path, bytes)?;
    Ok(())
}
