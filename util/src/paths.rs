use chrono::NaiveDate;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

// ─── Paths inside the state repository ──────────────────────────────

/// Uploaded archives: {REPO_DIR}/uploads/{folder}
pub fn uploads_dir(repo_dir: &Path, folder: &str) -> PathBuf {
    repo_dir.join("uploads").join(folder)
}

/// Original archive as uploaded: {REPO_DIR}/uploads/{folder}/{filename}
pub fn upload_path(repo_dir: &Path, folder: &str, filename: &str) -> PathBuf {
    uploads_dir(repo_dir, folder).join(filename)
}

/// Extracted notebooks: {REPO_DIR}/solutions/{folder}
pub fn solutions_dir(repo_dir: &Path, folder: &str) -> PathBuf {
    repo_dir.join("solutions").join(folder)
}

/// Extracted notebook of one delivery: .../solutions/{folder}/{handle}_{YYYY-MM-DD}.ipynb
pub fn solution_path(repo_dir: &Path, folder: &str, handle: &str, date: NaiveDate) -> PathBuf {
    solutions_dir(repo_dir, folder).join(format!("{handle}_{}.ipynb", date.format("%Y-%m-%d")))
}

/// Resolve a table path configured relative to the repository.
pub fn repo_file(repo_dir: &Path, relative: &str) -> PathBuf {
    let p = Path::new(relative);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        repo_dir.join(p)
    }
}
