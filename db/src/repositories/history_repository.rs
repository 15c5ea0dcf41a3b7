use std::fs::File;
use std::path::{Path, PathBuf};

use util::paths::ensure_parent_dir;

use crate::error::{StorageError, StorageResult};
use crate::models::submission_record::{HistoryRow, SubmissionRecord};

/// Append-only history of graded submissions, stored as one CSV file.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    path: PathBuf,
}

impl HistoryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record. A missing file is an empty history.
    pub fn load(&self) -> StorageResult<Vec<SubmissionRecord>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let mut reader = csv::Reader::from_reader(file);
        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<HistoryRow>().enumerate() {
            let row = row.map_err(|e| StorageError::corrupt(&self.path, format!("row {}: {e}", i + 1)))?;
            records.push(SubmissionRecord::from(row));
        }
        Ok(records)
    }

    /// Records belonging to one assignment, in history order.
    pub fn for_assignment(&self, assignment: &str) -> StorageResult<Vec<SubmissionRecord>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| r.assignment == assignment)
            .collect())
    }

    /// Adds `record` at the end and rewrites the file.
    pub fn append(&self, record: &SubmissionRecord) -> StorageResult<()> {
        let mut records = self.load()?;
        records.push(record.clone());
        self.save(&records)?;
        tracing::info!(
            path = %self.path.display(),
            submitter = %record.submitter,
            total = record.total,
            rows = records.len(),
            "history updated"
        );
        Ok(())
    }

    /// Replaces the file with `records`.
    pub fn save(&self, records: &[SubmissionRecord]) -> StorageResult<()> {
        ensure_parent_dir(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let mut writer = csv::Writer::from_path(&self.path)?;
        for record in records {
            writer.serialize(HistoryRow::from(record))?;
        }
        writer.flush().map_err(|e| StorageError::io(&self.path, e))?;
        Ok(())
    }
}
