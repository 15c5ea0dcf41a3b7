use std::fs::File;
use std::path::{Path, PathBuf};

use util::paths::ensure_parent_dir;

use crate::error::{StorageError, StorageResult};
use crate::models::Registry;

/// The roster/status table stored as CSV.
///
/// Unlike the history, the registry must exist: it is the roster against
/// which submitters are validated.
#[derive(Debug, Clone)]
pub struct RegistryRepository {
    path: PathBuf,
}

impl RegistryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> StorageResult<Registry> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::Missing(self.path.clone()));
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| StorageError::corrupt(&self.path, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        if headers.is_empty() || headers[0].trim().is_empty() {
            return Err(StorageError::corrupt(&self.path, "missing name column"));
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| StorageError::corrupt(&self.path, format!("row {}: {e}", i + 1)))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() > width {
                return Err(StorageError::corrupt(
                    &self.path,
                    format!("row {} has {} cells, expected {width}", i + 1, row.len()),
                ));
            }
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Registry { headers, rows })
    }

    pub fn save(&self, registry: &Registry) -> StorageResult<()> {
        ensure_parent_dir(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(&registry.headers)?;
        for row in &registry.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| StorageError::io(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), rows = registry.rows.len(), "registry saved");
        Ok(())
    }
}
