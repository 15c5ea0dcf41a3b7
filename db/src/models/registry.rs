use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{StorageError, StorageResult};

/// Cell value marking a delivered, not yet awarded, submission.
pub const DELIVERED: &str = "✅";

/// The roster and per-assignment status table.
///
/// The first column holds submitter names; every other column is an
/// assignment whose cells are empty, [`DELIVERED`], or an award marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registry {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Registry {
    /// Empty registry with only the name column.
    pub fn new(name_header: &str) -> Self {
        Self {
            headers: vec![name_header.to_string()],
            rows: Vec::new(),
        }
    }

    /// Registry listing `names`, with no assignment columns.
    pub fn with_names<I, S>(name_header: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new(name_header);
        registry.rows = names.into_iter().map(|n| vec![n.into()]).collect();
        registry
    }

    fn row_index(&self, handle: &str) -> Option<usize> {
        let wanted = handle.trim().to_lowercase();
        self.rows
            .iter()
            .position(|row| row.first().is_some_and(|name| name.trim().to_lowercase() == wanted))
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Case-insensitive roster lookup.
    pub fn contains(&self, handle: &str) -> bool {
        self.row_index(handle).is_some()
    }

    /// Adds `column` (empty for every row) if it is not present yet; returns its index.
    pub fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(idx) = self.column_index(column) {
            return idx;
        }
        self.headers.push(column.to_string());
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
        width - 1
    }

    pub fn cell(&self, handle: &str, column: &str) -> Option<&str> {
        let row = self.row_index(handle)?;
        let col = self.column_index(column)?;
        self.rows[row].get(col).map(String::as_str)
    }

    /// Marks `handle` as delivered for `column`.
    ///
    /// A cell already holding an award marker is left untouched.
    pub fn mark_delivered(&mut self, handle: &str, column: &str) -> StorageResult<()> {
        let row = self
            .row_index(handle)
            .ok_or_else(|| StorageError::UnknownSubmitter(handle.to_string()))?;
        let col = self.ensure_column(column);
        let cell = &mut self.rows[row][col];
        if cell.trim().is_empty() || cell == DELIVERED {
            *cell = DELIVERED.to_string();
        }
        Ok(())
    }

    /// Replaces the [`DELIVERED`] cell of each winner with its marker.
    ///
    /// Winners whose cell holds anything else are skipped. Returns the
    /// number of cells changed.
    pub fn apply_awards<'a, I>(&mut self, column: &str, awards: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let Some(col) = self.column_index(column) else {
            return 0;
        };
        let mut changes = 0;
        for (handle, marker) in awards {
            let Some(row) = self.row_index(handle) else {
                tracing::warn!(handle, "award winner missing from registry");
                continue;
            };
            let cell = &mut self.rows[row][col];
            if cell == DELIVERED {
                *cell = marker.to_string();
                changes += 1;
            }
        }
        changes
    }

    /// Whether any cell of `column` already holds one of `markers`.
    pub fn has_award_markers(&self, column: &str, markers: &[&str]) -> bool {
        let Some(col) = self.column_index(column) else {
            return false;
        };
        self.rows.iter().any(|row| {
            row.get(col)
                .is_some_and(|cell| markers.iter().any(|m| cell.contains(m)))
        })
    }

    /// Rows keyed by header, for JSON output.
    pub fn to_maps(&self) -> Vec<BTreeMap<String, String>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned().chain(std::iter::repeat(String::new())))
                    .collect()
            })
            .collect()
    }
}
