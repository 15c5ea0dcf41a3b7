use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Originality of a submission relative to the reference solution.
///
/// Variants are declared in increasing order of similarity so the derived
/// `Ord` is the severity order: `Original < Inspired < ModifiedCopy < DirectCopy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OriginalityLabel {
    Original,
    Inspired,
    ModifiedCopy,
    DirectCopy,
}

impl OriginalityLabel {
    pub const ALL: [OriginalityLabel; 4] = [
        OriginalityLabel::Original,
        OriginalityLabel::Inspired,
        OriginalityLabel::ModifiedCopy,
        OriginalityLabel::DirectCopy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OriginalityLabel::Original => "Original",
            OriginalityLabel::Inspired => "Inspired",
            OriginalityLabel::ModifiedCopy => "ModifiedCopy",
            OriginalityLabel::DirectCopy => "DirectCopy",
        }
    }

    /// Copies are never eligible for awards.
    pub fn is_copy(&self) -> bool {
        matches!(self, OriginalityLabel::ModifiedCopy | OriginalityLabel::DirectCopy)
    }
}

impl fmt::Display for OriginalityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OriginalityLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OriginalityLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown originality label '{s}'"))
    }
}

/// The five rubric categories a grade is split into.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SubScores {
    pub exploration: f64,
    pub preprocessing: f64,
    pub modeling: f64,
    pub evaluation: f64,
    pub documentation: f64,
}

impl SubScores {
    pub fn sum(&self) -> f64 {
        self.exploration + self.preprocessing + self.modeling + self.evaluation + self.documentation
    }
}

/// One graded submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRecord {
    /// Lower-cased submitter handle, as found in the roster.
    pub submitter: String,
    pub assignment: String,
    pub originality: OriginalityLabel,
    /// Similarity against the reference, in `[0, 1]`.
    pub similarity: f64,
    /// Grade in `[0, 10]`; always the sum of `scores`.
    pub total: f64,
    pub scores: SubScores,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
}

/// Flat CSV shape of a [`SubmissionRecord`].
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct HistoryRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Assignment")]
    assignment: String,
    #[serde(rename = "Originality")]
    originality: OriginalityLabel,
    #[serde(rename = "Similarity")]
    similarity: f64,
    #[serde(rename = "Total")]
    total: f64,
    #[serde(rename = "Exploration")]
    exploration: f64,
    #[serde(rename = "Preprocessing")]
    preprocessing: f64,
    #[serde(rename = "Modeling")]
    modeling: f64,
    #[serde(rename = "Evaluation")]
    evaluation: f64,
    #[serde(rename = "Documentation")]
    documentation: f64,
    #[serde(rename = "Comment", default)]
    comment: String,
    #[serde(rename = "Timestamp")]
    timestamp: DateTime<Utc>,
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

impl From<&SubmissionRecord> for HistoryRow {
    fn from(r: &SubmissionRecord) -> Self {
        Self {
            name: r.submitter.clone(),
            assignment: r.assignment.clone(),
            originality: r.originality,
            similarity: round3(r.similarity),
            total: r.total,
            exploration: r.scores.exploration,
            preprocessing: r.scores.preprocessing,
            modeling: r.scores.modeling,
            evaluation: r.scores.evaluation,
            documentation: r.scores.documentation,
            comment: r.comment.clone(),
            timestamp: r.timestamp,
        }
    }
}

impl From<HistoryRow> for SubmissionRecord {
    fn from(row: HistoryRow) -> Self {
        Self {
            submitter: row.name,
            assignment: row.assignment,
            originality: row.originality,
            similarity: row.similarity,
            total: row.total,
            scores: SubScores {
                exploration: row.exploration,
                preprocessing: row.preprocessing,
                modeling: row.modeling,
                evaluation: row.evaluation,
                documentation: row.documentation,
            },
            comment: row.comment,
            timestamp: row.timestamp,
        }
    }
}
