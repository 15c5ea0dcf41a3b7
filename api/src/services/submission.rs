//! The upload pipeline.
//!
//! A submission is fully validated and assessed before anything is written:
//!
//! 1. deadline, filename, archive and notebook checks (no I/O on the state repo);
//! 2. under the write lock: pull, roster check, reference download, assessment;
//! 3. history and registry loaded and updated in memory;
//! 4. archive copy, notebook copy, history file, registry file, all reverted
//!    together if any of them fails;
//! 5. commit and push.
//!
//! A failed push leaves the local state in place; the receipt reports
//! `synced: false` and the next successful push carries the change along.

use chrono::{DateTime, Utc};
use std::path::Path;

use db::StorageError;
use db::models::{Registry, SubmissionRecord};
use marker::completeness::CompletenessReport;
use marker::grading::Evaluation;
use marker::notebook::Notebook;
use marker::originality::OriginalityReport;
use serde::Serialize;
use util::archive::{find_notebook, parse_submission_filename, save_upload};
use util::http::fetch_first_json;
use util::paths::{solution_path, upload_path};
use util::staging::StagedWrites;

use crate::services::ServiceError;
use crate::state::AppState;

/// What the submitter gets back.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub submitter: String,
    pub assignment: String,
    /// Path of the graded notebook inside the archive.
    pub notebook: String,
    pub reference_url: String,
    pub originality: OriginalityReport,
    pub evaluation: Evaluation,
    pub completeness: CompletenessReport,
    /// `false` when the state repository could not be pushed.
    pub synced: bool,
    pub submitted_at: DateTime<Utc>,
}

pub async fn process_submission(
    state: &AppState,
    filename: &str,
    bytes: &[u8],
) -> Result<SubmissionReceipt, ServiceError> {
    let config = state.config();
    let assignment = &config.assignment;
    let now = Utc::now();

    if assignment.is_past_deadline(now) {
        return Err(ServiceError::SubmissionClosed {
            assignment: assignment.id.clone(),
            deadline: assignment.deadline,
        });
    }

    let parsed = parse_submission_filename(filename, &assignment.filename_prefix)?;
    let entry = find_notebook(bytes, config.archive)?;
    let submitted = Notebook::from_bytes(&entry.bytes)?;

    let _guard = state.write_lock().lock().await;

    state.sync().pull().await?;

    let registry_repo = state.registry();
    let mut registry = registry_repo.load()?;
    if !registry.contains(&parsed.handle) {
        return Err(StorageError::UnknownSubmitter(parsed.handle).into());
    }

    let (reference_url, reference_value) =
        fetch_first_json(state.http(), &config.reference.urls).await?;
    let reference = Notebook::from_value(reference_value)
        .map_err(|e| ServiceError::UpstreamUnavailable(format!("{reference_url}: {e}")))?;

    let assessment = state.assessor().assess(&submitted, &reference).await;

    tracing::info!(
        submitter = %parsed.handle,
        assignment = %assignment.id,
        originality = %assessment.originality.label,
        similarity = assessment.originality.similarity,
        total = assessment.evaluation.total,
        "submission assessed"
    );

    let record = SubmissionRecord {
        submitter: parsed.handle.clone(),
        assignment: assignment.id.clone(),
        originality: assessment.originality.label,
        similarity: assessment.originality.similarity,
        total: assessment.evaluation.total,
        scores: assessment.evaluation.scores,
        comment: assessment.evaluation.comment.clone(),
        timestamp: now,
    };
    let mut records = state.history().load()?;
    records.push(record);
    registry.mark_delivered(&parsed.handle, &assignment.column)?;

    let repo_dir = state.repo_dir();
    let upload = upload_path(repo_dir, &assignment.folder, filename);
    let solution = solution_path(repo_dir, &assignment.folder, &parsed.handle, now.date_naive());
    let writes = PendingWrites {
        upload: (upload.as_path(), bytes),
        solution: (solution.as_path(), entry.bytes.as_slice()),
        records: &records,
        registry: &registry,
    };
    let mut staged = StagedWrites::new();
    if let Err(e) = writes.apply(state, &mut staged) {
        tracing::error!(error = %e, files = staged.len(), "persisting submission failed, reverting");
        staged.restore();
        return Err(e);
    }
    tracing::info!(submitter = %parsed.handle, rows = records.len(), "submission stored");

    let message = format!(
        "{} - {} - Score: {:.1}/10",
        assignment.id, parsed.handle, assessment.evaluation.total
    );
    let synced = match state.sync().commit_and_push(&message).await {
        Ok(outcome) => {
            tracing::info!(?outcome, "state repository updated");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "push failed, submission kept locally");
            false
        }
    };

    Ok(SubmissionReceipt {
        submitter: parsed.handle,
        assignment: assignment.id.clone(),
        notebook: entry.name,
        reference_url,
        originality: assessment.originality,
        evaluation: assessment.evaluation,
        completeness: assessment.completeness,
        synced,
        submitted_at: now,
    })
}

/// Everything one accepted submission writes into the state repository.
struct PendingWrites<'a> {
    upload: (&'a Path, &'a [u8]),
    solution: (&'a Path, &'a [u8]),
    records: &'a [SubmissionRecord],
    registry: &'a Registry,
}

impl PendingWrites<'_> {
    /// Writes each file after snapshotting it into `staged`.
    fn apply(&self, state: &AppState, staged: &mut StagedWrites) -> Result<(), ServiceError> {
        for (path, bytes) in [self.upload, self.solution] {
            track(staged, path)?;
            save_upload(path, bytes)?;
        }

        let history = state.history();
        track(staged, history.path())?;
        history.save(self.records)?;

        let registry_repo = state.registry();
        track(staged, registry_repo.path())?;
        registry_repo.save(self.registry)?;
        Ok(())
    }
}

fn track(staged: &mut StagedWrites, path: &Path) -> Result<(), ServiceError> {
    staged
        .track(path)
        .map_err(|e| ServiceError::Internal(format!("{}: {e}", path.display())))
}
