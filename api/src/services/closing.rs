use chrono::{DateTime, Utc};
use marker::awards::{AwardSet, rank_awards};
use marker::closing::{ClosingOutcome, close_assignment};
use serde::Serialize;

use crate::services::ServiceError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct ClosingReport {
    pub assignment: String,
    pub outcome: ClosingOutcome,
    /// Whether the registry change reached the remote. `true` when nothing was written.
    pub synced: bool,
}

/// Runs the award transition for the configured assignment.
///
/// Safe to call repeatedly: once award markers exist the outcome is
/// [`ClosingOutcome::AlreadyClosed`] and nothing is written.
pub async fn close_current_assignment(
    state: &AppState,
    now: DateTime<Utc>,
) -> Result<ClosingReport, ServiceError> {
    let assignment = &state.config().assignment;

    let _guard = state.write_lock().lock().await;
    state.sync().pull().await?;

    let registry_repo = state.registry();
    let mut registry = registry_repo.load()?;
    let records = state.history().for_assignment(&assignment.id)?;

    let outcome = close_assignment(
        now,
        assignment.deadline.with_timezone(&Utc),
        &assignment.column,
        &mut registry,
        &records,
        state.weights(),
    );

    let mut synced = true;
    if let ClosingOutcome::Closed { awards, changes } = &outcome {
        registry_repo.save(&registry)?;
        tracing::info!(assignment = %assignment.id, winners = awards.len(), changes, "awards recorded");

        let message = format!("{} - awards", assignment.id);
        if let Err(e) = state.sync().commit_and_push(&message).await {
            tracing::warn!(error = %e, "push failed, awards kept locally");
            synced = false;
        }
    }

    Ok(ClosingReport {
        assignment: assignment.id.clone(),
        outcome,
        synced,
    })
}

/// Current ranking for the configured assignment, without touching the registry.
pub async fn provisional_awards(state: &AppState) -> Result<AwardSet, ServiceError> {
    let assignment = &state.config().assignment;
    let records = {
        let _guard = state.write_lock().lock().await;
        state.sync().pull().await?;
        state.history().for_assignment(&assignment.id)?
    };
    Ok(rank_awards(&records, state.weights()))
}
