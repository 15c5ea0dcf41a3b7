//! Closing an assignment.
//!
//! An assignment is `Open` until its deadline has passed and award markers
//! have been written into its registry column. Closing ranks the history
//! once and replaces the winners' delivered marks with award markers. Once
//! any marker is present the assignment is closed for good and later calls
//! change nothing, even if more records arrive.

use chrono::{DateTime, Utc};
use serde::Serialize;

use db::models::{Registry, SubmissionRecord};

use crate::awards::{Award, AwardSet, AwardWeights, rank_awards};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClosingOutcome {
    /// The deadline has not passed yet.
    NotDue,
    /// Award markers are already present.
    AlreadyClosed,
    /// No record is eligible for an award; nothing was written.
    NoEligible,
    Closed { awards: AwardSet, changes: usize },
}

/// Runs the closing transition for `column`.
///
/// `records` must all belong to the assignment. The registry is only
/// modified when the outcome is [`ClosingOutcome::Closed`].
pub fn close_assignment(
    now: DateTime<Utc>,
    deadline: DateTime<Utc>,
    column: &str,
    registry: &mut Registry,
    records: &[SubmissionRecord],
    weights: &AwardWeights,
) -> ClosingOutcome {
    if now <= deadline {
        return ClosingOutcome::NotDue;
    }
    if registry.has_award_markers(column, &Award::markers()) {
        tracing::debug!(column, "assignment already closed");
        return ClosingOutcome::AlreadyClosed;
    }

    let awards = rank_awards(records, weights);
    if awards.is_empty() {
        tracing::info!(column, records = records.len(), "no eligible records, nothing to award");
        return ClosingOutcome::NoEligible;
    }

    let changes = registry.apply_awards(column, awards.markers());
    tracing::info!(column, awards = awards.len(), changes, "assignment closed");
    ClosingOutcome::Closed { awards, changes }
}
