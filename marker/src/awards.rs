//! # Award ranking
//!
//! Picks up to four winners for an assignment from its history.
//!
//! 1. Records labelled `ModifiedCopy` or `DirectCopy` are not eligible.
//! 2. Each eligible record gets a combined score
//!    `(1 - similarity) * originality_weight + (total / 10) * grade_weight`.
//! 3. Awards are handed out in a fixed order, each to the best record whose
//!    submitter has not won yet:
//!    - Best Overall (combined score);
//!    - Best Documented (documentation);
//!    - Best Exploration (exploration);
//!    - Best Modeling (modeling).
//!
//! Ties go to the earliest timestamp, then to the earliest position in the history.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use db::models::SubmissionRecord;

use crate::grading::MAX_TOTAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Award {
    BestOverall,
    BestDocumented,
    BestExploration,
    BestModeling,
}

impl Award {
    /// Assignment order.
    pub const ORDER: [Award; 4] = [
        Award::BestOverall,
        Award::BestDocumented,
        Award::BestExploration,
        Award::BestModeling,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Award::BestOverall => "Best Overall",
            Award::BestDocumented => "Best Documented",
            Award::BestExploration => "Best Exploration",
            Award::BestModeling => "Best Modeling",
        }
    }

    /// Symbol written into the registry cell of the winner.
    pub fn marker(&self) -> &'static str {
        match self {
            Award::BestOverall => "🏆",
            Award::BestDocumented => "📝",
            Award::BestExploration => "🔍",
            Award::BestModeling => "🤖",
        }
    }

    pub fn markers() -> [&'static str; 4] {
        Award::ORDER.map(|a| a.marker())
    }

    fn score(&self, candidate: &Candidate<'_>) -> f64 {
        let scores = &candidate.record.scores;
        match self {
            Award::BestOverall => candidate.combined,
            Award::BestDocumented => scores.documentation,
            Award::BestExploration => scores.exploration,
            Award::BestModeling => scores.modeling,
        }
    }
}

/// Weights of the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwardWeights {
    pub originality: f64,
    pub grade: f64,
}

impl Default for AwardWeights {
    fn default() -> Self {
        Self {
            originality: 0.3,
            grade: 0.7,
        }
    }
}

impl AwardWeights {
    pub fn combined(&self, similarity: f64, total: f64) -> f64 {
        (1.0 - similarity) * self.originality + (total / MAX_TOTAL) * self.grade
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwardWinner {
    pub submitter: String,
    /// The value the winner was ranked on.
    pub score: f64,
}

/// Winners keyed by award, in assignment order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AwardSet {
    winners: BTreeMap<Award, AwardWinner>,
}

impl AwardSet {
    pub fn get(&self, award: Award) -> Option<&AwardWinner> {
        self.winners.get(&award)
    }

    pub fn winner(&self, award: Award) -> Option<&str> {
        self.get(award).map(|w| w.submitter.as_str())
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Award, &AwardWinner)> {
        self.winners.iter().map(|(a, w)| (*a, w))
    }

    /// `(submitter, marker)` pairs for the registry.
    pub fn markers(&self) -> Vec<(&str, &'static str)> {
        self.iter().map(|(a, w)| (w.submitter.as_str(), a.marker())).collect()
    }
}

struct Candidate<'a> {
    position: usize,
    record: &'a SubmissionRecord,
    combined: f64,
}

/// `Greater` when `a` should win over `b`.
fn rank(award: Award, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    award
        .score(a)
        .total_cmp(&award.score(b))
        .then_with(|| b.record.timestamp.cmp(&a.record.timestamp))
        .then_with(|| b.position.cmp(&a.position))
}

/// Ranks `records` (all from the same assignment) into an [`AwardSet`].
pub fn rank_awards(records: &[SubmissionRecord], weights: &AwardWeights) -> AwardSet {
    let candidates: Vec<Candidate<'_>> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.originality.is_copy())
        .map(|(position, record)| Candidate {
            position,
            record,
            combined: weights.combined(record.similarity, record.total),
        })
        .collect();

    let mut set = AwardSet::default();
    let mut awarded: HashSet<String> = HashSet::new();

    for award in Award::ORDER {
        let best = candidates
            .iter()
            .filter(|c| !awarded.contains(&c.record.submitter.to_lowercase()))
            .max_by(|a, b| rank(award, a, b));

        let Some(best) = best else {
            break;
        };

        awarded.insert(best.record.submitter.to_lowercase());
        set.winners.insert(
            award,
            AwardWinner {
                submitter: best.record.submitter.clone(),
                score: award.score(best),
            },
        );
    }

    tracing::debug!(
        eligible = candidates.len(),
        awards = set.len(),
        "awards ranked"
    );
    set
}
