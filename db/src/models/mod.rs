pub mod registry;
pub mod submission_record;

pub use registry::Registry;
pub use submission_record::{OriginalityLabel, SubScores, SubmissionRecord};
