//! Shared plumbing for the submission portal: configuration, filesystem
//! layout of the state repository, archive handling, reference downloads,
//! rollback of grouped file writes and git synchronisation.

pub mod archive;
pub mod config;
pub mod git;
pub mod http;
pub mod paths;
pub mod staging;
pub mod test_helpers;
