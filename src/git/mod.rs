//! Git queries.
//!
//! This module reads repository state needed for the build stamp: whether we
//! are inside a work tree, the current commit hash and its commit time.

use crate::process::{CommandRunner, ProcessError};

/// Command used to detect a git work tree.
pub const IS_INSIDE_WORK_TREE: &str = "git rev-parse --is-inside-work-tree";
/// Command printing the full hash of `HEAD`.
pub const CURRENT_COMMIT: &str = "git rev-parse HEAD";
/// Command printing the committer timestamp of `HEAD` as unix seconds.
pub const CURRENT_COMMIT_TIME: &str = "git log -1 --format=%ct";

/// Check if the current directory is inside a git work tree.
///
/// Only an exact `true` answer counts; anything else (including empty output
/// from a failed invocation) means no.
pub fn is_inside_work_tree(runner: &dyn CommandRunner) -> Result<bool, ProcessError> {
    Ok(runner.run(IS_INSIDE_WORK_TREE)? == "true")
}

/// Get the full hash of the current commit.
///
/// Returned verbatim; outside a repository this is usually empty.
pub fn current_commit(runner: &dyn CommandRunner) -> Result<String, ProcessError> {
    runner.run(CURRENT_COMMIT)
}

/// Get the commit time of `HEAD` as a decimal unix timestamp string.
pub fn current_commit_unix_time(runner: &dyn CommandRunner) -> Result<String, ProcessError> {
    runner.run(CURRENT_COMMIT_TIME)
}
