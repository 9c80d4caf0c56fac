//! Git CLI invocation for commits.
//!
//! Commits shell out to the system `git` binary so the user's hooks, signing
//! setup and identity config all apply.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// Run a git command in `workdir` and return its stdout.
pub fn run_git(workdir: &Path, args: &[&str], operation: &str) -> Result<String, GitError> {
    debug!("Running git {} in {}", operation, workdir.display());

    let output = Command::new("git")
        .arg("-C")
        .arg(workdir)
        .args(args)
        .output()
        .map_err(|source| GitError::SpawnFailed {
            operation: operation.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed {
            operation: operation.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
