//! Git operations: staged stats and diff via git2, commits via the git CLI.

pub mod commit;
pub mod staged;

use crate::error::GitError;

pub use commit::run_git;
pub use staged::GitRepository;

/// One changed file as reported by `git diff --cached --numstat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeStat {
    pub path: String,
    /// Previous path, present iff the file was renamed.
    pub old_path: Option<String>,
    pub added: usize,
    pub removed: usize,
    /// Binary files always report zero added/removed lines.
    pub is_binary: bool,
    pub is_renamed: bool,
}

impl FileChangeStat {
    /// A text file with line counts.
    pub fn text(path: impl Into<String>, added: usize, removed: usize) -> Self {
        Self {
            path: path.into(),
            old_path: None,
            added,
            removed,
            is_binary: false,
            is_renamed: false,
        }
    }

    /// A binary file; line counts are not meaningful.
    pub fn binary(path: impl Into<String>) -> Self {
        Self {
            is_binary: true,
            ..Self::text(path, 0, 0)
        }
    }

    /// A renamed text file.
    pub fn renamed(
        old_path: impl Into<String>,
        path: impl Into<String>,
        added: usize,
        removed: usize,
    ) -> Self {
        Self {
            old_path: Some(old_path.into()),
            is_renamed: true,
            ..Self::text(path, added, removed)
        }
    }
}

/// The version-control operations the commit pipeline needs.
///
/// Implemented by [`GitRepository`]; tests substitute in-memory fakes.
pub trait VersionControl {
    /// Whether the index differs from HEAD.
    fn has_staged_changes(&self) -> Result<bool, GitError>;

    /// Per-file added/removed counts for staged changes, rename-aware.
    fn staged_numstat(&self) -> Result<Vec<FileChangeStat>, GitError>;

    /// Unified diff text of staged changes.
    fn staged_diff(&self) -> Result<String, GitError>;

    /// Commit the staged changes with `message`.
    fn commit(&self, message: &str) -> Result<(), GitError>;
}
