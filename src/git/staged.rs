//! Staged-change inspection using git2.

use std::path::{Path, PathBuf};

use git2::{
    Delta, Diff, DiffFindOptions, DiffFormat, DiffOptions, ErrorCode, Patch, Repository, Tree,
};
use tracing::debug;

use crate::error::GitError;

use super::commit::run_git;
use super::{FileChangeStat, VersionControl};

/// A non-bare repository discovered from a starting directory.
pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepository {
    /// Discover the repository containing `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(GitError::OpenRepository)?;
        let workdir = repo
            .workdir()
            .ok_or(GitError::BareRepository)?
            .to_path_buf();
        Ok(Self { repo, workdir })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// HEAD-to-index diff with rename detection applied.
    fn index_diff(&self, opts: &mut DiffOptions) -> Result<Diff<'_>, GitError> {
        let head_tree = resolve_head_tree(&self.repo)?;
        let mut diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, Some(opts))
            .map_err(GitError::DiffFailed)?;

        let mut find = DiffFindOptions::new();
        find.renames(true);
        diff.find_similar(Some(&mut find))
            .map_err(GitError::DiffFailed)?;

        Ok(diff)
    }
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// so the first commit diffs against the empty tree.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

fn path_string(path: Option<&Path>) -> Option<String> {
    path.map(|p| p.to_string_lossy().to_string())
}

impl VersionControl for GitRepository {
    fn has_staged_changes(&self) -> Result<bool, GitError> {
        let head_tree = resolve_head_tree(&self.repo)?;
        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, None)
            .map_err(GitError::DiffFailed)?;
        Ok(diff.deltas().len() > 0)
    }

    fn staged_numstat(&self) -> Result<Vec<FileChangeStat>, GitError> {
        let diff = self.index_diff(&mut DiffOptions::new())?;
        let mut stats = Vec::new();

        for idx in 0..diff.deltas().len() {
            let Some(delta) = diff.get_delta(idx) else {
                continue;
            };

            let is_renamed = delta.status() == Delta::Renamed;
            let path = path_string(delta.new_file().path())
                .or_else(|| path_string(delta.old_file().path()))
                .unwrap_or_default();
            if path.is_empty() {
                continue;
            }

            let stat = match Patch::from_diff(&diff, idx).map_err(GitError::DiffFailed)? {
                Some(patch) if !patch.delta().flags().is_binary() => {
                    let (_, added, removed) = patch.line_stats().map_err(GitError::DiffFailed)?;
                    FileChangeStat {
                        path,
                        old_path: if is_renamed {
                            path_string(delta.old_file().path())
                        } else {
                            None
                        },
                        added,
                        removed,
                        is_binary: false,
                        is_renamed,
                    }
                }
                // git2 yields no patch for binary content
                _ => FileChangeStat::binary(path),
            };

            stats.push(stat);
        }

        debug!("Collected numstat for {} staged files", stats.len());
        Ok(stats)
    }

    fn staged_diff(&self) -> Result<String, GitError> {
        let mut opts = DiffOptions::new();
        opts.context_lines(0);
        let diff = self.index_diff(&mut opts)?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            let origin = line.origin();
            if origin == '+' || origin == '-' || origin == ' ' {
                text.push(origin);
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })
        .map_err(GitError::DiffFailed)?;

        if text.trim().is_empty() {
            return Err(GitError::NoStagedChanges);
        }

        Ok(text)
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        if message.trim().is_empty() {
            return Err(GitError::EmptyMessage);
        }

        if !self.has_staged_changes()? {
            return Err(GitError::NoStagedChanges);
        }

        run_git(&self.workdir, &["commit", "-m", message], "commit")?;
        Ok(())
    }
}
